//! Quadrant assignment and candidate widening.

use vtloc_catalog::SiteCatalog;
use vtloc_model::{HorizontalAxisResult, Quadrant, QuadrantResult, VerticalAxisResult};

/// Map the two axes to a quadrant through the catalog's table.
///
/// When an axis is discordant and the discordance policy allows it, the
/// quadrant reached by flipping that axis is listed in
/// `adjacent_quadrants`; its boundary sites become extra candidates.
pub fn assign_quadrant(
    vertical: &VerticalAxisResult,
    horizontal: &HorizontalAxisResult,
    catalog: &SiteCatalog,
) -> QuadrantResult {
    let policy = catalog.policy();
    let table = &policy.quadrants;
    let quadrant = table.quadrant(vertical.axis, horizontal.axis);

    let mut adjacent_quadrants: Vec<Quadrant> = Vec::new();
    if vertical.has_discordance && policy.discordance.widen_on_vertical {
        adjacent_quadrants.push(table.quadrant(vertical.axis.opposite(), horizontal.axis));
    }
    if horizontal.has_discordance && policy.discordance.widen_on_horizontal {
        let flipped = table.quadrant(vertical.axis, horizontal.axis.opposite());
        if !adjacent_quadrants.contains(&flipped) {
            adjacent_quadrants.push(flipped);
        }
    }

    let possible_sites: Vec<String> = catalog
        .sites_in(quadrant)
        .map(|site| site.name.clone())
        .collect();

    let notes = if possible_sites.is_empty() {
        Some(format!("The catalog has no sites homed in {}", quadrant.label()))
    } else if !adjacent_quadrants.is_empty() {
        Some(format!(
            "Axis discordance: boundary sites of {} also considered",
            adjacent_quadrants
                .iter()
                .map(Quadrant::label)
                .collect::<Vec<_>>()
                .join(" and ")
        ))
    } else {
        None
    };

    QuadrantResult {
        quadrant,
        vertical_axis: vertical.axis,
        horizontal_axis: horizontal.axis,
        possible_sites,
        adjacent_quadrants,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtloc_catalog::load_embedded;
    use vtloc_model::{
        BbbPattern, HorizontalAxis, Lead, LeadReading, Polarity, VerticalAxis,
    };

    fn vertical(axis: VerticalAxis, has_discordance: bool) -> VerticalAxisResult {
        VerticalAxisResult {
            axis,
            leads: Vec::new(),
            positive_count: 0,
            has_discordance,
            notes: None,
        }
    }

    fn horizontal(axis: HorizontalAxis, has_discordance: bool) -> HorizontalAxisResult {
        HorizontalAxisResult {
            axis,
            lead: LeadReading {
                lead: Lead::I,
                polarity: Polarity::Positive,
            },
            bbb_pattern: BbbPattern::None,
            has_discordance,
            low_confidence: false,
            notes: None,
        }
    }

    #[test]
    fn concordant_axes_list_home_sites_only() {
        let (catalog, _) = load_embedded().unwrap();
        let result = assign_quadrant(
            &vertical(VerticalAxis::Inferior, false),
            &horizontal(HorizontalAxis::Leftward, false),
            &catalog,
        );
        assert_eq!(result.quadrant, Quadrant::RightUpper);
        assert!(result.adjacent_quadrants.is_empty());
        assert_eq!(result.possible_sites.len(), 4);
        assert!(result.possible_sites.iter().any(|name| name == "Posterior RVOT"));
        assert!(result.notes.is_none());
    }

    #[test]
    fn discordance_adds_flipped_quadrants() {
        let (catalog, _) = load_embedded().unwrap();
        let result = assign_quadrant(
            &vertical(VerticalAxis::Inferior, true),
            &horizontal(HorizontalAxis::Rightward, true),
            &catalog,
        );
        assert_eq!(result.quadrant, Quadrant::LeftUpper);
        assert_eq!(
            result.adjacent_quadrants,
            vec![Quadrant::LeftLower, Quadrant::RightUpper]
        );
        assert!(result.notes.is_some());
    }
}
