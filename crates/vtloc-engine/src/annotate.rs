//! Clinical guidance for ranked predictions.

use vtloc_catalog::SiteCatalog;
use vtloc_model::{ClinicalImplications, SitePrediction};

use crate::error::{AnalysisError, Result};

/// Attach the catalog's procedural guidance to every prediction.
///
/// A prediction naming a site the catalog does not hold is a catalog
/// integrity failure.
pub fn annotate(predictions: &mut [SitePrediction], catalog: &SiteCatalog) -> Result<()> {
    for prediction in predictions.iter_mut() {
        let entry = catalog
            .by_name(&prediction.site)
            .ok_or_else(|| AnalysisError::CatalogIntegrity {
                site: prediction.site.clone(),
            })?;
        let clinical = &entry.clinical;
        prediction.clinical_implications = Some(ClinicalImplications {
            recommended_approach: clinical.ablation_approach,
            proximity_warnings: clinical.proximity_risks.clone(),
            success_rate_expectation: clinical.success_rate.clone(),
            procedural_considerations: clinical.challenges.clone(),
        });
    }
    Ok(())
}
