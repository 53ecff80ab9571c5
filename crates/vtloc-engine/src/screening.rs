//! QRS duration gate.

use vtloc_catalog::ScreeningPolicy;
use vtloc_model::{Observation, ScreeningResult};

/// Compare the QRS duration against the wide-complex threshold.
///
/// A duration exactly at the threshold passes.
pub fn screen(observation: &Observation, policy: &ScreeningPolicy) -> ScreeningResult {
    let qrs_duration_ms = observation.qrs_duration_ms();
    let threshold_ms = policy.min_qrs_duration_ms;
    let meets_threshold = qrs_duration_ms >= threshold_ms;
    let notes = (!meets_threshold).then(|| {
        format!(
            "QRS duration {qrs_duration_ms} ms is below the {threshold_ms} ms threshold; \
             the rhythm is not a wide-complex ventricular arrhythmia"
        )
    });
    ScreeningResult {
        qrs_duration_ms,
        threshold_ms,
        meets_threshold,
        notes,
    }
}
