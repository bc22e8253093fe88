//! Correlation kernel implementations.

use crate::candidate::Peak;
use crate::template::TemplatePlan;
use crate::util::ScaleMatchResult;
use crate::ImageView;

pub mod scalar;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Minimum sum of squared deviations for an image window to be scored.
    pub min_var_i: f32,
    /// Minimum score for a placement to be emitted.
    pub min_score: f32,
}

/// Correlation kernel scanning a scene with a prepared template.
pub trait Kernel {
    /// Scans every valid placement and returns those scoring at least
    /// `params.min_score`, in row-major order.
    fn scan_full(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> ScaleMatchResult<Vec<Peak>>;
}
