//! Scalar reference kernel for zero-mean normalized cross-correlation.
//!
//! For a window `I` and template `T` of `n` pixels the score is
//! `sum(T' * I) / sqrt(var_t * var_i)` with `T' = T - mean(T)`,
//! `var_t = sum(T'^2)` and `var_i = sum(I^2) - sum(I)^2 / n`.

use crate::candidate::Peak;
use crate::kernel::{Kernel, ScanParams};
use crate::template::TemplatePlan;
use crate::util::{ScaleMatchError, ScaleMatchResult};
use crate::ImageView;

/// Scalar ZNCC kernel.
pub struct ZnccScalar;

impl ZnccScalar {
    #[inline]
    fn window_score(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> Option<f32> {
        let tpl_width = plan.width();
        let t_prime = plan.t_prime();
        let n = (tpl_width * plan.height()) as f64;

        let mut dot = 0.0f64;
        let mut sum_i = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for ty in 0..plan.height() {
            let img_row = &image.row(y + ty)?[x..x + tpl_width];
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];
            for (&t, &value) in tpl_row.iter().zip(img_row) {
                let v = value as f64;
                dot += t as f64 * v;
                sum_i += v;
                sum_i2 += v * v;
            }
        }

        let var_i = sum_i2 - (sum_i * sum_i) / n;
        if var_i <= min_var_i as f64 {
            return None;
        }

        let score = (dot / (plan.var_t() as f64 * var_i).sqrt()) as f32;
        score.is_finite().then_some(score.clamp(-1.0, 1.0))
    }
}

impl Kernel for ZnccScalar {
    fn scan_full(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        params: ScanParams,
    ) -> ScaleMatchResult<Vec<Peak>> {
        let img_width = image.width();
        let img_height = image.height();
        let tpl_width = plan.width();
        let tpl_height = plan.height();
        if img_width < tpl_width || img_height < tpl_height {
            return Err(ScaleMatchError::TemplateTooLarge {
                tpl_width,
                tpl_height,
                img_width,
                img_height,
            });
        }

        let max_x = img_width - tpl_width;
        let max_y = img_height - tpl_height;
        let mut peaks = Vec::new();
        for y in 0..=max_y {
            for x in 0..=max_x {
                if let Some(score) = Self::window_score(image, plan, x, y, params.min_var_i) {
                    if score >= params.min_score {
                        peaks.push(Peak { x, y, score });
                    }
                }
            }
        }

        Ok(peaks)
    }
}
