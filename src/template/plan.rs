//! Template plan precomputation for zero-mean normalized correlation.

use crate::image::ImageView;
use crate::util::{ScaleMatchError, ScaleMatchResult};

/// Precomputed zero-mean buffer and energy for ZNCC scoring.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f32,
    var_t: f32,
    t_prime: Vec<f32>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    ///
    /// Fails with `DegenerateTemplate` when the template has (near) zero
    /// variance, since the correlation is undefined for flat patches.
    pub fn from_view(tpl: ImageView<'_, u8>) -> ScaleMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(ScaleMatchError::InvalidDimensions { width, height })?;

        let mut sum = 0.0f64;
        for y in 0..height {
            let row = row_of(tpl, y)?;
            sum += row.iter().map(|&v| v as f64).sum::<f64>();
        }
        let mean = sum / count as f64;

        let mut var_t = 0.0f64;
        let mut t_prime = Vec::with_capacity(count);
        for y in 0..height {
            for &value in row_of(tpl, y)? {
                let centered = value as f64 - mean;
                var_t += centered * centered;
                t_prime.push(centered as f32);
            }
        }

        if var_t / count as f64 <= 1e-8 {
            return Err(ScaleMatchError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        Ok(Self {
            width,
            height,
            mean: mean as f32,
            var_t: var_t as f32,
            t_prime,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the mean intensity of the template.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Returns the sum of squared deviations from the mean.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }
}

fn row_of<'a>(tpl: ImageView<'a, u8>, y: usize) -> ScaleMatchResult<&'a [u8]> {
    tpl.row(y).ok_or(ScaleMatchError::BufferTooSmall {
        needed: y * tpl.stride() + tpl.width(),
        got: tpl.as_slice().len(),
    })
}
