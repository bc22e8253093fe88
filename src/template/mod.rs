//! Named templates and their scaled variants.

use crate::image::resize::resize_u8_bilinear;
use crate::image::{ImageView, OwnedImage};
use crate::util::math::scaled_len;
use crate::util::ScaleMatchResult;

mod plan;

pub use plan::TemplatePlan;

/// Owned grayscale template with an identifier (usually its file name).
#[derive(Clone, Debug)]
pub struct Template {
    id: String,
    img: OwnedImage,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(
        id: impl Into<String>,
        data: Vec<u8>,
        width: usize,
        height: usize,
    ) -> ScaleMatchResult<Self> {
        let img = OwnedImage::new(data, width, height)?;
        Ok(Self::from_image(id, img))
    }

    /// Wraps an already decoded grayscale image.
    pub fn from_image(id: impl Into<String>, img: OwnedImage) -> Self {
        Self { id: id.into(), img }
    }

    /// Returns the template identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    pub fn width(&self) -> usize {
        self.img.width()
    }

    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Size of the template after scaling, truncated toward zero.
    pub fn scaled_size(&self, scale: f64) -> (usize, usize) {
        (
            scaled_len(self.width(), scale),
            scaled_len(self.height(), scale),
        )
    }

    /// Resamples the template by `scale`.
    ///
    /// Returns `Ok(None)` when either scaled dimension truncates to zero.
    pub fn scaled(&self, scale: f64) -> ScaleMatchResult<Option<OwnedImage>> {
        let (width, height) = self.scaled_size(scale);
        if width == 0 || height == 0 {
            return Ok(None);
        }
        resize_u8_bilinear(self.view(), width, height).map(Some)
    }
}
