//! Decoding helpers and rectangle annotation via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::aggregate::Canvas;
use crate::candidate::BoundingBox;
use crate::image::{ImageView, OwnedImage};
use crate::template::Template;
use crate::trace::{trace_event, trace_warn};
use crate::util::{ScaleMatchError, ScaleMatchResult};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::fs;
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> ScaleMatchResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> ScaleMatchResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Converts a decoded image of any color type to an owned grayscale image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> ScaleMatchResult<OwnedImage> {
    owned_from_gray_image(&img.to_luma8())
}

/// Loads an image from disk and converts it to grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> ScaleMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| ScaleMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Loads a scene as an RGB raster for annotation plus its grayscale version.
pub fn load_scene<P: AsRef<Path>>(path: P) -> ScaleMatchResult<(RgbImage, OwnedImage)> {
    let img = image::open(path).map_err(|err| ScaleMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    let gray = owned_from_dynamic_image(&img)?;
    Ok((img.to_rgb8(), gray))
}

/// Loads every file in `dir` with the given extension as a grayscale template.
///
/// Templates are returned sorted by file name and named after it. Files that
/// fail to decode are logged and skipped; only an unreadable directory is an
/// error.
pub fn load_templates_from_dir<P: AsRef<Path>>(
    dir: P,
    extension: &str,
) -> ScaleMatchResult<Vec<Template>> {
    let entries = fs::read_dir(dir.as_ref()).map_err(|err| ScaleMatchError::ImageIo {
        reason: format!("{}: {err}", dir.as_ref().display()),
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    paths.sort();

    let mut templates = Vec::with_capacity(paths.len());
    for path in paths {
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match load_gray_image(&path) {
            Ok(img) => templates.push(Template::from_image(id, img)),
            Err(err) => {
                trace_warn!(
                    "template_unreadable",
                    template = id.as_str(),
                    error = err.to_string().as_str()
                );
            }
        }
    }
    trace_event!("templates_loaded", count = templates.len());
    Ok(templates)
}

/// Draws accepted boxes as hollow rectangles onto an RGB raster.
///
/// The outline runs through `(x1, y1)` and `(x2, y2)` inclusive, with the
/// stroke centered on that edge: a 2 px stroke covers the edge ring and the
/// ring just outside it. Parts outside the image are clipped.
pub struct RgbAnnotator<'a> {
    img: &'a mut RgbImage,
    color: Rgb<u8>,
    stroke: u32,
}

impl<'a> RgbAnnotator<'a> {
    /// Green rectangles with a 2 px stroke.
    pub fn new(img: &'a mut RgbImage) -> Self {
        Self {
            img,
            color: Rgb([0, 255, 0]),
            stroke: 2,
        }
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = Rgb(color);
        self
    }

    /// Sets the stroke width; zero is treated as one.
    pub fn with_stroke(mut self, stroke: u32) -> Self {
        self.stroke = stroke.max(1);
        self
    }
}

impl Canvas for RgbAnnotator<'_> {
    fn draw_box(&mut self, bbox: &BoundingBox) {
        let width = bbox.width() as i64 + 1;
        let height = bbox.height() as i64 + 1;
        let stroke = i64::from(self.stroke);
        let outer = stroke / 2;
        for inset in -outer..stroke - outer {
            let (w, h) = (width - 2 * inset, height - 2 * inset);
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at((bbox.x1 as i64 + inset) as i32, (bbox.y1 as i64 + inset) as i32)
                .of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut *self.img, rect, self.color);
        }
    }
}
