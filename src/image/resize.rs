//! Bilinear resampling for grayscale templates.

use crate::image::{ImageView, OwnedImage};
use crate::util::ScaleMatchResult;

/// Resizes a grayscale image to `dst_width x dst_height` with bilinear sampling.
///
/// Pixel centers are aligned: destination pixel `x` samples the source at
/// `(x + 0.5) * src_width / dst_width - 0.5`, clamped to `[0, src_width - 1]`
/// (likewise for rows). Results are rounded to the nearest integer and clamped
/// to `[0, 255]`. Resizing to the source size reproduces the source exactly.
pub fn resize_u8_bilinear(
    src: ImageView<'_, u8>,
    dst_width: usize,
    dst_height: usize,
) -> ScaleMatchResult<OwnedImage> {
    let src_width = src.width();
    let src_height = src.height();
    if dst_width == src_width && dst_height == src_height {
        return OwnedImage::from_view(src);
    }

    let xs = sample_axis(src_width, dst_width);
    let ys = sample_axis(src_height, dst_height);
    let mut out = Vec::with_capacity(dst_width.saturating_mul(dst_height));

    for &(y0, y1, fy) in &ys {
        let (Some(row0), Some(row1)) = (src.row(y0), src.row(y1)) else {
            break;
        };
        for &(x0, x1, fx) in &xs {
            let a = row0[x0] as f32;
            let b = row0[x1] as f32;
            let c = row1[x0] as f32;
            let d = row1[x1] as f32;

            let top = a + (b - a) * fx;
            let bottom = c + (d - c) * fx;
            let value = top + (bottom - top) * fy;
            out.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    OwnedImage::new(out, dst_width, dst_height)
}

/// Precomputes `(i0, i1, frac)` source taps for each destination index.
fn sample_axis(src_len: usize, dst_len: usize) -> Vec<(usize, usize, f32)> {
    let ratio = src_len as f32 / dst_len.max(1) as f32;
    let max = (src_len - 1) as f32;
    (0..dst_len)
        .map(|i| {
            let pos = ((i as f32 + 0.5) * ratio - 0.5).clamp(0.0, max);
            let i0 = pos.floor() as usize;
            let i1 = (i0 + 1).min(src_len - 1);
            (i0, i1, pos - i0 as f32)
        })
        .collect()
}
