//! Numeric helpers for scale sampling and center geometry.

/// Returns `count` evenly spaced values over `[start, end]`.
///
/// Values are computed as `start + i * step` with the last sample pinned to
/// `end`, so integer truncation of scaled sizes stays stable at the endpoint.
pub(crate) fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut out: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            out[count - 1] = end;
            out
        }
    }
}

/// Truncates `len * scale` toward zero.
pub(crate) fn scaled_len(len: usize, scale: f64) -> usize {
    let scaled = len as f64 * scale;
    if scaled.is_finite() && scaled > 0.0 {
        scaled as usize
    } else {
        0
    }
}

/// Euclidean distance between two integer points.
pub(crate) fn distance(a: (usize, usize), b: (usize, usize)) -> f64 {
    let dx = a.0 as f64 - b.0 as f64;
    let dy = a.1 as f64 - b.1 as f64;
    dx.hypot(dy)
}
