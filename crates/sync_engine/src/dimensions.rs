//! Dimension math: clamping, equality, aspect ratio and fitting.
//!
//! Pure functions, no state.

use contracts::{Dimensions, RawBounds};

/// Round one axis to the nearest integer, then bound it to `[min, max]`.
///
/// Rounding happens first so `1280.7` becomes `1281` rather than being
/// truncated. NaN maps to `min`.
fn clamp_axis(value: f64, min: u32, max: u32) -> u32 {
    if value.is_nan() {
        return min;
    }
    let rounded = value.round();
    // max/min instead of f64::clamp: a misconfigured min > max must not panic
    rounded.max(f64::from(min)).min(f64::from(max)) as u32
}

/// Clamp a raw size sample into a valid viewport
pub fn clamp_dimensions(raw: RawBounds, min: u32, max: u32) -> Dimensions {
    Dimensions {
        width: clamp_axis(raw.width, min, max),
        height: clamp_axis(raw.height, min, max),
    }
}

/// Compare two optional viewports, allowing `tolerance` pixels per axis.
///
/// Two absent viewports are equal; one absent viewport never equals a present one.
pub fn viewports_equal(a: Option<&Dimensions>, b: Option<&Dimensions>, tolerance: u32) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.width.abs_diff(b.width) <= tolerance && a.height.abs_diff(b.height) <= tolerance
        }
        _ => false,
    }
}

/// Width divided by height
pub fn aspect_ratio(dims: &Dimensions) -> f64 {
    f64::from(dims.width) / f64::from(dims.height)
}

/// Scale `viewport` so its limiting axis exactly touches `bounds`.
///
/// Aspect ratio is preserved. The result may be larger than `viewport` when
/// the bounds are larger; there is no cap at 1:1. A zero-sized viewport
/// yields a zero-sized result.
pub fn fit_viewport_to_bounds(viewport: &Dimensions, bounds: &RawBounds) -> Dimensions {
    if viewport.width == 0 || viewport.height == 0 {
        return Dimensions::new(0, 0);
    }

    let width = f64::from(viewport.width);
    let height = f64::from(viewport.height);
    let scale = (bounds.width / width).min(bounds.height / height);

    Dimensions {
        width: (width * scale).round() as u32,
        height: (height * scale).round() as u32,
    }
}
