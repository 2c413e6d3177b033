//! Requested-vs-actual viewport mismatch detection.

use contracts::{ActualViewport, Dimensions};
use serde::Serialize;
use sync_engine::viewports_equal;

/// Per-axis difference tolerated before viewports count as mismatched
pub const MISMATCH_TOLERANCE_PX: u32 = 5;

/// Explanation used when the driver gave none
pub const DEFAULT_MISMATCH_REASON: &str = "Session profile has viewport override configured";

/// Whether the driver diverged from the requested viewport, and why
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub has_mismatch: bool,
    pub reason: Option<String>,
}

/// Compare the requested viewport with what the driver reports.
///
/// Absent on either side means no mismatch. A difference above
/// [`MISMATCH_TOLERANCE_PX`] on either axis is a mismatch, attributed to the
/// driver's `reason` or to [`DEFAULT_MISMATCH_REASON`].
pub fn detect_mismatch(
    browser: Option<&Dimensions>,
    actual: Option<&ActualViewport>,
) -> Mismatch {
    let (Some(browser), Some(actual)) = (browser, actual) else {
        return Mismatch::default();
    };

    if viewports_equal(
        Some(browser),
        Some(&actual.dimensions()),
        MISMATCH_TOLERANCE_PX,
    ) {
        return Mismatch::default();
    }

    let reason = actual
        .non_empty_reason()
        .unwrap_or(DEFAULT_MISMATCH_REASON)
        .to_string();
    Mismatch {
        has_mismatch: true,
        reason: Some(reason),
    }
}
