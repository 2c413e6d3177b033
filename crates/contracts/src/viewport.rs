//! Viewport geometry types
//!
//! `RawBounds` is what a size observer reports; `Dimensions` is what the
//! driver is asked to use; `ActualViewport` is what the driver says it used.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest width/height the driver accepts
pub const MIN_DIMENSION: u32 = 320;

/// Largest width/height the driver accepts
pub const MAX_DIMENSION: u32 = 3840;

/// Validated viewport size in device-independent pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Unvalidated container size sample, possibly fractional or out of range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBounds {
    pub width: f64,
    pub height: f64,
}

impl RawBounds {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<Dimensions> for RawBounds {
    fn from(dims: Dimensions) -> Self {
        Self {
            width: f64::from(dims.width),
            height: f64::from(dims.height),
        }
    }
}

/// Where the driver's actual viewport came from.
///
/// Open-ended: unknown values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ViewportSource {
    /// The driver used the size this client requested
    Requested,
    /// A browser fingerprint profile dictated the size
    Fingerprint,
    /// A fingerprint profile dictated one axis only
    FingerprintPartial,
    Other(String),
}

impl ViewportSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Requested => "requested",
            Self::Fingerprint => "fingerprint",
            Self::FingerprintPartial => "fingerprint_partial",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ViewportSource {
    fn from(s: String) -> Self {
        match s.as_str() {
            "requested" => Self::Requested,
            "fingerprint" => Self::Fingerprint,
            "fingerprint_partial" => Self::FingerprintPartial,
            _ => Self::Other(s),
        }
    }
}

impl From<ViewportSource> for String {
    fn from(source: ViewportSource) -> Self {
        match source {
            ViewportSource::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ViewportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Viewport the driver reports it is actually using
///
/// Supplied by the session-creation response or live telemetry; never
/// originated by this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualViewport {
    pub width: u32,
    pub height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ViewportSource>,

    /// Human-readable explanation of a divergence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ActualViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            source: None,
            reason: None,
        }
    }

    pub fn with_source(mut self, source: ViewportSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// `reason`, ignoring blank strings
    pub fn non_empty_reason(&self) -> Option<&str> {
        self.reason.as_deref().filter(|r| !r.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_known_values() {
        let json = r#"{"width":1920,"height":1080,"source":"fingerprint_partial"}"#;
        let actual: ActualViewport = serde_json::from_str(json).unwrap();
        assert_eq!(actual.source, Some(ViewportSource::FingerprintPartial));
        assert_eq!(actual.reason, None);
    }

    #[test]
    fn test_source_unknown_value_is_kept() {
        let json = r#"{"width":800,"height":600,"source":"device_preset"}"#;
        let actual: ActualViewport = serde_json::from_str(json).unwrap();
        assert_eq!(
            actual.source,
            Some(ViewportSource::Other("device_preset".to_string()))
        );
        let out = serde_json::to_string(&actual).unwrap();
        assert!(out.contains("\"source\":\"device_preset\""));
    }

    #[test]
    fn test_blank_reason_is_ignored() {
        let actual = ActualViewport::new(1920, 1080).with_reason("   ");
        assert_eq!(actual.non_empty_reason(), None);
        let actual = actual.with_reason("profile override");
        assert_eq!(actual.non_empty_reason(), Some("profile override"));
    }

    #[test]
    fn test_dimensions_display() {
        assert_eq!(Dimensions::new(1280, 720).to_string(), "1280x720");
    }
}
