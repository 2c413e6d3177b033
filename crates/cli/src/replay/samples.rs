//! Size sample parsing.
//!
//! One sample per line, either `WxH[@delay_ms]` or a JSON object
//! `{"width": .., "height": .., "delay_ms": ..}`. Blank lines and `#`
//! comments are ignored.

use std::time::Duration;

use contracts::RawBounds;
use serde::Deserialize;

use crate::error::{CliError, Result};

/// A container size observation and the pause preceding it
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Sample {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub delay_ms: u64,
}

impl Sample {
    pub fn bounds(&self) -> RawBounds {
        RawBounds::new(self.width, self.height)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Parse every sample in `content`; line numbers in errors are 1-based
pub fn parse_samples(content: &str) -> Result<Vec<Sample>> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                None
            } else {
                Some(parse_line(line).map_err(|message| CliError::sample_parse(idx + 1, message)))
            }
        })
        .collect()
}

fn parse_line(line: &str) -> std::result::Result<Sample, String> {
    if line.starts_with('{') {
        return serde_json::from_str(line).map_err(|e| e.to_string());
    }

    let (dims, delay) = match line.split_once('@') {
        Some((dims, delay)) => (dims, Some(delay)),
        None => (line, None),
    };

    let (width, height) = dims
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{dims}'"))?;
    let width = parse_axis("width", width)?;
    let height = parse_axis("height", height)?;

    let delay_ms = match delay {
        Some(delay) => delay
            .trim()
            .trim_end_matches("ms")
            .parse()
            .map_err(|e| format!("invalid delay '{delay}': {e}"))?,
        None => 0,
    };

    Ok(Sample {
        width,
        height,
        delay_ms,
    })
}

fn parse_axis(axis: &str, value: &str) -> std::result::Result<f64, String> {
    value
        .trim()
        .parse()
        .map_err(|e| format!("invalid {axis} '{value}': {e}"))
}
