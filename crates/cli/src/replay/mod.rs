//! Sample replay - drives a viewport context from recorded size samples.

mod runner;
mod samples;
mod stats;

pub use runner::{replay, ReplayConfig};
pub use samples::{parse_samples, Sample};
pub use stats::ReplayStats;
