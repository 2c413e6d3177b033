//! Backend implementations
//!
//! Contains HttpBackend, LogBackend, and MockBackend.

mod http;
mod log;
mod mock;

pub use self::http::HttpBackend;
pub use self::log::LogBackend;
pub use self::mock::{MockBackend, ViewportRequest};
