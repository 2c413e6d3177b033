//! # Session Client
//!
//! Backends that accept viewport updates for a live recording session.
//!
//! Responsibilities:
//! - HTTP backend posting to the recording API
//! - Log-only backend for dry runs
//! - Mock backend recording requests for tests and demos

pub mod backends;
pub mod error;
pub mod factory;

pub use backends::{HttpBackend, LogBackend, MockBackend, ViewportRequest};
pub use contracts::{ContractError, Dimensions, SessionId, ViewportBackend};
pub use error::SessionClientError;
pub use factory::{create_backend, AnyBackend, BackendKind};
