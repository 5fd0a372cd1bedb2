//! Vigil Gateway
//!
//! Thin HTTP facade over Vigil: artifact sealing plus echo-style chat and
//! vision endpoints. Handlers hold no state.

pub mod api;

pub use api::create_router;

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
