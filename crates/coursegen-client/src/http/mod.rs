//! HTTP implementation of the generation backend.
//!
//! Transport specifics (endpoints, status mapping, client construction)
//! live here so the session state machine stays transport-agnostic.
mod backend;
mod config;

pub use backend::HttpBackend;
pub use config::HttpBackendConfig;
