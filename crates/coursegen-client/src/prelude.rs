//! Common imports for typical client usage.
//!
//! This module intentionally exports the most frequently used request,
//! session, and error types so examples and application code need fewer
//! import lines.
pub use crate::{
    AbortHandle, ClientError, FetchError, GenerateRequest, GenerationResult, GenerationStream,
    HttpBackendConfig, Outline, OutlineClient, SessionEvent, SessionFailure,
};
