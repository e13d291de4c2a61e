//! Streaming client for the curriculum generation service.
//!
//! A generation job reports progress over a chunked, line-framed text
//! stream and finishes by naming the generated document. This crate drives
//! that protocol end to end: it reassembles frames from arbitrary chunk
//! splits, decodes them into typed events, runs the session state machine
//! (including recovery of a trailing frame the transport cut off without a
//! line break), then fetches the finished document and hands back a
//! normalized [`Outline`].
//!
//! # Usage
//!
//! ```no_run
//! use coursegen_client::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let client = OutlineClient::from_env()?;
//!
//! let request = GenerateRequest {
//!     course_name: "Intro to Fractions".into(),
//!     grade_level: "3".into(),
//!     subject: "Math".into(),
//!     topic: "Fractions".into(),
//!     time_duration: "2 hours".into(),
//!     teacher_id: "teacher-1".into(),
//!     num_worksheets: 2,
//!     num_activities: 1,
//!     ..GenerateRequest::default()
//! };
//!
//! let mut run = client.generate(request).start_stream().await?;
//! while let Some(event) = run.next_event().await {
//!     if let SessionEvent::Progress { message, percent, .. } = event {
//!         println!("[{percent:>3}%] {message}");
//!     }
//! }
//! let result = run.finish().await?;
//! println!("generated {} sections", result.outline.sections.len());
//! # Ok(())
//! # }
//! ```

/// Backend trait seam and generation request type.
pub mod backend;
/// Client entry point.
pub mod client;
/// Public error types used by the client API.
pub mod errors;
/// Frame-to-event decoding.
pub mod event;
/// Fetch-and-normalize boundary for the generated document.
pub mod fetch;
/// Line framing over chunked transport reads.
pub mod frame;
/// HTTP backend implementation.
pub mod http;
/// Process-wide logging setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Generation session state machine and streaming handle.
pub mod session;
/// Public session events and the final handoff value.
pub mod stream;

pub use backend::{ByteStream, GenerateRequest, GenerationBackend};
pub use client::OutlineClient;
pub use coursegen_outline::{Outline, Resource, ResourceKind, Section, Subsection};
pub use errors::{BackendError, ClientError, FetchError, SessionFailure};
pub use event::{EventKind, ProgressEvent};
pub use fetch::fetch_outline;
pub use frame::FrameBuffer;
pub use http::{HttpBackend, HttpBackendConfig};
pub use session::{AbortHandle, GenerationBuilder, GenerationStream, SessionState};
pub use stream::{GenerationResult, SessionEvent};
