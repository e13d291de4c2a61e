use std::pin::Pin;

use coursegen_outline::RawOutlineDoc;

use crate::errors::{BackendError, FetchError};

/// Raw progress bytes as delivered by the transport, in arbitrary-sized
/// chunks.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, BackendError>> + Send + 'static>>;

/// Parameters for one curriculum generation job.
///
/// Serialized as the request body sent to the generation service.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GenerateRequest {
    pub course_name: String,
    /// Grade level, e.g. `"3"` or `"K-5"`.
    pub grade_level: String,
    pub subject: String,
    pub topic: String,
    /// Free-form duration, e.g. `"1 week"` or `"2 hours"`.
    pub time_duration: String,
    #[serde(default)]
    pub objectives: String,
    /// Owning user id; also scopes the later document fetch.
    pub teacher_id: String,
    pub num_worksheets: u32,
    pub num_activities: u32,
}

/// Seam between the session state machine and the actual transport.
///
/// The HTTP implementation lives in [`crate::http`]; tests substitute a
/// scripted fake.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Starts a generation job and returns its raw progress byte stream.
    async fn start_generation(
        &self,
        request: &GenerateRequest,
    ) -> Result<ByteStream, BackendError>;

    /// Retrieves the generated outline document once a job has finished.
    async fn fetch_document(
        &self,
        curriculum_id: &str,
        teacher_id: &str,
    ) -> Result<RawOutlineDoc, FetchError>;
}
