use coursegen_outline::Outline;

use crate::errors::ClientError;

/// Final value handed to the presentation layer after a successful session.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GenerationResult {
    /// Identifier of the generated document, from the terminal frame.
    pub curriculum_id: String,
    pub outline: Outline,
    /// Whether the outline should open in editing mode.
    pub editing: bool,
}

/// Public events emitted by a `GenerationStream`.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// First event for every session.
    Started { run_id: uuid::Uuid },
    /// Progress update, delivered in strict frame-arrival order.
    Progress {
        run_id: uuid::Uuid,
        seq: u64,
        message: String,
        percent: u8,
        phase: Option<u8>,
    },
    /// Terminal success event carrying the normalized outline.
    Completed {
        run_id: uuid::Uuid,
        result: GenerationResult,
    },
    /// Terminal failure event.
    ///
    /// Streaming-phase failures arrive as `ClientError::Generation`,
    /// fetch-phase failures as `ClientError::Fetch`.
    Error {
        run_id: uuid::Uuid,
        error: ClientError,
    },
}
