/// Errors returned by a generation backend before they are normalized into a
/// terminal session failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Backend returned an application-level failure (HTTP status, auth, etc.).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        status_code: Option<u16>,
    },
    /// Transport or stream I/O failed.
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl BackendError {
    /// Creates a backend-level error.
    pub fn backend(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::Backend {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Terminal failure for one generation session, sent through
/// `SessionEvent::Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum SessionFailure {
    /// The producer reported a failure in an error frame.
    #[error("producer failure: {message}")]
    Producer { message: String },
    /// Network/stream transport failed mid-session.
    #[error("transport failure: {message}")]
    Transport { message: String },
    /// The stream violated the protocol (closed with no completion frame).
    #[error("protocol failure: {message}")]
    Protocol { message: String },
    /// The session was cancelled by the caller.
    #[error("generation cancelled")]
    Cancelled,
}

/// Fetch-phase errors for the generated outline document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No document exists upstream for the given identifier.
    #[error("outline document not found: {curriculum_id}")]
    NotFound { curriculum_id: String },
    /// The top-level document shape could not be interpreted at all.
    #[error("malformed outline document: {message}")]
    MalformedDocument { message: String },
    /// The fetch request itself failed.
    #[error("fetch transport error: {message}")]
    Transport { message: String },
}

/// Top-level error type for the public client API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client/backend configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid user input to the builder API.
    #[error("validation error: {0}")]
    Validation(String),
    /// Terminal failure of the streaming phase.
    #[error(transparent)]
    Generation(SessionFailure),
    /// Terminal failure of the fetch phase.
    #[error(transparent)]
    Fetch(FetchError),
    /// Internal protocol misuse or invariant violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ClientError {
    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<SessionFailure> for ClientError {
    fn from(value: SessionFailure) -> Self {
        ClientError::Generation(value)
    }
}

impl From<FetchError> for ClientError {
    fn from(value: FetchError) -> Self {
        ClientError::Fetch(value)
    }
}

pub(crate) fn session_failure_from_backend_error(err: &BackendError) -> SessionFailure {
    match err {
        BackendError::Backend { message, .. } => SessionFailure::Producer {
            message: message.clone(),
        },
        BackendError::Transport { message } => SessionFailure::Transport {
            message: message.clone(),
        },
    }
}
