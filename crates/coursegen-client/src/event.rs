use tracing::debug;

/// Literal prefix carried by every meaningful frame of the progress stream.
pub const DATA_PREFIX: &str = "data:";

/// Classification of one decoded frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Incremental progress update.
    Progress,
    /// The job finished; `result_id` identifies the generated document.
    Terminal,
    /// The producer reported a failure.
    Error,
    /// The frame payload could not be parsed; carried for diagnostics only.
    Unknown,
}

/// One decoded frame of the progress stream.
///
/// Transient: produced per frame and consumed immediately by the session's
/// read loop, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    pub kind: EventKind,
    pub message: String,
    /// Cumulative percent in `[0, 100]`. The producer may send
    /// non-monotonic values; they are accepted as-is.
    pub percent: u8,
    /// Producer phase number (0-3) when present.
    pub phase: Option<u8>,
    /// Generated document identifier, populated on `Terminal` frames.
    pub result_id: Option<String>,
    pub error_text: Option<String>,
}

#[derive(serde::Deserialize)]
struct FramePayload {
    message: Option<String>,
    progress: Option<f64>,
    phase: Option<u8>,
    done: Option<bool>,
    #[serde(alias = "id")]
    curriculum_id: Option<String>,
    error: Option<bool>,
}

/// Decodes one line of the stream.
///
/// Returns `None` for lines without the [`DATA_PREFIX`] (blank keep-alives,
/// comments); those are ignored, not errors. A prefixed line whose payload
/// fails to parse yields an `Unknown` event carrying the raw text; a single
/// malformed frame must never abort the session. A missing `progress` value
/// falls back to `last_percent`.
pub fn decode_frame(line: &str, last_percent: u8) -> Option<ProgressEvent> {
    let payload_text = line.strip_prefix(DATA_PREFIX)?.trim_start();

    let payload: FramePayload = match serde_json::from_str(payload_text) {
        Ok(payload) => payload,
        Err(error) => {
            debug!(%error, "unparseable progress frame");
            return Some(ProgressEvent {
                kind: EventKind::Unknown,
                message: payload_text.to_string(),
                percent: last_percent,
                phase: None,
                result_id: None,
                error_text: None,
            });
        }
    };

    let message = payload.message.unwrap_or_default();
    let percent = payload
        .progress
        .map(clamp_percent)
        .unwrap_or(last_percent);

    if payload.error == Some(true) {
        return Some(ProgressEvent {
            kind: EventKind::Error,
            error_text: Some(message.clone()),
            message,
            percent,
            phase: payload.phase,
            result_id: None,
        });
    }

    if payload.done == Some(true) {
        return Some(ProgressEvent {
            kind: EventKind::Terminal,
            message,
            percent,
            phase: payload.phase,
            result_id: payload.curriculum_id,
            error_text: None,
        });
    }

    Some(ProgressEvent {
        kind: EventKind::Progress,
        message,
        percent,
        phase: payload.phase,
        result_id: None,
        error_text: None,
    })
}

fn clamp_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0) as u8
}
