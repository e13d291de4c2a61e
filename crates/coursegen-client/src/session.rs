use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::backend::{GenerateRequest, GenerationBackend};
use crate::errors::{ClientError, SessionFailure, session_failure_from_backend_error};
use crate::event::{EventKind, ProgressEvent, decode_frame};
use crate::fetch::fetch_outline;
use crate::frame::FrameBuffer;
use crate::stream::{GenerationResult, SessionEvent};

/// Handle used to request cancellation of a running session.
#[derive(Clone)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests cancellation.
    ///
    /// Takes effect at the session's next suspension point and becomes
    /// visible as a terminal `SessionEvent::Error` with
    /// `SessionFailure::Cancelled`, never as a silent success.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Phases of one generation session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Fetching,
    Complete,
    Failed,
}

/// Builder for configuring and starting a single generation session.
///
/// A session lives for exactly one stream-and-fetch cycle and is never
/// reused across requests.
pub struct GenerationBuilder {
    backend: Arc<dyn GenerationBackend>,
    request: GenerateRequest,
    event_buffer_capacity: usize,
    editing: bool,
}

impl GenerationBuilder {
    pub(crate) fn new(backend: Arc<dyn GenerationBackend>, request: GenerateRequest) -> Self {
        Self {
            backend,
            request,
            event_buffer_capacity: 128,
            editing: true,
        }
    }

    /// Sets the bounded event buffer size used between the session task and
    /// the consumer.
    pub fn event_buffer_capacity(mut self, capacity: usize) -> Self {
        self.event_buffer_capacity = capacity;
        self
    }

    /// Controls the `editing` flag on the final [`GenerationResult`].
    ///
    /// Defaults to `true`: a freshly generated outline opens in the editor.
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    /// Validates the builder state and starts the streaming session.
    pub async fn start_stream(self) -> Result<GenerationStream, ClientError> {
        self.validate()?;

        let run_id = uuid::Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.event_buffer_capacity);
        let (final_tx, final_rx) = oneshot::channel();
        let (abort_tx, abort_rx) = watch::channel(false);
        let abort_handle = AbortHandle { tx: abort_tx };

        tokio::spawn(run_task(
            self.backend,
            self.request,
            run_id,
            self.editing,
            tx,
            final_tx,
            abort_rx,
        ));

        Ok(GenerationStream {
            run_id,
            rx,
            final_rx,
            abort_handle,
            saw_terminal: false,
        })
    }

    /// Runs the session to completion and returns the final result.
    pub async fn collect(self) -> Result<GenerationResult, ClientError> {
        let stream = self.start_stream().await?;
        stream.finish().await
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.request.topic.trim().is_empty() {
            return Err(ClientError::Validation("topic must not be empty".into()));
        }
        if self.request.grade_level.trim().is_empty() {
            return Err(ClientError::Validation(
                "grade_level must not be empty".into(),
            ));
        }
        if self.request.teacher_id.trim().is_empty() {
            return Err(ClientError::Validation(
                "teacher_id must not be empty".into(),
            ));
        }
        if self.event_buffer_capacity == 0 {
            return Err(ClientError::Validation(
                "event_buffer_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Streaming handle returned by `GenerationBuilder::start_stream`.
///
/// Use `next_event()` to observe progress as it arrives and `finish()` to
/// obtain the terminal result.
pub struct GenerationStream {
    run_id: uuid::Uuid,
    rx: mpsc::Receiver<SessionEvent>,
    final_rx: oneshot::Receiver<Result<GenerationResult, ClientError>>,
    abort_handle: AbortHandle,
    saw_terminal: bool,
}

impl GenerationStream {
    /// Returns the run id for this session.
    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    /// Returns a handle that can cancel the session.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort_handle.clone()
    }

    /// Waits for and returns the next session event.
    ///
    /// Events are delivered in strict frame-arrival order. Returns `None`
    /// after the event channel is closed.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let event = self.rx.recv().await;
        if let Some(SessionEvent::Completed { .. } | SessionEvent::Error { .. }) = &event {
            self.saw_terminal = true;
        }
        event
    }

    /// Drains the stream (if needed) and returns the terminal result.
    ///
    /// Safe to call after consuming events manually with `next_event()`.
    pub async fn finish(mut self) -> Result<GenerationResult, ClientError> {
        while !self.saw_terminal {
            match self.rx.recv().await {
                Some(SessionEvent::Completed { .. } | SessionEvent::Error { .. }) => {
                    self.saw_terminal = true;
                }
                Some(_) => {}
                None => break,
            }
        }

        match self.final_rx.await {
            Ok(result) => result,
            Err(_) => Err(ClientError::protocol_msg(
                "session task ended without a final result",
            )),
        }
    }
}

enum Applied {
    Continue,
    Fail(SessionFailure),
    ReceiverDropped,
}

async fn run_task(
    backend: Arc<dyn GenerationBackend>,
    request: GenerateRequest,
    run_id: uuid::Uuid,
    editing: bool,
    tx: mpsc::Sender<SessionEvent>,
    final_tx: oneshot::Sender<Result<GenerationResult, ClientError>>,
    mut abort_rx: watch::Receiver<bool>,
) {
    let mut state = SessionState::Idle;
    let mut frames = FrameBuffer::new();
    let mut result_id: Option<String> = None;
    let mut last_percent: u8 = 0;
    let mut seq: u64 = 0;
    let mut abort_closed = false;

    debug!(run_id = %run_id, ?state, "session starting");
    if !send_event(&tx, SessionEvent::Started { run_id }).await {
        let _ = final_tx.send(Err(ClientError::protocol_msg(
            "session receiver dropped before Started",
        )));
        return;
    }

    let mut bytes = match backend.start_generation(&request).await {
        Ok(stream) => stream,
        Err(err) => {
            let failure = session_failure_from_backend_error(&err);
            fail_session(&tx, final_tx, run_id, failure).await;
            return;
        }
    };
    state = SessionState::Streaming;
    debug!(run_id = %run_id, ?state, topic = %request.topic, "generation stream open");

    loop {
        tokio::select! {
            changed = abort_rx.changed(), if !abort_closed => {
                match changed {
                    Ok(_) if *abort_rx.borrow() => {
                        debug!(run_id = %run_id, "session cancelled during streaming");
                        fail_session(&tx, final_tx, run_id, SessionFailure::Cancelled).await;
                        return;
                    }
                    Ok(_) => {}
                    Err(_) => abort_closed = true,
                }
            }
            next = bytes.next() => {
                match next {
                    Some(Ok(chunk)) => {
                        for line in frames.append(&chunk) {
                            let Some(event) = decode_frame(&line, last_percent) else {
                                continue;
                            };
                            match apply_event(event, run_id, &tx, &mut seq, &mut last_percent, &mut result_id).await {
                                Applied::Continue => {}
                                Applied::Fail(failure) => {
                                    fail_session(&tx, final_tx, run_id, failure).await;
                                    return;
                                }
                                Applied::ReceiverDropped => {
                                    let _ = final_tx.send(Err(ClientError::protocol_msg(
                                        "session receiver dropped during streaming",
                                    )));
                                    return;
                                }
                            }
                        }
                    }
                    Some(Err(err)) => {
                        fail_session(&tx, final_tx, run_id, session_failure_from_backend_error(&err)).await;
                        return;
                    }
                    None => break,
                }
            }
        }
    }

    // Final flush: the terminal frame may have arrived without a trailing
    // line break before the transport closed. The remainder is decoded
    // exactly as in the normal path.
    let tail = frames.take_remainder();
    if !tail.is_empty() {
        debug!(run_id = %run_id, len = tail.len(), "flushing unterminated trailing frame");
        if let Some(event) = decode_frame(&tail, last_percent) {
            match apply_event(event, run_id, &tx, &mut seq, &mut last_percent, &mut result_id).await
            {
                Applied::Continue => {}
                Applied::Fail(failure) => {
                    fail_session(&tx, final_tx, run_id, failure).await;
                    return;
                }
                Applied::ReceiverDropped => {
                    let _ = final_tx.send(Err(ClientError::protocol_msg(
                        "session receiver dropped during final flush",
                    )));
                    return;
                }
            }
        } else {
            debug!(run_id = %run_id, "discarding unprefixed trailing bytes");
        }
    }

    let Some(curriculum_id) = result_id else {
        fail_session(
            &tx,
            final_tx,
            run_id,
            SessionFailure::Protocol {
                message: "stream closed before a completion frame".into(),
            },
        )
        .await;
        return;
    };

    state = SessionState::Fetching;
    debug!(run_id = %run_id, ?state, curriculum_id = %curriculum_id, "stream complete, fetching outline");

    let fetch = fetch_outline(backend.as_ref(), &curriculum_id, &request.teacher_id);
    tokio::pin!(fetch);
    let fetched = loop {
        tokio::select! {
            changed = abort_rx.changed(), if !abort_closed => {
                match changed {
                    Ok(_) if *abort_rx.borrow() => {
                        debug!(run_id = %run_id, "session cancelled during fetch");
                        fail_session(&tx, final_tx, run_id, SessionFailure::Cancelled).await;
                        return;
                    }
                    Ok(_) => {}
                    Err(_) => abort_closed = true,
                }
            }
            fetched = &mut fetch => break fetched,
        }
    };

    match fetched {
        Ok(outline) => {
            state = SessionState::Complete;
            debug!(run_id = %run_id, ?state, sections = outline.sections.len(), "session complete");
            let result = GenerationResult {
                curriculum_id: curriculum_id.clone(),
                outline,
                editing,
            };
            let sent = send_event(
                &tx,
                SessionEvent::Completed {
                    run_id,
                    result: result.clone(),
                },
            )
            .await;
            let _ = final_tx.send(if sent {
                Ok(result)
            } else {
                Err(ClientError::protocol_msg(
                    "session receiver dropped before completion",
                ))
            });
        }
        Err(err) => {
            state = SessionState::Failed;
            debug!(run_id = %run_id, ?state, error = %err, "outline fetch failed");
            let error = ClientError::Fetch(err);
            let _ = send_event(
                &tx,
                SessionEvent::Error {
                    run_id,
                    error: error.clone(),
                },
            )
            .await;
            let _ = final_tx.send(Err(error));
        }
    }
}

async fn apply_event(
    event: ProgressEvent,
    run_id: uuid::Uuid,
    tx: &mpsc::Sender<SessionEvent>,
    seq: &mut u64,
    last_percent: &mut u8,
    result_id: &mut Option<String>,
) -> Applied {
    *last_percent = event.percent;
    match event.kind {
        EventKind::Progress | EventKind::Unknown => {
            let sent = send_event(
                tx,
                SessionEvent::Progress {
                    run_id,
                    seq: *seq,
                    message: event.message,
                    percent: event.percent,
                    phase: event.phase,
                },
            )
            .await;
            *seq = seq.saturating_add(1);
            if sent {
                Applied::Continue
            } else {
                Applied::ReceiverDropped
            }
        }
        // A terminal frame is a candidate, not proof: record the id and
        // keep reading until the transport closes.
        EventKind::Terminal => {
            debug!(run_id = %run_id, result_id = ?event.result_id, "terminal frame observed");
            if event.result_id.is_some() {
                *result_id = event.result_id;
            }
            Applied::Continue
        }
        EventKind::Error => Applied::Fail(SessionFailure::Producer {
            message: event.error_text.unwrap_or(event.message),
        }),
    }
}

async fn fail_session(
    tx: &mpsc::Sender<SessionEvent>,
    final_tx: oneshot::Sender<Result<GenerationResult, ClientError>>,
    run_id: uuid::Uuid,
    failure: SessionFailure,
) {
    let error = ClientError::Generation(failure);
    let _ = send_event(
        tx,
        SessionEvent::Error {
            run_id,
            error: error.clone(),
        },
    )
    .await;
    let _ = final_tx.send(Err(error));
}

async fn send_event(tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) -> bool {
    tx.send(event).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ByteStream;
    use crate::errors::{BackendError, FetchError};
    use bytes::Bytes;
    use coursegen_outline::RawOutlineDoc;
    use futures::stream;

    const DOC_JSON: &str = r#"{"sections": [{"id": "s1", "title": "Intro", "subsections": []}]}"#;

    struct FakeBackend {
        chunks: Vec<Result<Bytes, BackendError>>,
        pending: bool,
        document: Result<&'static str, FetchError>,
    }

    impl FakeBackend {
        fn with_chunks(chunks: Vec<&'static str>) -> Self {
            Self {
                chunks: chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect(),
                pending: false,
                document: Ok(DOC_JSON),
            }
        }

        fn pending() -> Self {
            Self {
                chunks: Vec::new(),
                pending: true,
                document: Ok(DOC_JSON),
            }
        }
    }

    #[async_trait::async_trait]
    impl GenerationBackend for FakeBackend {
        async fn start_generation(
            &self,
            _request: &GenerateRequest,
        ) -> Result<ByteStream, BackendError> {
            if self.pending {
                return Ok(Box::pin(stream::pending()));
            }
            Ok(Box::pin(stream::iter(self.chunks.clone())))
        }

        async fn fetch_document(
            &self,
            _curriculum_id: &str,
            _teacher_id: &str,
        ) -> Result<RawOutlineDoc, FetchError> {
            match &self.document {
                Ok(json) => Ok(serde_json::from_str(json).expect("test document")),
                Err(err) => Err(err.clone()),
            }
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            course_name: "Intro to Fractions".into(),
            grade_level: "3".into(),
            subject: "Math".into(),
            topic: "Fractions".into(),
            time_duration: "2 hours".into(),
            objectives: String::new(),
            teacher_id: "t-1".into(),
            num_worksheets: 2,
            num_activities: 1,
        }
    }

    fn builder(backend: FakeBackend) -> GenerationBuilder {
        GenerationBuilder::new(Arc::new(backend), request())
    }

    fn split_stream(text: &str, size: usize) -> Vec<Result<Bytes, BackendError>> {
        text.as_bytes()
            .chunks(size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect()
    }

    #[tokio::test]
    async fn validation_rejects_empty_topic() {
        let mut req = request();
        req.topic = "   ".into();
        let err = GenerationBuilder::new(Arc::new(FakeBackend::with_chunks(Vec::new())), req)
            .start_stream()
            .await;
        let err = match err {
            Ok(_) => panic!("empty topic should fail"),
            Err(err) => err,
        };
        assert!(matches!(err, ClientError::Validation(msg) if msg.contains("topic")));
    }

    #[tokio::test]
    async fn validation_rejects_zero_buffer_capacity() {
        let err = builder(FakeBackend::with_chunks(Vec::new()))
            .event_buffer_capacity(0)
            .start_stream()
            .await;
        let err = match err {
            Ok(_) => panic!("zero capacity should fail"),
            Err(err) => err,
        };
        assert!(matches!(err, ClientError::Validation(msg) if msg.contains("capacity")));
    }

    #[tokio::test]
    async fn progress_events_fire_in_frame_arrival_order() {
        let mut run = builder(FakeBackend::with_chunks(vec![
            "data: {\"message\":\"a\",\"progress\":10}\nda",
            "ta: {\"message\":\"b\",\"progress\":45}\ndata: {\"message\":\"c\",\"prog",
            "ress\":80}\n",
            "data: {\"message\":\"d\",\"progress\":100}\n",
            "data: {\"message\":\"done\",\"progress\":100,\"done\":true,\"curriculum_id\":\"c-1\"}\n",
        ]))
        .start_stream()
        .await
        .expect("start");

        let mut percents = Vec::new();
        let mut seqs = Vec::new();
        let mut saw_terminal = false;
        while let Some(event) = run.next_event().await {
            match event {
                SessionEvent::Progress { seq, percent, .. } => {
                    seqs.push(seq);
                    percents.push(percent);
                }
                SessionEvent::Completed { .. } => {
                    saw_terminal = true;
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(percents, vec![10, 45, 80, 100]);
        assert_eq!(seqs, vec![0, 1, 2, 3]);
        assert!(saw_terminal);
        let result = run.finish().await.expect("finish");
        assert_eq!(result.curriculum_id, "c-1");
    }

    #[tokio::test]
    async fn final_flush_recovers_unterminated_terminal_frame() {
        let result = builder(FakeBackend::with_chunks(vec![
            "data: {\"message\":\"Outlining\",\"progress\":20,\"done\":false}\n",
            "data: {\"message\":\"Done\",\"progress\":100,\"done\":true,\"id\":\"c-1\"}",
        ]))
        .collect()
        .await
        .expect("collect");

        assert_eq!(result.curriculum_id, "c-1");
        assert!(result.editing);
        assert_eq!(result.outline.sections.len(), 1);
        assert_eq!(result.outline.sections[0].title, "Intro");
        assert!(result.outline.sections[0].subsections.is_empty());
    }

    #[tokio::test]
    async fn outline_is_independent_of_chunk_boundaries() {
        let stream_text = concat!(
            "data: {\"message\":\"Starting\",\"progress\":0}\n",
            "data: {\"message\":\"Structure\",\"progress\":40}\n",
            "data: {\"message\":\"Videos\",\"progress\":80}\n",
            "data: {\"message\":\"Complete!\",\"progress\":100,\"done\":true,\"curriculum_id\":\"c-9\"}\n",
        );

        let mut outlines = Vec::new();
        for size in [1, 7, stream_text.len()] {
            let backend = FakeBackend {
                chunks: split_stream(stream_text, size),
                pending: false,
                document: Ok(DOC_JSON),
            };
            let result = builder(backend).collect().await.expect("collect");
            assert_eq!(result.curriculum_id, "c-9");
            outlines.push(result.outline);
        }
        assert_eq!(outlines[0], outlines[1]);
        assert_eq!(outlines[1], outlines[2]);
    }

    #[tokio::test]
    async fn progress_only_stream_fails_with_protocol_error() {
        let err = builder(FakeBackend::with_chunks(vec![
            "data: {\"message\":\"a\",\"progress\":10}\n",
            "data: {\"message\":\"b\",\"progress\":90}\n",
        ]))
        .collect()
        .await
        .expect_err("no terminal frame");
        assert!(matches!(
            err,
            ClientError::Generation(SessionFailure::Protocol { message })
                if message.contains("completion")
        ));
    }

    #[tokio::test]
    async fn producer_error_frame_fails_session() {
        let mut run = builder(FakeBackend::with_chunks(vec![
            "data: {\"message\":\"Error: Phase 1 failed\",\"progress\":0,\"error\":true}\n",
        ]))
        .start_stream()
        .await
        .expect("start");

        let mut saw_error = false;
        while let Some(event) = run.next_event().await {
            if matches!(event, SessionEvent::Error { .. }) {
                saw_error = true;
                break;
            }
        }
        assert!(saw_error);
        assert!(matches!(
            run.finish().await,
            Err(ClientError::Generation(SessionFailure::Producer { message }))
                if message.contains("Phase 1 failed")
        ));
    }

    #[tokio::test]
    async fn malformed_frame_is_swallowed_and_stream_continues() {
        let mut run = builder(FakeBackend::with_chunks(vec![
            "data: {broken\n",
            "data: {\"message\":\"done\",\"progress\":100,\"done\":true,\"curriculum_id\":\"c-1\"}\n",
        ]))
        .start_stream()
        .await
        .expect("start");

        let mut raw_messages = Vec::new();
        while let Some(event) = run.next_event().await {
            match event {
                SessionEvent::Progress { message, .. } => raw_messages.push(message),
                SessionEvent::Completed { .. } => break,
                SessionEvent::Error { error, .. } => panic!("unexpected failure: {error}"),
                SessionEvent::Started { .. } => {}
            }
        }
        assert_eq!(raw_messages, vec!["{broken"]);
        assert!(run.finish().await.is_ok());
    }

    #[tokio::test]
    async fn keep_alive_lines_produce_no_events() {
        let mut run = builder(FakeBackend::with_chunks(vec![
            ": ping\n\n",
            "data: {\"message\":\"done\",\"progress\":100,\"done\":true,\"curriculum_id\":\"c-1\"}\n",
        ]))
        .start_stream()
        .await
        .expect("start");

        let mut progress_events = 0;
        while let Some(event) = run.next_event().await {
            match event {
                SessionEvent::Progress { .. } => progress_events += 1,
                SessionEvent::Completed { .. } => break,
                _ => {}
            }
        }
        assert_eq!(progress_events, 0);
        assert!(run.finish().await.is_ok());
    }

    #[tokio::test]
    async fn cancellation_emits_terminal_error() {
        let mut run = builder(FakeBackend::pending())
            .start_stream()
            .await
            .expect("start");

        let abort = run.abort_handle();
        let _ = run.next_event().await;
        abort.abort();

        let mut saw_cancel = false;
        while let Some(event) = run.next_event().await {
            if let SessionEvent::Error {
                error: ClientError::Generation(SessionFailure::Cancelled),
                ..
            } = event
            {
                saw_cancel = true;
                break;
            }
        }
        assert!(saw_cancel);
        assert!(matches!(
            run.finish().await,
            Err(ClientError::Generation(SessionFailure::Cancelled))
        ));
    }

    #[tokio::test]
    async fn transport_error_fails_session() {
        let backend = FakeBackend {
            chunks: vec![
                Ok(Bytes::from("data: {\"message\":\"a\",\"progress\":10}\n")),
                Err(BackendError::transport("connection reset")),
            ],
            pending: false,
            document: Ok(DOC_JSON),
        };
        let err = builder(backend).collect().await.expect_err("transport error");
        assert!(matches!(
            err,
            ClientError::Generation(SessionFailure::Transport { message })
                if message.contains("connection reset")
        ));
    }

    #[tokio::test]
    async fn fetch_not_found_fails_session() {
        let backend = FakeBackend {
            chunks: vec![Ok(Bytes::from(
                "data: {\"message\":\"done\",\"progress\":100,\"done\":true,\"curriculum_id\":\"gone\"}\n",
            ))],
            pending: false,
            document: Err(FetchError::NotFound {
                curriculum_id: "gone".into(),
            }),
        };
        let err = builder(backend).collect().await.expect_err("missing document");
        assert!(matches!(
            err,
            ClientError::Fetch(FetchError::NotFound { curriculum_id }) if curriculum_id == "gone"
        ));
    }

    #[tokio::test]
    async fn editing_flag_is_propagated() {
        let result = builder(FakeBackend::with_chunks(vec![
            "data: {\"done\":true,\"curriculum_id\":\"c-1\"}\n",
        ]))
        .editing(false)
        .collect()
        .await
        .expect("collect");
        assert!(!result.editing);
    }
}
