#![forbid(unsafe_code)]

//! Step-based editor host for the page.
//!
//! [`StepEditor`] wraps an [`EditorSession`] over a [`WebBackend`] and
//! exposes the non-blocking, host-driven API the page's JS glue calls:
//!
//! 1. [`init`](StepEditor::init) once the DOM is ready,
//! 2. [`push_event`](StepEditor::push_event) / [`push_frame`](StepEditor::push_frame)
//!    as DOM and socket callbacks fire,
//! 3. [`advance_time`](StepEditor::advance_time) from `requestAnimationFrame`
//!    or a timer,
//! 4. [`step`](StepEditor::step) to process everything queued,
//! 5. [`take_outbox`](StepEditor::take_outbox) to flush socket writes.

use core::time::Duration;
use std::collections::VecDeque;

use tracing::debug;
use typlive_core::{EditorEvent, WireError};
use typlive_runtime::{EditorConfig, EditorSession, SessionPhase, ViewState};

use crate::frame_parser::{decode_compile_ack, decode_frame};
use crate::{OutboundFrame, WebBackend};

/// Outcome of a single [`StepEditor::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the session still accepts events.
    pub running: bool,
    /// Host events processed (surface change echoes included).
    pub events_processed: u32,
    /// Compile frames written during this step.
    pub frames_sent: usize,
}

/// Host-driven editor.
#[derive(Debug)]
pub struct StepEditor {
    session: EditorSession<WebBackend>,
    queue: VecDeque<EditorEvent>,
    steps: u64,
}

impl StepEditor {
    /// Create an editor over a fresh [`WebBackend`].
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_backend(WebBackend::new(), config)
    }

    /// Create an editor over a prepared backend.
    #[must_use]
    pub fn with_backend(backend: WebBackend, config: &EditorConfig) -> Self {
        Self {
            session: EditorSession::new(backend, config),
            queue: VecDeque::new(),
            steps: 0,
        }
    }

    /// Apply the initial environment and request the first connection.
    pub fn init(&mut self) {
        self.session.init();
        // Loading a stored buffer echoes through the surface.
        self.drain_surface();
    }

    /// Queue a host event for the next step.
    pub fn push_event(&mut self, event: EditorEvent) {
        self.queue.push_back(event);
    }

    /// Decode a socket frame and queue it.
    pub fn push_frame(&mut self, event: &str, payload: &str) -> Result<(), WireError> {
        self.queue.push_back(decode_frame(event, payload)?);
        Ok(())
    }

    /// Decode an acknowledged `compile_result` for request `seq` and queue it.
    pub fn push_ack(&mut self, seq: u64, payload: &str) -> Result<(), WireError> {
        self.queue.push_back(decode_compile_ack(seq, payload)?);
        Ok(())
    }

    /// Replace the surface content as a user edit.
    pub fn type_text(&mut self, value: impl Into<String>) {
        self.session.backend_mut().surface_mut().type_text(value);
    }

    /// Advance the deterministic clock.
    pub fn advance_time(&mut self, dt: Duration) {
        self.session.backend_mut().clock_mut().advance(dt);
    }

    /// Set the deterministic clock.
    pub fn set_time(&mut self, now: Duration) {
        self.session.backend_mut().clock_mut().set(now);
    }

    /// Process everything queued, then fire due deadlines.
    pub fn step(&mut self) -> StepResult {
        let sent_before = self.session.backend().transport_ref().outbox().len();
        let mut processed = self.drain_surface();

        while let Some(event) = self.queue.pop_front() {
            self.session.handle(event);
            processed += 1;
            processed += self.drain_surface();
        }
        self.session.tick();

        self.steps += 1;
        let sent_after = self.session.backend().transport_ref().outbox().len();
        let result = StepResult {
            running: self.session.phase() == SessionPhase::Running,
            events_processed: processed,
            frames_sent: sent_after.saturating_sub(sent_before),
        };
        debug!(
            target: "typlive.session",
            step = self.steps,
            events = result.events_processed,
            frames = result.frames_sent,
            "step"
        );
        result
    }

    /// Close the link and stop the session.
    pub fn teardown(&mut self) {
        self.session.teardown();
        self.queue.clear();
    }

    /// Earliest pending deadline, for scheduling the next timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.session.next_deadline()
    }

    /// What the page should render.
    #[must_use]
    pub fn view(&self) -> &ViewState {
        self.session.view()
    }

    /// Take the socket writes produced so far.
    pub fn take_outbox(&mut self) -> Vec<OutboundFrame> {
        self.session.backend_mut().transport_mut().take_outbox()
    }

    /// The wrapped session.
    #[must_use]
    pub fn session(&self) -> &EditorSession<WebBackend> {
        &self.session
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &WebBackend {
        self.session.backend()
    }

    /// The backend, mutably.
    pub fn backend_mut(&mut self) -> &mut WebBackend {
        self.session.backend_mut()
    }

    fn drain_surface(&mut self) -> u32 {
        let changes: Vec<_> = self
            .session
            .backend_mut()
            .surface_mut()
            .drain_changes()
            .collect();
        let count = changes.len() as u32;
        for change in changes {
            self.session.handle(change.into());
        }
        count
    }
}
