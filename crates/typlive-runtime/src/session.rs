#![forbid(unsafe_code)]

//! Editor session: one per page.
//!
//! [`EditorSession`] owns the backend and every runtime component and routes
//! [`EditorEvent`]s between them. The host drives it:
//!
//! 1. [`init`](EditorSession::init) once the page is ready,
//! 2. [`handle`](EditorSession::handle) for every DOM/socket event,
//! 3. [`tick`](EditorSession::tick) whenever the clock passes
//!    [`next_deadline`](EditorSession::next_deadline),
//! 4. [`teardown`](EditorSession::teardown) on unload.
//!
//! Nothing propagates out of `handle` or `tick`: transport failures are
//! logged and folded into the connection lifecycle.

use tracing::{debug, debug_span, info};
use typlive_backend::{EditorBackend, EditorClock};
use typlive_core::{EditorEvent, Environment, EnvironmentStore, PageEvent};
use web_time::Duration;

use crate::config::EditorConfig;
use crate::connection::{ConnectionManager, ConnectionState, LinkChange};
use crate::controller::EnvironmentController;
use crate::pipeline::{CompilePipeline, Dispatch};
use crate::view::ViewState;

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, `init` not called yet.
    Created,
    /// Accepting events.
    Running,
    /// Torn down.
    Closed,
}

/// Environment-aware editor with a debounced compile loop.
#[derive(Debug)]
pub struct EditorSession<B: EditorBackend> {
    backend: B,
    controller: EnvironmentController,
    pipeline: CompilePipeline,
    link: ConnectionManager,
    view: ViewState,
    phase: SessionPhase,
}

impl<B: EditorBackend> EditorSession<B> {
    /// Create a session. Nothing touches the backend until [`init`](Self::init).
    pub fn new(backend: B, config: &EditorConfig) -> Self {
        let initial = config.initial_environment;
        Self {
            backend,
            controller: EnvironmentController::new(initial),
            pipeline: CompilePipeline::new(config.compile_delay()),
            link: ConnectionManager::new(config.reconnect.clone()),
            view: ViewState::new(initial),
            phase: SessionPhase::Created,
        }
    }

    /// Create a session whose buffers start from `store`.
    pub fn with_store(backend: B, config: &EditorConfig, store: EnvironmentStore) -> Self {
        let mut session = Self::new(backend, config);
        session.view = ViewState::new(store.current());
        session.controller = EnvironmentController::with_store(store);
        session
    }

    /// What the host should render.
    #[inline]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Per-environment buffers.
    #[inline]
    pub fn store(&self) -> &EnvironmentStore {
        self.controller.store()
    }

    /// The active environment.
    #[inline]
    pub fn environment(&self) -> Environment {
        self.controller.current()
    }

    /// Link state.
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.link.state()
    }

    /// Lifecycle phase.
    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The backend.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably (hosts push surface state through it).
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Apply the initial environment and open the link.
    pub fn init(&mut self) {
        if self.phase != SessionPhase::Created {
            debug!(target: "typlive.session", phase = ?self.phase, "init ignored");
            return;
        }
        let now = self.now();
        self.controller.init(self.backend.surface(), &mut self.view);
        self.link.start(self.backend.transport(), &mut self.view, now);
        self.phase = SessionPhase::Running;
        info!(
            target: "typlive.session",
            env = %self.controller.current(),
            "session started"
        );
    }

    /// Route one host event.
    pub fn handle(&mut self, event: EditorEvent) {
        if self.phase != SessionPhase::Running {
            debug!(
                target: "typlive.session",
                kind = event.kind(),
                phase = ?self.phase,
                "event ignored"
            );
            return;
        }
        let _span = debug_span!("typlive.handle", kind = event.kind()).entered();
        let now = self.now();

        match event {
            EditorEvent::Change(change) => {
                if self.controller.record_change(&change) {
                    self.pipeline.schedule(now);
                }
            }
            EditorEvent::SelectEnvironment(env) => {
                if self
                    .controller
                    .switch(self.backend.surface(), env, &mut self.view)
                {
                    self.pipeline.invalidate();
                }
            }
            EditorEvent::ClearCurrent { confirmed: false } => {
                debug!(target: "typlive.session", "clear not confirmed");
            }
            EditorEvent::ClearCurrent { confirmed: true } => {
                self.controller
                    .clear_current(self.backend.surface(), &mut self.view);
                self.pipeline.invalidate();
            }
            EditorEvent::ManualCompile => {
                self.compile_now(now);
            }
            EditorEvent::InsertSymbol { text, cursor_back } => {
                self.controller
                    .insert(self.backend.surface(), &text, cursor_back);
                self.pipeline.schedule(now);
            }
            EditorEvent::Connection(event) => {
                let change =
                    self.link
                        .on_event(&event, self.backend.transport(), &mut self.view, now);
                match change {
                    LinkChange::Established => self.recompile_on_connect(now),
                    LinkChange::Lost => self.pipeline.forget_outstanding(),
                    LinkChange::Unchanged => {}
                }
            }
            EditorEvent::CompileResult(tagged) => {
                self.pipeline.deliver(tagged, &mut self.view);
            }
            EditorEvent::Page(PageEvent::VisibilityChanged { visible: false }) => {}
            EditorEvent::Page(PageEvent::VisibilityChanged { visible: true } | PageEvent::Restored) => {
                if self
                    .link
                    .ensure_connected(self.backend.transport(), &mut self.view, now)
                {
                    info!(target: "typlive.session", "page resumed, reconnecting");
                }
            }
            EditorEvent::Page(PageEvent::Unload) => self.teardown(),
        }
    }

    /// Fire due deadlines: the compile window and the reconnect backoff.
    pub fn tick(&mut self) {
        if self.phase != SessionPhase::Running {
            return;
        }
        let now = self.now();
        if self.pipeline.take_due(now) {
            self.compile_now(now);
        }
        self.link
            .poll(self.backend.transport(), &mut self.view, now);
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.pipeline.deadline(), self.link.retry_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Close the link and stop accepting events. Idempotent.
    pub fn teardown(&mut self) {
        if self.phase == SessionPhase::Closed {
            return;
        }
        self.pipeline.cancel();
        self.link.shutdown(self.backend.transport());
        self.phase = SessionPhase::Closed;
        info!(target: "typlive.session", "session closed");
    }

    fn now(&self) -> Duration {
        self.backend.clock().now_mono()
    }

    fn compile_now(&mut self, now: Duration) -> Dispatch {
        let env = self.controller.current();
        let source = self.controller.source(self.backend.surface());
        self.pipeline.compile(
            env,
            &source,
            &mut self.link,
            self.backend.transport(),
            &mut self.view,
            now,
        )
    }

    fn recompile_on_connect(&mut self, now: Duration) {
        let source = self.controller.source(self.backend.surface());
        if source.trim().is_empty() {
            self.pipeline.cancel();
            return;
        }
        let dispatch = self.compile_now(now);
        debug!(target: "typlive.session", ?dispatch, "recompiled after connect");
    }
}
