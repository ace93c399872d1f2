#![forbid(unsafe_code)]

//! Compiler link lifecycle.
//!
//! [`ConnectionManager`] tracks [`ConnectionState`], reacts to lifecycle
//! events pushed by the host, and re-dials with backoff. Retries are data: a
//! deadline that [`poll`](ConnectionManager::poll) fires once the host's
//! clock passes it.
//!
//! ```text
//! Disconnected --connect()--> Connecting --Connected--> Connected
//! Connected --drop--> Disconnected (retry scheduled)
//! Connected --server disconnect--> Connecting (re-dialed at once)
//! Connecting --ConnectError, budget spent--> Disconnected (terminal)
//! ```

use tracing::{debug, info, warn};
use typlive_backend::Transport;
use typlive_core::{ConnectionEvent, DisconnectReason};
use web_time::Duration;

use crate::retry::RetryPolicy;
use crate::view::{Notice, ViewState};

/// Link state as seen by the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in progress.
    #[default]
    Disconnected,
    /// `connect()` was issued; waiting for the outcome.
    Connecting,
    /// Ready to carry compile requests.
    Connected,
}

/// What a lifecycle event means for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    /// Nothing the session needs to act on.
    Unchanged,
    /// The link is up (first connect or reconnect).
    Established,
    /// The link went down; in-flight requests will not be answered.
    Lost,
}

/// Connection state machine with bounded, deterministic retry.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    state: ConnectionState,
    policy: RetryPolicy,
    attempt: u32,
    retry_at: Option<Duration>,
    terminal: bool,
    closed: bool,
}

impl ConnectionManager {
    /// Create a manager that re-dials according to `policy`.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
            attempt: 0,
            retry_at: None,
            terminal: false,
            closed: false,
        }
    }

    /// Current link state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether compile requests can be sent.
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected)
    }

    /// Whether the manager gave up; only a reload recovers.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Retries used since the link was last established.
    #[inline]
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Pending retry deadline.
    #[inline]
    #[must_use]
    pub const fn retry_deadline(&self) -> Option<Duration> {
        self.retry_at
    }

    /// Open the link for the first time.
    pub fn start<T: Transport>(&mut self, transport: &mut T, view: &mut ViewState, now: Duration) {
        self.closed = false;
        self.dial(transport, view, now);
    }

    /// Fold a lifecycle event into the state machine.
    pub fn on_event<T: Transport>(
        &mut self,
        event: &ConnectionEvent,
        transport: &mut T,
        view: &mut ViewState,
        now: Duration,
    ) -> LinkChange {
        let was_connected = self.is_connected();
        match event {
            ConnectionEvent::Connected | ConnectionEvent::Reconnected { .. } => {
                if self.closed {
                    debug!(target: "typlive.link", "late connect after shutdown ignored");
                    return LinkChange::Unchanged;
                }
                if was_connected {
                    // The socket client reports one reconnect as both
                    // `connect` and `reconnect`.
                    debug!(target: "typlive.link", "already connected");
                    return LinkChange::Unchanged;
                }
                info!(
                    target: "typlive.link",
                    attempts = self.attempt,
                    reconnect = matches!(event, ConnectionEvent::Reconnected { .. }),
                    "link established"
                );
                self.state = ConnectionState::Connected;
                self.attempt = 0;
                self.retry_at = None;
                self.terminal = false;
                view.clear_notice();
                return LinkChange::Established;
            }
            ConnectionEvent::ServerGreeting { message } => {
                info!(target: "typlive.link", greeting = %message, "server greeting");
                return LinkChange::Unchanged;
            }
            ConnectionEvent::Disconnected(reason) => {
                self.state = ConnectionState::Disconnected;
                match reason {
                    DisconnectReason::ClientInitiated => {
                        debug!(target: "typlive.link", "link closed by client");
                    }
                    _ if self.closed => {}
                    DisconnectReason::ServerInitiated => {
                        info!(target: "typlive.link", "link closed by server, re-dialing");
                        view.set_notice(Notice::Reconnecting);
                        self.dial(transport, view, now);
                    }
                    DisconnectReason::Dropped(why) => {
                        warn!(target: "typlive.link", reason = %why, "link dropped");
                        view.set_notice(Notice::Reconnecting);
                        self.schedule_retry(view, now);
                    }
                }
            }
            ConnectionEvent::ConnectError { message } => {
                warn!(
                    target: "typlive.link",
                    error = %message,
                    attempt = self.attempt,
                    "connect attempt failed"
                );
                self.state = ConnectionState::Disconnected;
                if !self.closed {
                    view.set_notice(Notice::ConnectError);
                    self.schedule_retry(view, now);
                }
            }
            ConnectionEvent::ReconnectFailed => {
                self.state = ConnectionState::Disconnected;
                self.give_up(view, Notice::ReconnectFailed);
            }
        }
        if was_connected && !self.is_connected() {
            LinkChange::Lost
        } else {
            LinkChange::Unchanged
        }
    }

    /// Fire a due retry. Returns `true` if `connect()` was issued.
    pub fn poll<T: Transport>(&mut self, transport: &mut T, view: &mut ViewState, now: Duration) -> bool {
        match self.retry_at {
            Some(at) if now >= at => {
                self.retry_at = None;
                debug!(target: "typlive.link", attempt = self.attempt, "retry due");
                self.dial(transport, view, now);
                true
            }
            _ => false,
        }
    }

    /// Dial now if the link is down and not given up. Returns `true` if
    /// `connect()` was issued.
    pub fn ensure_connected<T: Transport>(
        &mut self,
        transport: &mut T,
        view: &mut ViewState,
        now: Duration,
    ) -> bool {
        if self.closed || self.terminal || self.state != ConnectionState::Disconnected {
            return false;
        }
        self.retry_at = None;
        self.dial(transport, view, now);
        true
    }

    /// Close the link. Best-effort; no retries follow.
    pub fn shutdown<T: Transport>(&mut self, transport: &mut T) {
        self.closed = true;
        self.retry_at = None;
        if self.state != ConnectionState::Disconnected {
            if let Err(err) = transport.disconnect() {
                warn!(target: "typlive.link", error = %err, "disconnect failed");
            }
        }
        self.state = ConnectionState::Disconnected;
        debug!(target: "typlive.link", "link shut down");
    }

    fn dial<T: Transport>(&mut self, transport: &mut T, view: &mut ViewState, now: Duration) {
        if !transport.is_available() {
            warn!(target: "typlive.link", "transport unavailable");
            self.give_up(view, Notice::TransportUnavailable);
            return;
        }
        self.state = ConnectionState::Connecting;
        if let Err(err) = transport.connect() {
            warn!(target: "typlive.link", error = %err, "connect call failed");
            self.state = ConnectionState::Disconnected;
            view.set_notice(Notice::ConnectError);
            self.schedule_retry(view, now);
        }
    }

    fn schedule_retry(&mut self, view: &mut ViewState, now: Duration) {
        if self.retry_at.is_some() || self.terminal {
            return;
        }
        if !self.policy.allows(self.attempt) {
            self.give_up(view, Notice::ReconnectFailed);
            return;
        }
        let delay = self.policy.delay(self.attempt);
        self.attempt += 1;
        self.retry_at = Some(now.saturating_add(delay));
        debug!(
            target: "typlive.link",
            attempt = self.attempt,
            delay_ms = delay.as_millis() as u64,
            "retry scheduled"
        );
    }

    fn give_up(&mut self, view: &mut ViewState, notice: Notice) {
        warn!(target: "typlive.link", attempts = self.attempt, notice = notice.text(), "giving up");
        self.terminal = true;
        self.retry_at = None;
        view.set_notice(notice);
    }
}
