#![forbid(unsafe_code)]

//! Debounced compile pipeline.
//!
//! Edits restart a single quiet window ([`DEFAULT_COMPILE_DELAY`] by
//! default). When it elapses the active source is trimmed, wrapped for its
//! environment and sent, unless it is blank or the link is down.
//!
//! # Result ordering
//!
//! Every dispatch gets a sequence number. A result is applied only when its
//! number is greater than every result applied so far and greater than the
//! last invalidation point (environment switch or clear). Transports that
//! correlate responses report the number directly; otherwise results are
//! matched first-in first-out against the requests outstanding on the
//! current connection.

use std::collections::VecDeque;

use tracing::{debug, warn};
use typlive_backend::Transport;
use typlive_core::{CompileRequest, CompileResult, Environment, TaggedResult};
use web_time::Duration;

use crate::connection::ConnectionManager;
use crate::debounce::Debouncer;
use crate::view::{Notice, ViewState};

/// Quiet window between the last edit and the compile request.
pub const DEFAULT_COMPILE_DELAY: Duration = Duration::from_millis(300);

/// Outcome of a compile attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Request `seq` went out.
    Sent {
        /// Sequence number of the request.
        seq: u64,
    },
    /// Blank source; nothing sent.
    Empty,
    /// Link down; a reconnect was requested and the attempt dropped.
    Offline,
    /// The transport refused the send.
    Failed,
}

/// Fate of an arriving compile result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Shown.
    Applied {
        /// Sequence number it was attributed to.
        seq: u64,
    },
    /// Superseded by a newer result or an invalidation.
    Stale {
        /// Sequence number it was attributed to.
        seq: u64,
    },
    /// The service's answer to a blank payload; not shown.
    Suppressed {
        /// Sequence number it was attributed to.
        seq: u64,
    },
    /// Untagged with nothing outstanding to attribute it to, or tagged
    /// with a sequence number that was never sent.
    Unattributed,
}

/// Debounce timer plus request/result bookkeeping.
#[derive(Debug, Clone)]
pub struct CompilePipeline {
    debounce: Debouncer,
    last_sent: u64,
    last_applied: u64,
    discard_through: u64,
    outstanding: VecDeque<u64>,
}

impl CompilePipeline {
    /// Create a pipeline with the given quiet window.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            debounce: Debouncer::new(delay),
            last_sent: 0,
            last_applied: 0,
            discard_through: 0,
            outstanding: VecDeque::new(),
        }
    }

    /// Pending compile deadline.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.debounce.deadline()
    }

    /// Sequence number of the last request sent (0 before the first).
    #[inline]
    #[must_use]
    pub const fn last_sent(&self) -> u64 {
        self.last_sent
    }

    /// Requests still waiting for an untagged result.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Restart the quiet window at `now`.
    pub fn schedule(&mut self, now: Duration) {
        let deadline = self.debounce.schedule(now);
        debug!(
            target: "typlive.compile",
            deadline_ms = deadline.as_millis() as u64,
            "compile scheduled"
        );
    }

    /// Drop the pending compile, if any.
    pub fn cancel(&mut self) {
        self.debounce.cancel();
    }

    /// Whether the quiet window has elapsed. Consumes the deadline.
    pub fn take_due(&mut self, now: Duration) -> bool {
        self.debounce.fire_if_due(now)
    }

    /// Results for everything sent so far are no longer wanted, and the
    /// pending compile belongs to content that is no longer active.
    pub fn invalidate(&mut self) {
        self.debounce.cancel();
        self.discard_through = self.last_sent;
        debug!(target: "typlive.compile", through = self.last_sent, "results invalidated");
    }

    /// The connection dropped; nothing outstanding will be answered.
    pub fn forget_outstanding(&mut self) {
        if !self.outstanding.is_empty() {
            debug!(
                target: "typlive.compile",
                dropped = self.outstanding.len(),
                "outstanding requests forgotten"
            );
        }
        self.outstanding.clear();
    }

    /// Compile `source` for `env` now, cancelling any pending window.
    pub fn compile<T: Transport>(
        &mut self,
        env: Environment,
        source: &str,
        link: &mut ConnectionManager,
        transport: &mut T,
        view: &mut ViewState,
        now: Duration,
    ) -> Dispatch {
        self.debounce.cancel();

        let Some(request) = CompileRequest::for_environment(env, source) else {
            debug!(target: "typlive.compile", env = %env, "blank source, nothing to compile");
            view.show_awaiting_input();
            return Dispatch::Empty;
        };

        if !link.is_connected() {
            let dialed = link.ensure_connected(transport, view, now);
            debug!(
                target: "typlive.compile",
                state = ?link.state(),
                dialed,
                "link down, compile dropped"
            );
            return Dispatch::Offline;
        }

        let seq = self.last_sent + 1;
        match transport.send_compile(seq, &request) {
            Ok(()) => {
                self.last_sent = seq;
                self.outstanding.push_back(seq);
                view.clear_notice_if(Notice::SendFailed);
                debug!(
                    target: "typlive.compile",
                    seq,
                    env = %env,
                    payload_len = request.code.len(),
                    "compile dispatched"
                );
                Dispatch::Sent { seq }
            }
            Err(err) => {
                warn!(target: "typlive.compile", seq, error = %err, "compile send failed");
                view.set_notice(Notice::SendFailed);
                Dispatch::Failed
            }
        }
    }

    /// Apply `tagged` to the view unless it has been superseded.
    pub fn deliver(&mut self, tagged: TaggedResult, view: &mut ViewState) -> Delivery {
        let seq = match tagged.seq {
            Some(seq) if seq > self.last_sent => {
                warn!(
                    target: "typlive.compile",
                    seq,
                    last_sent = self.last_sent,
                    "result for a request never sent"
                );
                return Delivery::Unattributed;
            }
            Some(seq) => {
                self.outstanding.retain(|&pending| pending > seq);
                seq
            }
            None => match self.outstanding.pop_front() {
                Some(seq) => seq,
                None => {
                    debug!(target: "typlive.compile", "unattributed result discarded");
                    return Delivery::Unattributed;
                }
            },
        };

        if seq <= self.last_applied || seq <= self.discard_through {
            debug!(
                target: "typlive.compile",
                seq,
                last_applied = self.last_applied,
                discard_through = self.discard_through,
                "stale result discarded"
            );
            return Delivery::Stale { seq };
        }
        self.last_applied = seq;

        match tagged.result {
            CompileResult::Rendered(markup) => {
                debug!(target: "typlive.compile", seq, markup_len = markup.len(), "result rendered");
                view.show_rendered(markup);
                Delivery::Applied { seq }
            }
            result if result.is_empty_input() => {
                debug!(target: "typlive.compile", seq, "empty-input reply suppressed");
                Delivery::Suppressed { seq }
            }
            CompileResult::Failed(error) => {
                debug!(target: "typlive.compile", seq, "compile failed");
                view.show_failure(error);
                Delivery::Applied { seq }
            }
        }
    }
}

impl Default for CompilePipeline {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILE_DELAY)
    }
}
