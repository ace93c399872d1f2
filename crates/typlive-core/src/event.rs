#![forbid(unsafe_code)]

//! Canonical editor events.
//!
//! The host (a page script, a test, a replay harness) translates DOM events,
//! editor callbacks and socket frames into [`EditorEvent`] values and pushes
//! them into the runtime. Nothing in the runtime listens to ambient globals.
//!
//! # Change origins
//!
//! Text surfaces report every mutation, including the ones the runtime makes
//! itself when it loads a buffer. [`ChangeOrigin`] lets the runtime tell the
//! two apart so its own writes never re-enter the buffer or the debounce
//! pipeline.

use crate::environment::Environment;
use crate::wire::CompileResult;

/// Who caused a text surface mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    /// Typing, pasting, deleting, completion picks.
    User,
    /// A `set_value` issued by the runtime.
    Programmatic,
}

/// A text surface content change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Full surface content after the change.
    pub value: String,
    /// Origin of the change.
    pub origin: ChangeOrigin,
}

impl ChangeEvent {
    /// A user edit.
    #[must_use]
    pub fn user(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: ChangeOrigin::User,
        }
    }

    /// The echo of a runtime write.
    #[must_use]
    pub fn programmatic(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: ChangeOrigin::Programmatic,
        }
    }
}

/// Why the connection went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server closed the connection. Some transports do not resume on
    /// their own after this.
    ServerInitiated,
    /// We closed the connection (teardown).
    ClientInitiated,
    /// Network failure, ping timeout, server restart.
    Dropped(String),
}

impl DisconnectReason {
    /// Map a Socket.IO style reason string.
    #[must_use]
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "io server disconnect" => Self::ServerInitiated,
            "io client disconnect" => Self::ClientInitiated,
            other => Self::Dropped(other.to_owned()),
        }
    }
}

/// Connection lifecycle notifications from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The connection is established.
    Connected,
    /// Informational greeting sent by the server after connecting.
    ServerGreeting {
        /// Human-readable greeting.
        message: String,
    },
    /// The connection closed.
    Disconnected(DisconnectReason),
    /// A connection attempt failed.
    ConnectError {
        /// Transport-provided description.
        message: String,
    },
    /// The transport reconnected by itself after `attempts` tries.
    Reconnected {
        /// Number of attempts it took.
        attempts: u32,
    },
    /// The transport gave up reconnecting by itself.
    ReconnectFailed,
}

/// Page lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// Visibility changed; `true` when the page is in the foreground again.
    VisibilityChanged {
        /// Current visibility.
        visible: bool,
    },
    /// The page was restored from the back/forward cache.
    Restored,
    /// The page is about to unload.
    Unload,
}

/// A compile result plus the request sequence number, when the transport can
/// correlate responses with requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedResult {
    /// Sequence number of the originating request, if known.
    pub seq: Option<u64>,
    /// The result.
    pub result: CompileResult,
}

impl TaggedResult {
    /// A result correlated with request `seq`.
    #[must_use]
    pub fn tagged(seq: u64, result: CompileResult) -> Self {
        Self {
            seq: Some(seq),
            result,
        }
    }

    /// A result without correlation data.
    #[must_use]
    pub fn untagged(result: CompileResult) -> Self {
        Self { seq: None, result }
    }
}

/// Everything the host can push into an editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The text surface content changed.
    Change(ChangeEvent),
    /// An environment button was pressed.
    SelectEnvironment(Environment),
    /// The clear button (or Ctrl/Cmd+K) was used. Only confirmed requests
    /// clear anything.
    ClearCurrent {
        /// Whether the user confirmed the destructive action.
        confirmed: bool,
    },
    /// Ctrl/Cmd+Enter: compile now, skipping the debounce window.
    ManualCompile,
    /// A toolbox symbol was picked.
    InsertSymbol {
        /// Text to insert at the cursor.
        text: String,
        /// Characters to move the cursor back after insertion.
        cursor_back: usize,
    },
    /// Connection lifecycle.
    Connection(ConnectionEvent),
    /// A compile result arrived.
    CompileResult(TaggedResult),
    /// Page lifecycle.
    Page(PageEvent),
}

impl EditorEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Change(_) => "change",
            Self::SelectEnvironment(_) => "select_environment",
            Self::ClearCurrent { .. } => "clear_current",
            Self::ManualCompile => "manual_compile",
            Self::InsertSymbol { .. } => "insert_symbol",
            Self::Connection(_) => "connection",
            Self::CompileResult(_) => "compile_result",
            Self::Page(_) => "page",
        }
    }
}

impl From<ChangeEvent> for EditorEvent {
    fn from(change: ChangeEvent) -> Self {
        Self::Change(change)
    }
}

impl From<ConnectionEvent> for EditorEvent {
    fn from(event: ConnectionEvent) -> Self {
        Self::Connection(event)
    }
}

impl From<PageEvent> for EditorEvent {
    fn from(event: PageEvent) -> Self {
        Self::Page(event)
    }
}

impl From<TaggedResult> for EditorEvent {
    fn from(result: TaggedResult) -> Self {
        Self::CompileResult(result)
    }
}
