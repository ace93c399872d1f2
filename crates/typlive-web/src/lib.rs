#![forbid(unsafe_code)]

//! `typlive-web` provides a host-driven backend for the TypstLive editor.
//!
//! Design goals:
//! - **Host-driven I/O**: the page script pushes editor changes and socket
//!   frames; nothing here binds to the DOM or a socket library.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! The page wraps [`step_editor::StepEditor`] with its own JS glue: text area
//! `change` events become [`WebTextSurface::type_text`] calls, socket frames
//! go through [`frame_parser::decode_frame`], and the
//! [`WebTransport`] outbox is flushed to the socket after every step.

pub mod frame_parser;
pub mod step_editor;

use core::time::Duration;
use std::collections::VecDeque;

use typlive_backend::{EditorBackend, EditorClock, Transport};
use typlive_core::wire::COMPILE_EVENT;
use typlive_core::{ChangeEvent, CompileRequest, TextSurface, WireError};

/// Web backend error type.
#[derive(Debug, thiserror::Error)]
pub enum WebBackendError {
    /// No socket library on the page.
    #[error("transport unavailable")]
    Unavailable,
    /// The host refused the frame (socket not writable).
    #[error("send rejected: {0}")]
    Rejected(&'static str),
    /// Payload encoding failed.
    #[error(transparent)]
    Encode(#[from] WireError),
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time (e.g. from `performance.now()`).
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl EditorClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// In-memory mirror of the page's text area.
///
/// Every mutation queues a [`ChangeEvent`], tagged with who made it, just as
/// the rich editor's `change` callback would fire. The host drains them with
/// [`drain_changes`](Self::drain_changes).
#[derive(Debug, Clone)]
pub struct WebTextSurface {
    text: String,
    cursor: usize,
    math_mode: bool,
    ready: bool,
    focused: bool,
    changes: VecDeque<ChangeEvent>,
}

impl Default for WebTextSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl WebTextSurface {
    /// An empty, ready surface.
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            math_mode: false,
            ready: true,
            focused: false,
            changes: VecDeque::new(),
        }
    }

    /// Mark the rich editor (un)initialized.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Replace the content as the user would (typing, paste). The cursor
    /// moves to the end.
    pub fn type_text(&mut self, value: impl Into<String>) {
        self.text = value.into();
        self.cursor = self.text.len();
        self.changes.push_back(ChangeEvent::user(self.text.clone()));
    }

    /// Move the cursor to byte offset `at`, clamped to the previous char
    /// boundary.
    pub fn set_cursor(&mut self, at: usize) {
        let mut at = at.min(self.text.len());
        while !self.text.is_char_boundary(at) {
            at -= 1;
        }
        self.cursor = at;
    }

    /// Cursor byte offset.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current tokenizer mode.
    #[must_use]
    pub const fn math_mode(&self) -> bool {
        self.math_mode
    }

    /// Whether the surface has keyboard focus.
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Current content without copying.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Take all queued change notifications.
    pub fn drain_changes(&mut self) -> impl Iterator<Item = ChangeEvent> + '_ {
        self.changes.drain(..)
    }
}

impl TextSurface for WebTextSurface {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, value: &str) {
        value.clone_into(&mut self.text);
        self.cursor = self.text.len();
        self.changes.push_back(ChangeEvent::programmatic(value));
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn set_math_mode(&mut self, math: bool) {
        self.math_mode = math;
    }

    fn insert_text(&mut self, text: &str, cursor_back: usize) {
        self.text.insert_str(self.cursor, text);
        let end = self.cursor + text.len();
        self.cursor = self.text[..end]
            .char_indices()
            .rev()
            .take(cursor_back)
            .last()
            .map_or(end, |(idx, _)| idx);
        self.changes
            .push_back(ChangeEvent::programmatic(self.text.clone()));
    }
}

/// One frame written to the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    /// Socket event name.
    pub event: &'static str,
    /// Request sequence number, for acknowledgement correlation.
    pub seq: u64,
    /// JSON payload.
    pub payload: String,
}

/// Transport that records what the page should do with its socket.
#[derive(Debug, Clone)]
pub struct WebTransport {
    available: bool,
    writable: bool,
    connect_calls: u32,
    disconnect_calls: u32,
    outbox: Vec<OutboundFrame>,
}

impl Default for WebTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WebTransport {
    /// An available, writable transport with an empty outbox.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            available: true,
            writable: true,
            connect_calls: 0,
            disconnect_calls: 0,
            outbox: Vec::new(),
        }
    }

    /// Whether the socket library loaded.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Whether sends are accepted.
    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    /// How many times `connect()` was requested.
    #[must_use]
    pub const fn connect_calls(&self) -> u32 {
        self.connect_calls
    }

    /// How many times `disconnect()` was requested.
    #[must_use]
    pub const fn disconnect_calls(&self) -> u32 {
        self.disconnect_calls
    }

    /// Frames not yet flushed by the host.
    #[must_use]
    pub fn outbox(&self) -> &[OutboundFrame] {
        &self.outbox
    }

    /// Take all frames for flushing.
    pub fn take_outbox(&mut self) -> Vec<OutboundFrame> {
        std::mem::take(&mut self.outbox)
    }
}

impl Transport for WebTransport {
    type Error = WebBackendError;

    fn is_available(&self) -> bool {
        self.available
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        if !self.available {
            return Err(WebBackendError::Unavailable);
        }
        self.connect_calls += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        self.disconnect_calls += 1;
        Ok(())
    }

    fn send_compile(&mut self, seq: u64, request: &CompileRequest) -> Result<(), Self::Error> {
        if !self.writable {
            return Err(WebBackendError::Rejected("socket not writable"));
        }
        self.outbox.push(OutboundFrame {
            event: COMPILE_EVENT,
            seq,
            payload: request.to_json()?,
        });
        Ok(())
    }
}

/// Web backend that composes clock, text surface, and transport.
#[derive(Debug, Default, Clone)]
pub struct WebBackend {
    clock: DeterministicClock,
    surface: WebTextSurface,
    transport: WebTransport,
}

impl WebBackend {
    /// Create a backend with a zero clock, an empty ready surface, and an
    /// available transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutably access the clock.
    pub fn clock_mut(&mut self) -> &mut DeterministicClock {
        &mut self.clock
    }

    /// Read the surface.
    #[must_use]
    pub fn surface_ref(&self) -> &WebTextSurface {
        &self.surface
    }

    /// Mutably access the surface.
    pub fn surface_mut(&mut self) -> &mut WebTextSurface {
        &mut self.surface
    }

    /// Read the transport.
    #[must_use]
    pub fn transport_ref(&self) -> &WebTransport {
        &self.transport
    }

    /// Mutably access the transport.
    pub fn transport_mut(&mut self) -> &mut WebTransport {
        &mut self.transport
    }
}

impl EditorBackend for WebBackend {
    type Error = WebBackendError;

    type Clock = DeterministicClock;
    type Surface = WebTextSurface;
    type Transport = WebTransport;

    fn clock(&self) -> &Self::Clock {
        &self.clock
    }

    fn surface(&mut self) -> &mut Self::Surface {
        &mut self.surface
    }

    fn transport(&mut self) -> &mut Self::Transport {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typlive_core::{ChangeOrigin, Environment};

    use pretty_assertions::assert_eq;

    #[test]
    fn deterministic_clock_advances_monotonically() {
        let mut c = DeterministicClock::new();
        assert_eq!(c.now_mono(), Duration::ZERO);

        c.advance(Duration::from_millis(10));
        c.advance(Duration::from_millis(5));
        assert_eq!(c.now_mono(), Duration::from_millis(15));

        // Saturation: don't panic or wrap.
        c.set(Duration::MAX);
        c.advance(Duration::from_secs(1));
        assert_eq!(c.now_mono(), Duration::MAX);
    }

    #[test]
    fn surface_tags_change_origins() {
        let mut s = WebTextSurface::new();
        s.type_text("abc");
        s.set_value("xyz");
        let origins: Vec<_> = s.drain_changes().map(|c| c.origin).collect();
        assert_eq!(origins, vec![ChangeOrigin::User, ChangeOrigin::Programmatic]);
        assert_eq!(s.drain_changes().count(), 0);
    }

    #[test]
    fn insert_moves_cursor_back_into_parens() {
        let mut s = WebTextSurface::new();
        s.type_text("x = ");
        s.insert_text("frac() ", 2);
        assert_eq!(s.text(), "x = frac() ");
        assert_eq!(s.cursor(), "x = frac(".len());

        s.insert_text("a", 0);
        assert_eq!(s.text(), "x = frac(a) ");
    }

    #[test]
    fn insert_handles_multibyte_text() {
        let mut s = WebTextSurface::new();
        s.insert_text("αβ", 1);
        assert_eq!(s.cursor(), "α".len());
        s.set_cursor(1);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn transport_records_compile_frames() {
        let mut t = WebTransport::new();
        let request = CompileRequest::for_environment(Environment::InlineFormula, "x").unwrap();
        t.send_compile(7, &request).unwrap();
        assert_eq!(
            t.take_outbox(),
            vec![OutboundFrame {
                event: "compile",
                seq: 7,
                payload: r#"{"code":"$x$"}"#.into(),
            }]
        );
        assert!(t.outbox().is_empty());
    }

    #[test]
    fn transport_refusals_are_errors() {
        let mut t = WebTransport::new();
        t.set_writable(false);
        let request = CompileRequest { code: "x".into() };
        let err = t.send_compile(1, &request).unwrap_err();
        assert_eq!(err.to_string(), "send rejected: socket not writable");

        t.set_available(false);
        assert!(matches!(t.connect(), Err(WebBackendError::Unavailable)));
        assert_eq!(t.connect_calls(), 0);
    }
}
