#![forbid(unsafe_code)]
#![doc = "Backend traits for TypstLive: platform abstraction for time, text editing, and the compiler link."]
#![doc = ""]
#![doc = "This crate defines the boundary between the TypstLive runtime and the platform it is"]
#![doc = "embedded in (a browser page via `typlive-web`, or a native test harness)."]

use core::time::Duration;

use typlive_core::surface::TextSurface;
use typlive_core::wire::CompileRequest;

/// Monotonic clock abstraction.
///
/// Hosts advance time explicitly (`performance.now()` on the page, a manual
/// counter in tests). The runtime never calls `Instant::now()` directly.
pub trait EditorClock {
    /// Returns elapsed time since an unspecified epoch, monotonically increasing.
    fn now_mono(&self) -> Duration;
}

/// Message channel to the external compiler.
///
/// This is the outbound half of the link. Lifecycle notifications and
/// compile results come back as events pushed by the host.
pub trait Transport {
    /// Platform-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Whether the transport library is loaded at all.
    ///
    /// An unavailable transport is a terminal condition for the session.
    fn is_available(&self) -> bool {
        true
    }

    /// Start a connection attempt. Completion is reported asynchronously.
    fn connect(&mut self) -> Result<(), Self::Error>;

    /// Close the connection. Best-effort.
    fn disconnect(&mut self) -> Result<(), Self::Error>;

    /// Emit a `compile` event.
    ///
    /// `seq` is the runtime's request sequence number. Transports that can
    /// correlate responses (acknowledgement callbacks) report it back with
    /// the result; the wire payload itself is just `request`.
    fn send_compile(&mut self, seq: u64, request: &CompileRequest) -> Result<(), Self::Error>;
}

/// Unified backend combining clock, text surface, and transport.
///
/// `EditorSession` is generic over this trait. Concrete implementations:
/// - `typlive-web`: host-driven, deterministic, suitable for `wasm32`.
pub trait EditorBackend {
    /// Platform-specific error type shared across sub-traits.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Clock implementation.
    type Clock: EditorClock;

    /// Text surface implementation.
    type Surface: TextSurface;

    /// Transport implementation.
    type Transport: Transport<Error = Self::Error>;

    /// Access the monotonic clock.
    fn clock(&self) -> &Self::Clock;

    /// Access the text surface.
    fn surface(&mut self) -> &mut Self::Surface;

    /// Access the transport.
    fn transport(&mut self) -> &mut Self::Transport;
}
