#![forbid(unsafe_code)]

//! TypstLive Runtime
//!
//! The state machines that turn editor events into compile requests and
//! compile results into preview updates.
//!
//! # Key Components
//!
//! - [`EditorSession`] - Owns the backend and routes [`EditorEvent`]s
//! - [`EnvironmentController`] - Save/restore of per-environment buffers
//! - [`CompilePipeline`] - Debounce, payload wrapping, stale-result discard
//! - [`ConnectionManager`] - Link lifecycle with bounded retry
//! - [`ViewState`] - Everything the host renders
//! - [`EditorConfig`] - Tunables, optionally loaded from TOML/JSON
//!
//! # Role in TypstLive
//! `typlive-runtime` is the orchestrator. It consumes events from
//! `typlive-core`, talks to the platform only through `typlive-backend`
//! traits, and exposes a [`ViewState`] for the host to draw.
//!
//! # Time
//! Nothing here reads a wall clock or sleeps. Deadlines are values; the host
//! calls [`EditorSession::tick`] when its clock passes
//! [`EditorSession::next_deadline`].
//!
//! [`EditorEvent`]: typlive_core::EditorEvent

pub mod config;
pub mod connection;
pub mod controller;
pub mod debounce;
pub mod pipeline;
pub mod retry;
pub mod session;
pub mod view;

pub use config::{ConfigError, EditorConfig};
pub use connection::{ConnectionManager, ConnectionState, LinkChange};
pub use controller::EnvironmentController;
pub use debounce::Debouncer;
pub use pipeline::{CompilePipeline, DEFAULT_COMPILE_DELAY, Delivery, Dispatch};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use session::{EditorSession, SessionPhase};
pub use view::{Notice, Placeholder, Preview, ViewState};
