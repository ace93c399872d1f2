#![forbid(unsafe_code)]

//! Core: editing environments, per-environment buffers, editor events, and
//! the compile wire codec.
//!
//! # Role in TypstLive
//! `typlive-core` is the data layer. It owns the closed set of editing
//! [`Environment`]s, the [`EnvironmentStore`] that keeps one isolated buffer
//! per environment, the [`EditorEvent`] vocabulary the host pushes into the
//! runtime, and the exact JSON shapes exchanged with the external compiler.
//!
//! # Primary responsibilities
//! - **Environment**: placeholder text, math-mode flag, payload wrapping.
//! - **EnvironmentStore**: save/restore semantics across switches.
//! - **Events**: change notifications tagged with their [`ChangeOrigin`].
//! - **Wire**: `compile` / `compile_result` frames, bit-exact.
//! - **TextSurface**: the capability boundary to the editing widget.
//! - **Toolbox / completion**: static catalogue data and keyword lookup.
//!
//! # How it fits in the system
//! The runtime (`typlive-runtime`) consumes these types and drives the
//! session state machine; platform backends (`typlive-web`) implement
//! [`TextSurface`] and translate socket frames with [`wire`].

pub mod completion;
pub mod environment;
pub mod error;
pub mod event;
pub mod store;
pub mod surface;
pub mod toolbox;
pub mod wire;

pub use environment::Environment;
pub use error::{ParseEnvironmentError, WireError};
pub use event::{
    ChangeEvent, ChangeOrigin, ConnectionEvent, DisconnectReason, EditorEvent, PageEvent,
    TaggedResult,
};
pub use store::{EnvironmentStore, StoreSnapshot};
pub use surface::TextSurface;
pub use toolbox::{Insertion, ToolGroup, ToolItem};
pub use wire::{CompileRequest, CompileResult, CompileResultFrame, ServerGreeting};
