#![forbid(unsafe_code)]

//! TypstLive editor core facade crate.
//!
//! Re-exports the types a page integration needs from the internal crates
//! and offers a small prelude. Most hosts only touch [`StepEditor`]:
//!
//! ```
//! use std::time::Duration;
//! use typlive::prelude::*;
//!
//! let mut editor = StepEditor::new(&EditorConfig::default());
//! editor.init();
//! editor.push_frame("connect", "")?;
//! editor.type_text("x^2");
//! editor.step();
//! editor.advance_time(Duration::from_millis(300));
//! editor.step();
//! assert_eq!(editor.take_outbox()[0].payload, r#"{"code":"$ x^2 $"}"#);
//! # Ok::<(), typlive::Error>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use typlive_core::toolbox::CATALOGUE;
pub use typlive_core::{
    ChangeEvent, ChangeOrigin, CompileRequest, CompileResult, ConnectionEvent, DisconnectReason,
    EditorEvent, Environment, EnvironmentStore, PageEvent, StoreSnapshot, TaggedResult,
    TextSurface, ToolGroup, ToolItem, WireError,
};

// --- Backend re-exports ----------------------------------------------------

pub use typlive_backend::{EditorBackend, EditorClock, Transport};

// --- Runtime re-exports ----------------------------------------------------

pub use typlive_runtime::{
    BackoffStrategy, ConfigError, ConnectionState, EditorConfig, EditorSession, Notice,
    Placeholder, Preview, RetryPolicy, SessionPhase, ViewState,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use typlive_web::step_editor::{StepEditor, StepResult};
#[cfg(feature = "web")]
pub use typlive_web::{OutboundFrame, WebBackend, WebBackendError};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for editor integrations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An inbound frame could not be decoded.
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Standard result type for typlive APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Build an initialised editor from a TOML configuration document.
#[cfg(all(feature = "web", feature = "config"))]
pub fn editor_from_toml(source: &str) -> Result<StepEditor> {
    let config = EditorConfig::from_toml_str(source)?.validated()?;
    let mut editor = StepEditor::new(&config);
    editor.init();
    Ok(editor)
}

pub mod prelude {
    //! Common imports for page integrations.

    pub use crate::{
        EditorConfig, EditorEvent, Environment, Error, Notice, PageEvent, Preview, Result,
        ViewState,
    };

    #[cfg(feature = "web")]
    pub use crate::StepEditor;

    pub use crate::{backend, core, runtime};
}

pub use typlive_backend as backend;
pub use typlive_core as core;
pub use typlive_runtime as runtime;
#[cfg(feature = "web")]
pub use typlive_web as web;
