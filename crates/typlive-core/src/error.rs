//! Error types shared by the core data layer.

use thiserror::Error;

/// An environment identifier that is not one of the known kebab-case ids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown environment: {input:?}")]
pub struct ParseEnvironmentError {
    /// The rejected input.
    pub input: String,
}

/// Failure to decode a frame received from the compiler service.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("unexpected event: {name}")]
    UnknownEvent { name: String },
}
