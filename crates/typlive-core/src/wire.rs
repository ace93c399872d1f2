#![forbid(unsafe_code)]

//! Wire contract with the external compiler service.
//!
//! The event names and payload shapes in this module are bit-exact: the
//! compiler service is a separate deployment and only understands these.
//!
//! | direction | event            | payload                                   |
//! |-----------|------------------|-------------------------------------------|
//! | out       | `compile`        | `{ "code": string }`                      |
//! | in        | `compile_result` | `{ "success": bool, "svg"?: string, "error"?: string }` |
//! | in        | `connected`      | `{ "message": string, ... }`              |
//!
//! Inbound frames may carry extra bookkeeping fields (`user_id`,
//! `session_id`, `compile_count`); they are ignored.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::WireError;

/// Outbound event name for compile requests.
pub const COMPILE_EVENT: &str = "compile";

/// Inbound event name for compile results.
pub const COMPILE_RESULT_EVENT: &str = "compile_result";

/// Inbound event name for the server greeting.
pub const SERVER_GREETING_EVENT: &str = "connected";

/// Error text the compiler service returns for a blank payload.
pub const EMPTY_INPUT_ERROR: &str = "Typst Code is Empty";

/// Outbound compile request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// The wrapped Typst source.
    pub code: String,
}

impl CompileRequest {
    /// Build the request for `source` typed in `env`.
    ///
    /// Leading and trailing whitespace is trimmed before wrapping. Returns
    /// `None` when nothing is left.
    #[must_use]
    pub fn for_environment(env: Environment, source: &str) -> Option<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            code: env.wrap(trimmed),
        })
    }

    /// Encode as the JSON payload of a `compile` event.
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Raw `compile_result` payload as sent by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileResultFrame {
    /// Whether compilation succeeded.
    pub success: bool,
    /// Rendered SVG markup on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    /// Compiler diagnostics on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decoded compile outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResult {
    /// Rendered markup to show in the preview.
    Rendered(String),
    /// Compiler error text, shown verbatim.
    Failed(String),
}

impl CompileResult {
    /// Decode a `compile_result` JSON payload.
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        let frame: CompileResultFrame = serde_json::from_str(json)?;
        Self::try_from(frame)
    }

    /// Whether this is the service's answer to a blank payload.
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::Failed(error) if error == EMPTY_INPUT_ERROR)
    }
}

impl TryFrom<CompileResultFrame> for CompileResult {
    type Error = WireError;

    fn try_from(frame: CompileResultFrame) -> Result<Self, Self::Error> {
        if frame.success {
            frame
                .svg
                .map(Self::Rendered)
                .ok_or(WireError::MissingField { field: "svg" })
        } else {
            // The service always sends an error string, but an empty one is
            // still a failure.
            Ok(Self::Failed(frame.error.unwrap_or_default()))
        }
    }
}

impl From<CompileResult> for CompileResultFrame {
    fn from(result: CompileResult) -> Self {
        match result {
            CompileResult::Rendered(svg) => Self {
                success: true,
                svg: Some(svg),
                error: None,
            },
            CompileResult::Failed(error) => Self {
                success: false,
                svg: None,
                error: Some(error),
            },
        }
    }
}

/// The server's `connected` greeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerGreeting {
    /// Human-readable greeting.
    #[serde(default)]
    pub message: String,
    /// Number of live connections for the same account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_connections: Option<u32>,
}

impl ServerGreeting {
    /// Decode a `connected` JSON payload.
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(json)?)
    }
}
