#![forbid(unsafe_code)]

//! Inbound socket frame decoding.
//!
//! The page forwards every socket callback as `(event name, JSON payload)`;
//! [`decode_frame`] turns that pair into an [`EditorEvent`]. Lifecycle
//! callbacks use the Socket.IO client's event names:
//!
//! | event              | payload                                   |
//! |--------------------|-------------------------------------------|
//! | `connect`          | ignored                                   |
//! | `connected`        | server greeting `{ message, ... }`        |
//! | `compile_result`   | `{ success, svg?, error?, ... }`          |
//! | `disconnect`       | reason string, e.g. `"io server disconnect"` |
//! | `connect_error`    | error string or `{ message }`             |
//! | `reconnect`        | attempt number                            |
//! | `reconnect_failed` | ignored                                   |

use serde_json::Value;
use typlive_core::wire::{COMPILE_RESULT_EVENT, SERVER_GREETING_EVENT};
use typlive_core::{
    CompileResult, ConnectionEvent, DisconnectReason, EditorEvent, ServerGreeting, TaggedResult,
    WireError,
};

/// Decode one inbound frame.
///
/// `compile_result` frames decoded here are untagged; use
/// [`decode_compile_ack`] when the payload arrives through an
/// acknowledgement callback that knows its request.
pub fn decode_frame(event: &str, payload: &str) -> Result<EditorEvent, WireError> {
    let decoded: EditorEvent = match event {
        COMPILE_RESULT_EVENT => {
            EditorEvent::CompileResult(TaggedResult::untagged(CompileResult::from_json(payload)?))
        }
        SERVER_GREETING_EVENT => {
            let greeting = ServerGreeting::from_json(payload)?;
            ConnectionEvent::ServerGreeting {
                message: greeting.message,
            }
            .into()
        }
        "connect" => ConnectionEvent::Connected.into(),
        "disconnect" => {
            let reason = text_payload(payload).unwrap_or_default();
            ConnectionEvent::Disconnected(DisconnectReason::from_wire(&reason)).into()
        }
        "connect_error" => ConnectionEvent::ConnectError {
            message: text_payload(payload).unwrap_or_default(),
        }
        .into(),
        "reconnect" => {
            let attempts = serde_json::from_str::<Value>(payload)
                .ok()
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            ConnectionEvent::Reconnected { attempts }.into()
        }
        "reconnect_failed" => ConnectionEvent::ReconnectFailed.into(),
        other => {
            return Err(WireError::UnknownEvent {
                name: other.to_owned(),
            });
        }
    };
    Ok(decoded)
}

/// Decode a `compile_result` payload correlated with request `seq`.
pub fn decode_compile_ack(seq: u64, payload: &str) -> Result<EditorEvent, WireError> {
    let result = CompileResult::from_json(payload)?;
    Ok(EditorEvent::CompileResult(TaggedResult::tagged(seq, result)))
}

/// A JSON string, a `{ "message": ... }` object, or the raw text itself.
fn text_payload(payload: &str) -> Option<String> {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::String(text)) => Some(text),
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned),
        Ok(_) => None,
        Err(_) => {
            let raw = payload.trim();
            (!raw.is_empty()).then(|| raw.to_owned())
        }
    }
}
