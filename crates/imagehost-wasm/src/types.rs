//! Conversions between core values and JavaScript values.

use imagehost_core::{ClientError, ConfigError, ErrorKind};
use serde::Serialize;
use wasm_bindgen::JsValue;

use crate::console;

/// Shape of every rejected promise: `{ kind, message, status?, fatal }`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub fatal: bool,
}

impl From<&ClientError> for ErrorPayload {
    fn from(error: &ClientError) -> Self {
        Self {
            kind: error.kind(),
            message: error.user_message(),
            status: error.api_error().and_then(|e| e.status()),
            fatal: error.is_fatal(),
        }
    }
}

/// Serialize into a plain JS value (objects, arrays, `null` for `None`).
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Log a workflow failure and turn it into a rejection value.
pub(crate) fn reject(error: &ClientError) -> JsValue {
    let payload = ErrorPayload::from(error);
    if payload.fatal {
        console::error(&payload.message);
    } else {
        console::warn(&payload.message);
    }
    to_js(&payload).unwrap_or_else(|_| JsValue::from_str(&payload.message))
}

pub(crate) fn config_error(error: ConfigError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
