//! Wire envelope decoding.
//!
//! Two response shapes exist on the platform:
//!
//! 1. The **standard envelope** used by ordinary services:
//!    `{"success": bool, "data": <payload>, "error": {"code", "message"}}`.
//! 2. The **discriminated shape** used by the aggregation proxy: a response
//!    body is either a resource object, or an error object whose `type`
//!    field equals the [`ERROR_DISCRIMINATOR`] sentinel and which carries a
//!    numeric `status` and a `message`.
//!
//! In both shapes an HTTP-level non-2xx status is an error regardless of
//! whether the body parses; an unparseable failure body is surfaced with the
//! raw body text as the message. The HTTP status is preserved alongside any
//! embedded business code so callers can tell a 502 from a "not found"
//! inside a 200.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::AccessError;

/// Value of the `type` field that marks a gateway response body as a
/// structured error rather than a resource object.
pub const ERROR_DISCRIMINATOR: &str = "error";

const FIELD_TYPE: &str = "type";
const FIELD_STATUS: &str = "status";
const FIELD_MESSAGE: &str = "message";

// ---------------------------------------------------------------------------
// Standard envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Decodes a standard `{success, data, error}` envelope into the caller's
/// payload type.
///
/// A 2xx envelope with `success: false` becomes [`AccessError::Remote`]
/// carrying the embedded code and message; `success: true` unmarshals the
/// `data` field into `T`.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, AccessError> {
    if !is_success_status(status) {
        return Err(failure_error(status, body));
    }
    let envelope: Envelope = serde_json::from_slice(body).map_err(|err| AccessError::Decode {
        message: format!("envelope parse: {err}"),
    })?;
    if !envelope.success {
        let error = envelope.error.unwrap_or_default();
        return Err(AccessError::Remote {
            code: error.code,
            message: error.message,
            http_status: Some(status),
        });
    }
    serde_json::from_value(envelope.data).map_err(|err| AccessError::Decode {
        message: format!("data field: {err}"),
    })
}

// ---------------------------------------------------------------------------
// Gateway discriminated shape
// ---------------------------------------------------------------------------

/// An opaque remote resource payload.
///
/// The raw JSON is held as-is and decoded lazily into a concrete type only
/// when the caller supplies one via [`decode`]; no dynamically-typed value
/// escapes the wrapper. A `RemoteObject` has no identity of its own beyond
/// the address it was fetched from.
///
/// [`decode`]: RemoteObject::decode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteObject(Value);

impl RemoteObject {
    /// Wraps an already-parsed JSON value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Borrows the raw JSON.
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Consumes the wrapper, yielding the raw JSON.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Borrows one top-level field, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Decodes the payload into a caller-supplied concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AccessError> {
        serde_json::from_value(self.0.clone()).map_err(|err| AccessError::Decode {
            message: format!("resource payload: {err}"),
        })
    }
}

/// Decodes a gateway response into a single resource object.
///
/// The error discriminator is checked first: a body whose `type` equals
/// [`ERROR_DISCRIMINATOR`] is a structured error even inside an HTTP 200.
/// Only a body without the discriminator is treated as a resource payload.
pub fn decode_gateway(status: u16, body: &[u8]) -> Result<RemoteObject, AccessError> {
    decode_gateway_value(status, body).map(RemoteObject::from_value)
}

/// Decodes a gateway response into an ordered collection of resource
/// objects. Server order is preserved; no stability guarantee beyond that.
pub fn decode_gateway_list(status: u16, body: &[u8]) -> Result<Vec<RemoteObject>, AccessError> {
    match decode_gateway_value(status, body)? {
        Value::Array(items) => Ok(items.into_iter().map(RemoteObject::from_value).collect()),
        other => Err(AccessError::Decode {
            message: format!("expected a collection, got {}", json_kind(&other)),
        }),
    }
}

fn decode_gateway_value(status: u16, body: &[u8]) -> Result<Value, AccessError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => {
            if let Some(error) = discriminated_error(status, &value) {
                return Err(error);
            }
            if !is_success_status(status) {
                return Err(raw_remote_error(status, body));
            }
            Ok(value)
        }
        Err(parse) => {
            if is_success_status(status) {
                Err(AccessError::Decode {
                    message: format!("response body is not valid JSON: {parse}"),
                })
            } else {
                warn!(status, "failure response body is not valid JSON");
                Err(raw_remote_error(status, body))
            }
        }
    }
}

/// Returns the structured error when `value` carries the error
/// discriminator; `None` means the body is a resource payload.
fn discriminated_error(http_status: u16, value: &Value) -> Option<AccessError> {
    let object = value.as_object()?;
    if object.get(FIELD_TYPE)?.as_str()? != ERROR_DISCRIMINATOR {
        return None;
    }
    let code = object
        .get(FIELD_STATUS)
        .and_then(Value::as_u64)
        .map(|status| status.to_string())
        .unwrap_or_else(|| http_status.to_string());
    let message = object
        .get(FIELD_MESSAGE)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(AccessError::Remote {
        code,
        message,
        http_status: Some(http_status),
    })
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

fn failure_error(status: u16, body: &[u8]) -> AccessError {
    if let Ok(envelope) = serde_json::from_slice::<Envelope>(body) {
        if let Some(error) = envelope.error {
            return AccessError::Remote {
                code: error.code,
                message: error.message,
                http_status: Some(status),
            };
        }
    }
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(error) = discriminated_error(status, &value) {
            return error;
        }
    }
    raw_remote_error(status, body)
}

fn raw_remote_error(status: u16, body: &[u8]) -> AccessError {
    AccessError::Remote {
        code: status.to_string(),
        message: String::from_utf8_lossy(body).into_owned(),
        http_status: Some(status),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Widget {
        name: String,
        size: u32,
    }

    #[test]
    fn success_envelope_unmarshals_data() {
        let body = br#"{"success":true,"data":{"name":"w1","size":3}}"#;
        let widget: Widget = decode_envelope(200, body).unwrap();
        assert_eq!(
            widget,
            Widget {
                name: "w1".to_string(),
                size: 3
            }
        );
    }

    #[test]
    fn business_failure_inside_200_is_a_remote_error_not_a_decode_failure() {
        let body = br#"{"success":false,"error":{"code":"404","message":"not found"}}"#;
        let err = decode_envelope::<Widget>(200, body).unwrap_err();
        match err {
            AccessError::Remote {
                code,
                message,
                http_status,
            } => {
                assert_eq!(code, "404");
                assert_eq!(message, "not found");
                assert_eq!(http_status, Some(200));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_2xx_with_parseable_envelope_keeps_embedded_code() {
        let body = br#"{"success":false,"error":{"code":"QuotaExceeded","message":"too many"}}"#;
        let err = decode_envelope::<Widget>(429, body).unwrap_err();
        match err {
            AccessError::Remote {
                code, http_status, ..
            } => {
                assert_eq!(code, "QuotaExceeded");
                assert_eq!(http_status, Some(429));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_2xx_with_unparseable_body_surfaces_raw_text() {
        let err = decode_envelope::<Widget>(502, b"upstream connect error").unwrap_err();
        match err {
            AccessError::Remote {
                code,
                message,
                http_status,
            } => {
                assert_eq!(code, "502");
                assert_eq!(message, "upstream connect error");
                assert_eq!(http_status, Some(502));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn mistyped_data_field_is_a_decode_error() {
        let body = br#"{"success":true,"data":{"name":"w1","size":"large"}}"#;
        let err = decode_envelope::<Widget>(200, body).unwrap_err();
        assert!(matches!(err, AccessError::Decode { .. }));
    }

    #[test]
    fn gateway_discriminator_selects_the_error_branch_inside_200() {
        let body = br#"{"type":"error","status":404,"message":"no such node"}"#;
        let err = decode_gateway(200, body).unwrap_err();
        match err {
            AccessError::Remote {
                code,
                message,
                http_status,
            } => {
                assert_eq!(code, "404");
                assert_eq!(message, "no such node");
                assert_eq!(http_status, Some(200));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn body_without_discriminator_is_a_passthrough_object() {
        let body = br#"{"type":"widget","name":"w1"}"#;
        let object = decode_gateway(200, body).unwrap();
        assert_eq!(object.field("name"), Some(&json!("w1")));

        // A `type` field with a non-sentinel value is ordinary data.
        let decoded: Value = object.decode().unwrap();
        assert_eq!(decoded["type"], json!("widget"));
    }

    #[test]
    fn gateway_list_preserves_server_order() {
        let body = br#"[{"name":"b"},{"name":"a"}]"#;
        let objects = decode_gateway_list(200, body).unwrap();
        let names: Vec<&Value> = objects.iter().filter_map(|o| o.field("name")).collect();
        assert_eq!(names, [&json!("b"), &json!("a")]);
    }

    #[test]
    fn gateway_list_rejects_non_collections() {
        let err = decode_gateway_list(200, br#"{"name":"w1"}"#).unwrap_err();
        assert!(matches!(err, AccessError::Decode { .. }));
    }

    #[test]
    fn gateway_non_2xx_without_discriminator_is_an_http_error() {
        let err = decode_gateway(503, b"try later").unwrap_err();
        match err {
            AccessError::Remote {
                code, http_status, ..
            } => {
                assert_eq!(code, "503");
                assert_eq!(http_status, Some(503));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn remote_object_decodes_lazily_into_a_concrete_type() {
        let object = RemoteObject::from_value(json!({"name": "w1", "size": 7}));
        let widget: Widget = object.decode().unwrap();
        assert_eq!(widget.size, 7);
        assert!(object.decode::<Vec<u8>>().is_err());
    }
}
