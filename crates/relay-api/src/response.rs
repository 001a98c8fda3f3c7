//! Response envelope and error-category mapping

use relay_core::error::RelayError;
use serde_json::{json, Value};

/// Status-coded response envelope.
///
/// `code` uses HTTP status categories (200 / 400 / 403 / 404 / 500) but the
/// envelope itself is framing-agnostic; the embedding server decides how to
/// put it on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP-style status category
    pub code: u16,
    /// JSON body, always carrying a `status` field of `ok` or `error`
    pub body: Value,
}

impl ApiResponse {
    /// Successful response; merges `"status": "ok"` into the given object
    pub fn ok(mut body: Value) -> Self {
        if let Value::Object(map) = &mut body {
            map.insert("status".to_string(), json!("ok"));
        }
        Self { code: 200, body }
    }

    /// Error response with a human-readable message
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            body: json!({ "status": "error", "message": message.into() }),
        }
    }

    /// Map a domain error to its response category
    pub fn from_error(err: &RelayError) -> Self {
        Self::error(status_code(err), err.to_string())
    }

    /// Whether this is a success envelope
    pub fn is_ok(&self) -> bool {
        self.code == 200
    }
}

/// HTTP-style status category for a domain error
fn status_code(err: &RelayError) -> u16 {
    match err {
        RelayError::InvalidInput(_) => 400,
        RelayError::Unauthorized(_) | RelayError::GameFull(_) => 403,
        RelayError::GameNotFound(_) => 404,
        RelayError::WithContext { source, .. } => status_code(source),
        _ => 500,
    }
}
