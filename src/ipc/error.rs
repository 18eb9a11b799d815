use crate::error::Error;
use serde_json::json;
use tracing::{error, warn};

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Error reply for a domain error. Storage and I/O failures are logged;
/// user-input rejections are not worth more than a warning.
pub fn fail(id: &str, e: &Error) -> serde_json::Value {
    match e {
        Error::Database(_) | Error::DatabaseOpen { .. } | Error::Io(_) | Error::Other(_) => {
            error!(request = id, code = e.code(), error = %e, "request failed")
        }
        Error::Export(_) | Error::ImportRejected(_) => {
            warn!(request = id, code = e.code(), error = %e, "request rejected")
        }
        _ => {}
    }
    err(id, e.code(), e.to_string(), e.details())
}

/// Turns a handler result into the response envelope.
pub fn respond(id: &str, result: crate::error::Result<serde_json::Value>) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => fail(id, &e),
    }
}
