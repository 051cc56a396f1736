//! Server diagnostic recovery
//!
//! Query endpoints stream their response body as soon as evaluation starts,
//! so a failure half way through cannot change the status code. Instead the
//! server appends trailer headers carrying the error code and message. A
//! client that only looks at the body sees "unexpected end of stream" or a
//! parse error; this module turns the trailers back into the real cause.

use crate::error::Error;
use http::HeaderMap;
use serde::Deserialize;

/// Trailer carrying the server's error code
pub const STATUS_TRAILER: &str = "x-neptune-status";

/// Trailer carrying the server's error message
pub const DETAIL_TRAILER: &str = "x-neptune-detail";

/// Anything that may hold a server-supplied diagnostic for a failed call
pub trait DiagnosticSource {
    /// Diagnostic text, if the server supplied one
    fn recover_diagnostic(&self) -> Option<String>;
}

/// Diagnostic text from trailer headers
///
/// `status: detail` when both are present, otherwise whichever one is.
/// Trailers that only report success (`200`/`OK`) carry no diagnostic.
pub fn diagnostic_from_trailers(trailers: &HeaderMap) -> Option<String> {
    // Header values may carry raw UTF-8 (IRIs, localized messages).
    let read = |name: &str| {
        trailers
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).trim().to_string())
            .filter(|value| !value.is_empty())
    };

    match (read(STATUS_TRAILER), read(DETAIL_TRAILER)) {
        (Some(status), None) if is_success(&status) => None,
        (Some(status), Some(detail)) => Some(format!("{status}: {detail}")),
        (Some(status), None) => Some(status),
        (None, Some(detail)) => Some(detail),
        (None, None) => None,
    }
}

fn is_success(status: &str) -> bool {
    status == "200" || status.eq_ignore_ascii_case("ok")
}

/// Wrap `error` with the recovered diagnostic, or return it unchanged
pub fn translate(error: Error, diagnostic: Option<String>) -> Error {
    match diagnostic {
        Some(diagnostic) => {
            tracing::warn!(
                diagnostic = %diagnostic,
                error = %error,
                "Recovered server diagnostic from response trailers"
            );
            Error::ServerReported {
                diagnostic,
                source: Box::new(error),
            }
        }
        None => error,
    }
}

/// JSON error document returned with non-success status codes
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDocument {
    code: Option<String>,
    detailed_message: Option<String>,
}

/// Human-readable message from a non-success response body
///
/// Decodes the server's JSON error document when the body is one, otherwise
/// returns the trimmed body text.
pub(crate) fn message_from_error_body(body: &str) -> String {
    if let Ok(doc) = serde_json::from_str::<ErrorDocument>(body) {
        match (doc.code, doc.detailed_message) {
            (Some(code), Some(message)) => return format!("{code}: {message}"),
            (None, Some(message)) => return message,
            (Some(code), None) => return code,
            (None, None) => {}
        }
    }
    body.trim().to_string()
}
