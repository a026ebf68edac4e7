// ── Response validation ──
//
// Every exchange from every client goes through here, so the error shape is
// the same whether the cloud service or a local sensor produced it. One
// deterministic classification step; no retries.

use serde_json::Value;

use crate::error::{ApiError, ApiErrorKind};
use crate::record::Record;
use crate::transport::{NetworkError, RawResponse};

const PREVIEW_CHARS: usize = 200;

/// Error envelope returned by the cloud service on 4xx/5xx.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// 2xx with a JSON object body.
pub fn validate(outcome: Result<RawResponse, NetworkError>) -> Result<Record, ApiError> {
    let resp = check_status(outcome)?;
    match serde_json::from_str::<Value>(&resp.body) {
        Ok(Value::Object(map)) => Ok(Record::new(map)),
        Ok(other) => Err(ApiError::with_kind(
            ApiErrorKind::MalformedResponse,
            format!("malformed response: expected a JSON object, got {}", json_type(&other)),
        )),
        Err(e) => Err(ApiError::with_kind(
            ApiErrorKind::MalformedResponse,
            format!("malformed response: {e} (body preview: {:?})", preview(&resp.body)),
        )),
    }
}

/// 2xx with any body; the body is discarded.
pub fn validate_empty(outcome: Result<RawResponse, NetworkError>) -> Result<(), ApiError> {
    check_status(outcome).map(|_| ())
}

/// 2xx with the body returned as text (CSV history).
pub fn validate_text(outcome: Result<RawResponse, NetworkError>) -> Result<String, ApiError> {
    check_status(outcome).map(|resp| resp.body)
}

fn check_status(outcome: Result<RawResponse, NetworkError>) -> Result<RawResponse, ApiError> {
    let resp = outcome.map_err(|e| {
        ApiError::with_kind(
            ApiErrorKind::Network {
                timed_out: e.timed_out,
            },
            e.message,
        )
    })?;

    match resp.status {
        200..=299 => Ok(resp),
        400..=599 => Err(parse_error(&resp)),
        code => Err(ApiError::with_kind(
            ApiErrorKind::Status { code },
            format!("unexpected status code {code} {}", resp.reason)
                .trim_end()
                .to_owned(),
        )),
    }
}

fn parse_error(resp: &RawResponse) -> ApiError {
    let kind = ApiErrorKind::Status { code: resp.status };

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&resp.body) {
        match (err.error, err.description) {
            (Some(error), Some(description)) => {
                return ApiError::with_kind(
                    kind,
                    format!("{}: {error} - {description}", resp.status),
                );
            }
            (Some(text), None) | (None, Some(text)) => {
                return ApiError::with_kind(kind, format!("{}: {text}", resp.status));
            }
            (None, None) => {}
        }
    }

    let status_line = format!("{} {}", resp.status, resp.reason);
    let status_line = status_line.trim_end();
    let body = resp.body.trim();
    if body.is_empty() {
        ApiError::with_kind(kind, status_line)
    } else {
        ApiError::with_kind(kind, format!("{status_line}: {}", preview(body)))
    }
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
