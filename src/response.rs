//! Classifies transport results into parsed JSON or a typed [`Error`].

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Error, ServerError};

const UNAUTHORIZED_CODE: &str = "unauthorized";
const BODY_PREVIEW_LIMIT: usize = 256;

/// Status and body of a response that reached us.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

pub fn validate(transport: Result<RawResponse, reqwest::Error>) -> Result<Value, Error> {
    let raw = transport.map_err(|err| {
        warn!("transport failure: {}", err);
        Error::Network(err)
    })?;
    let status = raw.status;

    if status.is_success() {
        if raw.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        return serde_json::from_slice(&raw.body).map_err(|e| {
            Error::UnableToParseResponse(format!(
                "status={} body is not JSON ({}): '{}'",
                status,
                e,
                preview(&raw.body)
            ))
        });
    }

    let envelope = serde_json::from_slice::<Value>(&raw.body)
        .ok()
        .and_then(|json| parse_envelope(status, &json));

    if status == StatusCode::UNAUTHORIZED || envelope.as_ref().is_some_and(is_unauthorized) {
        warn!("request unauthorized: status={}", status);
        let message = envelope
            .map(|e| e.message)
            .unwrap_or_else(|| format!("server answered {}", status));
        return Err(Error::UnableToAuthenticate(message));
    }

    match envelope {
        Some(server_error) => {
            debug!("server rejected request: {}", server_error);
            Err(Error::Validation(server_error))
        }
        None => Err(Error::UnableToParseResponse(format!(
            "status={} without an error envelope: '{}'",
            status,
            preview(&raw.body)
        ))),
    }
}

/// Accepts `{code, message, fields}` as well as `{errors: [{status, code, title}], meta}`.
pub fn parse_envelope(status: StatusCode, json: &Value) -> Option<ServerError> {
    let object = json.as_object()?;
    let first_error = object
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(Value::as_object);

    let text = |key: &str| -> Option<String> {
        object
            .get(key)
            .or_else(|| first_error.and_then(|e| e.get(key)))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let code = text("code");
    let message = text("message").or_else(|| text("title")).or_else(|| text("error"));
    if code.is_none() && message.is_none() {
        return None;
    }

    let meta = object.get("meta").cloned();
    let fields = object
        .get("fields")
        .or(meta.as_ref())
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(key, value)| match value {
                    Value::String(s) => Some((key.clone(), s.clone())),
                    Value::Number(_) | Value::Bool(_) => Some((key.clone(), value.to_string())),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_else(BTreeMap::new);

    Some(ServerError {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| code.clone().unwrap_or_default()),
        code,
        fields,
        meta,
    })
}

fn is_unauthorized(error: &ServerError) -> bool {
    error
        .code
        .as_deref()
        .is_some_and(|code| code.eq_ignore_ascii_case(UNAUTHORIZED_CODE))
}

fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(BODY_PREVIEW_LIMIT).collect()
}
