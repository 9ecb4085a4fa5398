use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied argument failed a precondition; no request was sent.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
    #[error("unable to parse response: {0}")]
    UnableToParseResponse(String),
    /// No response reached us.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("unable to authenticate: {0}")]
    UnableToAuthenticate(String),
    /// Structured rejection reported by the server.
    #[error("request rejected: {0}")]
    Validation(ServerError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[source] std::io::Error),
}

impl Error {
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::UnableToAuthenticate(_))
    }

    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::UnableToParseResponse(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err)
    }
}

/// Error envelope returned by the API for non-2xx responses.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
    pub fields: BTreeMap<String, String>,
    /// Raw `meta` object, kept for callers that need protocol payloads (surge).
    pub meta: Option<Value>,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, " code={code}")?;
        }
        write!(f, " message='{}'", self.message)?;
        if !self.fields.is_empty() {
            write!(f, " fields={:?}", self.fields)?;
        }
        Ok(())
    }
}
