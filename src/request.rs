//! Request construction: URL, conservative query encoding and body encoding.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Request};
use serde_json::{Map, Value};

use crate::errors::Error;

pub const SDK_USER_AGENT: &str = concat!("rides-client-rust-sdk/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    #[default]
    Json,
    Form,
}

/// A query parameter value. Lists render as repeated `key[]=value` pairs and
/// absent values are left out entirely.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
    Scalar(String),
    List(Vec<String>),
    Absent,
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::List(values)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Absent, Into::into)
    }
}

/// Transport-independent description of one API call.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub host: String,
    pub path: String,
    pub query: Vec<(String, QueryValue)>,
    pub body: Option<Map<String, Value>>,
    pub body_encoding: BodyEncoding,
    pub requires_auth: bool,
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            query: Vec::new(),
            body: None,
            body_encoding: BodyEncoding::Json,
            requires_auth: true,
            headers: Vec::new(),
        }
    }

    pub fn get(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::Get, host, path)
    }

    pub fn post(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::Post, host, path)
    }

    pub fn put(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::Put, host, path)
    }

    pub fn delete(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::Delete, host, path)
    }

    /// Sets a query parameter, replacing an earlier value for the same key.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.query.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.query.push((key, value)),
        }
        self
    }

    pub fn json_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self.body_encoding = BodyEncoding::Json;
        self
    }

    pub fn form_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self.body_encoding = BodyEncoding::Form;
        self
    }

    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(AUTHORIZATION.as_str()))
            .map(|(_, value)| value.as_str())
    }

    /// `host + path`, followed by `?query` when any parameter is present.
    pub fn url(&self) -> String {
        let query = encode_query(&self.query);
        if query.is_empty() {
            format!("{}{}", self.host, self.path)
        } else {
            format!("{}{}?{}", self.host, self.path, query)
        }
    }

    pub fn build(&self, client: &Client) -> Result<Request, Error> {
        let url = self.url();
        let mut builder = client
            .request(self.method.into(), &url)
            .header(USER_AGENT, SDK_USER_AGENT);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if matches!(self.method, Method::Post | Method::Put) {
            let body = self.body.clone().unwrap_or_default();
            builder = match self.body_encoding {
                BodyEncoding::Json => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Value::Object(body).to_string()),
                BodyEncoding::Form => builder
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(encode_query(&form_pairs(body))),
            };
        }
        builder
            .build()
            .map_err(|e| Error::InvalidParam(format!("cannot build request for '{}': {}", url, e)))
    }
}

/// Percent-encodes every byte outside `A-Z a-z 0-9 - . _ ~`. Wider than what a
/// query strictly requires so that `+`, `/`, `?`, `:` etc. never stay ambiguous.
pub fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

pub fn encode_query(pairs: &[(String, QueryValue)]) -> String {
    let mut parts = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        let key = encode_component(key);
        match value {
            QueryValue::Scalar(v) => parts.push(format!("{}={}", key, encode_component(v))),
            QueryValue::List(values) => {
                for v in values {
                    parts.push(format!("{}[]={}", key, encode_component(v)));
                }
            }
            QueryValue::Absent => {}
        }
    }
    parts.join("&")
}

/// Inverse of [`encode_query`]. Keys written as `key[]` collect into lists.
pub fn decode_query(query: &str) -> Result<Vec<(String, QueryValue)>, Error> {
    let mut pairs: Vec<(String, QueryValue)> = Vec::new();
    for part in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = part.split_once('=').unwrap_or((part, ""));
        let (raw_key, is_list) = match raw_key.strip_suffix("[]") {
            Some(stripped) => (stripped, true),
            None => (raw_key, false),
        };
        let key = decode_component(raw_key)?;
        let value = decode_component(raw_value)?;
        if !is_list {
            pairs.push((key, QueryValue::Scalar(value)));
            continue;
        }
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, QueryValue::List(values))) => values.push(value),
            _ => pairs.push((key, QueryValue::List(vec![value]))),
        }
    }
    Ok(pairs)
}

fn decode_component(raw: &str) -> Result<String, Error> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| Error::InvalidParam(format!("invalid percent-encoding '{}': {}", raw, e)))
}

fn form_pairs(body: Map<String, Value>) -> Vec<(String, QueryValue)> {
    body.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => QueryValue::Absent,
                Value::String(s) => QueryValue::Scalar(s),
                Value::Array(items) => QueryValue::List(items.iter().map(scalar_text).collect()),
                other => QueryValue::Scalar(scalar_text(&other)),
            };
            (key, value)
        })
        .collect()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
