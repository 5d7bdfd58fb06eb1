//! URL assembly, header merging, body encoding and response normalisation.
//!
//! # Design
//! Everything here is pure. `RequestBuilder` knows the host and version
//! prefix; the remaining operations are associated functions so they can be
//! exercised without a client. Query strings use form encoding (spaces become
//! `+`, brackets are escaped) and list values expand to `key[0]=..&key[1]=..`.

use serde_json::Value;
use url::form_urlencoded;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, RawResponse, Response, ResponseBody};

pub const CONTENT_TYPE_JSON: &str = "Content-Type: application/json";

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    /// Rendered as `key[index]=value` in index order.
    List(Vec<String>),
}

impl QueryValue {
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        QueryValue::List(items.into_iter().map(|item| item.to_string()).collect())
    }
}

macro_rules! scalar_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for QueryValue {
            fn from(value: $ty) -> Self {
                QueryValue::Scalar(value.to_string())
            }
        })*
    };
}

scalar_from!(u8, u16, u32, u64, i32, i64, usize, &str, String);

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Scalar(if value { "1" } else { "0" }.to_string())
    }
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, QueryValue)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> &mut Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Form-encode the parameters, without a leading `?`.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            match value {
                QueryValue::Scalar(v) => {
                    serializer.append_pair(key, v);
                }
                QueryValue::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        serializer.append_pair(&format!("{key}[{index}]"), item);
                    }
                }
            }
        }
        serializer.finish()
    }
}

/// Percent-encode one path segment the same way as query values.
pub fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

/// Turns call parameters into an `HttpRequest` and raw replies into a
/// `Response`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    host: String,
    version: String,
}

impl RequestBuilder {
    pub fn new(host: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            version: version.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `host + version + path[?query]`. Slashes are not normalised, so `path`
    /// must start with `/`.
    pub fn build_url(&self, path: &str, query: Option<&QueryParams>) -> String {
        match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{}{}{}?{}", self.host, self.version, path, query.encode()),
            None => format!("{}{}{}", self.host, self.version, path),
        }
    }

    /// Defaults followed by extras, then the JSON content type when a body
    /// is sent. Same-named headers are all kept.
    pub fn merge_headers(defaults: &[String], extra: Option<&[String]>, has_body: bool) -> Vec<String> {
        let mut headers = defaults.to_vec();
        if let Some(extra) = extra {
            headers.extend_from_slice(extra);
        }
        if has_body {
            headers.push(CONTENT_TYPE_JSON.to_string());
        }
        headers
    }

    /// Compact JSON encoding of a request body.
    pub fn encode_body(body: &Value) -> Result<Vec<u8>, ApiError> {
        serde_json::to_vec(body).map_err(|e| ApiError::Serialization(e.to_string()))
    }

    pub fn build_request(
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
        defaults: &[String],
        extra: Option<&[String]>,
    ) -> Result<HttpRequest, ApiError> {
        let body = body.map(Self::encode_body).transpose()?;
        let headers = Self::merge_headers(defaults, extra, body.is_some());
        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    /// Trim every header line and decode the body as JSON when it is not
    /// empty.
    pub fn parse_response(raw: RawResponse) -> Result<Response, ApiError> {
        let response_headers = String::from_utf8_lossy(&raw.header)
            .split('\n')
            .map(|line| line.trim().to_string())
            .collect();

        let response_body = if raw.body.is_empty() {
            ResponseBody::Empty
        } else {
            let value = serde_json::from_slice(&raw.body).map_err(|e| ApiError::ResponseParse {
                status: raw.status,
                message: e.to_string(),
            })?;
            ResponseBody::Json(value)
        };

        Ok(Response {
            status_code: raw.status,
            header_size: raw.header.len(),
            response_headers,
            response_body,
        })
    }
}
