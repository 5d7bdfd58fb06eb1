//! HTTP exchange types shared by the request builder, the client and the
//! transport.
//!
//! # Design
//! Requests and raw replies are plain data. `RequestBuilder` produces an
//! `HttpRequest`, a `Transport` turns it into a `RawResponse`, and
//! `RequestBuilder::parse_response` normalises that into a `Response`.
//! Headers stay as ordered `"Name: value"` lines because duplicates are
//! significant and must reach the wire in the order they were merged.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Status code the API uses to signal that the caller is being throttled.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// HTTP method for a request.
///
/// `GET`, `POST`, `PUT` and `DELETE` are recognised case-insensitively.
/// Anything else is carried through to the transport untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Other(String),
}

impl HttpMethod {
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other(method.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(other) => other,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        HttpMethod::parse(method)
    }
}

/// A fully assembled request, ready for a `Transport`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Ordered `"Name: value"` lines. Duplicate names are sent as-is.
    pub headers: Vec<String>,
    /// Compact JSON text, present only when the caller supplied a body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Split every header line at its first `:` into a trimmed name/value
    /// pair. Lines without a colon are skipped.
    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim(), value.trim()))
        })
    }
}

/// What a transport hands back before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Status line plus header lines, exactly as received.
    pub header: Vec<u8>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Split a curl-style output blob (headers followed by body) at the
    /// reported header size. A boundary past the end yields an empty body.
    pub fn from_combined(status: u16, mut content: Vec<u8>, header_size: usize) -> Self {
        let boundary = header_size.min(content.len());
        let body = content.split_off(boundary);
        Self {
            status,
            header: content,
            body,
        }
    }
}

/// Response body after normalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The server sent zero bytes; no decoding was attempted.
    Empty,
    Json(Value),
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Empty => None,
        }
    }
}

/// The uniform result of every API call, whatever the status code.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status_code: u16,
    pub header_size: usize,
    /// Trimmed header lines including the status line.
    pub response_headers: Vec<String>,
    pub response_body: ResponseBody,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status_code == TOO_MANY_REQUESTS
    }

    pub fn json(&self) -> Option<&Value> {
        self.response_body.as_json()
    }

    /// First header value whose name matches `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response_headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    /// Deserialize the JSON body into a concrete type. An empty body is
    /// decoded as JSON `null`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self.json().cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| ApiError::ResponseParse {
            status: self.status_code,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("get"), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("Post"), HttpMethod::Post);
        assert_eq!(HttpMethod::parse("pUt"), HttpMethod::Put);
        assert_eq!(HttpMethod::parse("DELETE"), HttpMethod::Delete);
    }

    #[test]
    fn unknown_method_passes_through_unmodified() {
        let method = HttpMethod::parse("patch");
        assert_eq!(method, HttpMethod::Other("patch".to_string()));
        assert_eq!(method.as_str(), "patch");
    }

    #[test]
    fn from_combined_splits_at_boundary() {
        let raw = RawResponse::from_combined(200, b"HTTP/1.1 200 OK\r\n\r\n{}".to_vec(), 19);
        assert_eq!(raw.header, b"HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(raw.body, b"{}");
    }

    #[test]
    fn from_combined_clamps_oversized_boundary() {
        let raw = RawResponse::from_combined(204, b"HTTP/1.1 204".to_vec(), 99);
        assert_eq!(raw.header, b"HTTP/1.1 204");
        assert!(raw.body.is_empty());
    }

    #[test]
    fn header_pairs_splits_on_first_colon() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "https://api.4leads.net/v1/ping".to_string(),
            headers: vec![
                "Authorization: Bearer abc".to_string(),
                "X-Time: 12:30".to_string(),
                "garbage".to_string(),
            ],
            body: None,
        };
        let pairs: Vec<_> = req.header_pairs().collect();
        assert_eq!(pairs, vec![("Authorization", "Bearer abc"), ("X-Time", "12:30")]);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = Response {
            status_code: 429,
            header_size: 0,
            response_headers: vec![
                "HTTP/1.1 429 Too Many Requests".to_string(),
                "Retry-After: 30".to_string(),
            ],
            response_body: ResponseBody::Empty,
        };
        assert_eq!(response.header("retry-after"), Some("30"));
        assert!(response.is_rate_limited());
        assert!(!response.is_success());
    }

    #[test]
    fn decode_reports_shape_mismatch() {
        let response = Response {
            status_code: 200,
            header_size: 0,
            response_headers: Vec::new(),
            response_body: ResponseBody::Json(serde_json::json!({"id": "not a number"})),
        };

        #[derive(Debug, serde::Deserialize)]
        struct Tag {
            #[allow(dead_code)]
            id: u64,
        }

        let err = response.decode::<Tag>().unwrap_err();
        assert!(matches!(err, ApiError::ResponseParse { status: 200, .. }));
    }
}
