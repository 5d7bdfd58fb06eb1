//! The "perform one HTTP exchange" capability and its ureq implementation.
//!
//! # Design
//! `ApiClient` only ever talks to a `Transport`. Tests plug in a recording
//! double; production code uses `UreqTransport`, which builds a fresh agent
//! for every call so no connection outlives the exchange that opened it.

use std::sync::Arc;

use ureq::tls::TlsConfig;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, RawResponse};
use crate::options::{OptionKey, TransportOptions};

/// Executes one request and returns the unparsed reply.
///
/// Implementations must return `Ok` for every status code the server sends
/// and reserve `Err` for exchanges that could not be completed.
pub trait Transport: Send + Sync {
    fn perform(&self, request: &HttpRequest, options: &TransportOptions) -> Result<RawResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn perform(&self, request: &HttpRequest, options: &TransportOptions) -> Result<RawResponse, ApiError> {
        (**self).perform(request, options)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn perform(&self, request: &HttpRequest, options: &TransportOptions) -> Result<RawResponse, ApiError> {
        (**self).perform(request, options)
    }
}

/// Blocking transport backed by ureq.
///
/// Honours `FailOnError`, `VerifyPeer`, `UserAgent`, `Timeout`,
/// `ConnectTimeout`, `Proxy`, `MaxRedirects`, `CustomRequest` and
/// `IncludeHeaders`. Bodies are sent on `GET` and `DELETE` when present.
/// Redirects are not followed unless `MaxRedirects` is set, and reply bodies
/// are read without a size limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }

    fn agent(options: &TransportOptions) -> Result<ureq::Agent, ApiError> {
        let verify_peer = options.bool(OptionKey::VerifyPeer).unwrap_or(true);
        let mut config = ureq::Agent::config_builder()
            .http_status_as_error(options.bool(OptionKey::FailOnError).unwrap_or(false))
            .allow_non_standard_methods(true)
            .timeout_global(options.seconds(OptionKey::Timeout))
            .timeout_connect(options.seconds(OptionKey::ConnectTimeout))
            .tls_config(TlsConfig::builder().disable_verification(!verify_peer).build());

        if let Some(user_agent) = options.text(OptionKey::UserAgent) {
            config = config.user_agent(user_agent);
        }
        // 3xx replies reach the caller unless following is asked for.
        let max_redirects = options.int(OptionKey::MaxRedirects).unwrap_or(0);
        config = config.max_redirects(u32::try_from(max_redirects).unwrap_or(u32::MAX));
        if let Some(proxy) = options.text(OptionKey::Proxy) {
            let proxy = ureq::Proxy::new(proxy).map_err(ApiError::transport)?;
            config = config.proxy(Some(proxy));
        }

        Ok(config.build().new_agent())
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in request.header_pairs() {
        builder = builder.header(name, value);
    }
    builder
}

impl Transport for UreqTransport {
    fn perform(&self, request: &HttpRequest, options: &TransportOptions) -> Result<RawResponse, ApiError> {
        let agent = Self::agent(options)?;
        let method = options
            .text(OptionKey::CustomRequest)
            .unwrap_or(request.method.as_str());
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let result = match (HttpMethod::parse(method), body) {
            (HttpMethod::Get, None) => with_headers(agent.get(url), request).call(),
            (HttpMethod::Get, Some(body)) => with_headers(agent.get(url), request).force_send_body().send(body),
            (HttpMethod::Delete, None) => with_headers(agent.delete(url), request).call(),
            (HttpMethod::Delete, Some(body)) => {
                with_headers(agent.delete(url), request).force_send_body().send(body)
            }
            (HttpMethod::Post, None) => with_headers(agent.post(url), request).send_empty(),
            (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), request).send(body),
            (HttpMethod::Put, None) => with_headers(agent.put(url), request).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), request).send(body),
            (HttpMethod::Other(other), body) => {
                let mut builder = ureq::http::Request::builder().method(other.as_str()).uri(url);
                for (name, value) in request.header_pairs() {
                    builder = builder.header(name, value);
                }
                let req = builder.body(body.unwrap_or(&[])).map_err(ApiError::transport)?;
                agent.run(req)
            }
        };
        let mut response = result.map_err(ApiError::transport)?;

        let status = response.status();
        let mut header = String::new();
        if options.bool(OptionKey::IncludeHeaders).unwrap_or(true) {
            header.push_str(&format!(
                "{:?} {} {}\r\n",
                response.version(),
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            ));
            for (name, value) in response.headers() {
                header.push_str(name.as_str());
                header.push_str(": ");
                header.push_str(&String::from_utf8_lossy(value.as_bytes()));
                header.push_str("\r\n");
            }
            header.push_str("\r\n");
        }

        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(ApiError::transport)?;

        Ok(RawResponse {
            status: status.as_u16(),
            header: header.into_bytes(),
            body,
        })
    }
}
