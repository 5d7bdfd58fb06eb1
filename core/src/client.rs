//! Configured client and the single request primitive.
//!
//! # Design
//! `ApiClient` owns the host, default headers, version prefix and transport
//! options. Every endpoint goes through `request`, which is the only place
//! that touches the transport. Configuration is read-only after
//! construction except for `set_transport_options`, which takes `&mut self`,
//! so replacing options while requests are in flight is ruled out at compile
//! time. Sharing one client across threads means sharing `&ApiClient`.

use std::env::VarError;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::builder::{QueryParams, RequestBuilder};
use crate::endpoints::{
    Campaigns, Contacts, GlobalFields, Integrations, Operation, OptInCases, OptIns, Storage, Tags, PING,
};
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::options::{ClientOptions, OptionKey, TransportOptions, DEFAULT_VERSION};
use crate::transport::{Transport, UreqTransport};

/// Library version as reported to the API.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable read by `ApiClient::from_env` for the API key.
pub const ENV_API_KEY: &str = "FOURLEADS_API_KEY";

/// Environment variable read by `ApiClient::from_env` for the host override.
pub const ENV_HOST: &str = "FOURLEADS_HOST";

fn env_error(name: &str, error: VarError) -> ApiError {
    match error {
        VarError::NotPresent => ApiError::Configuration(format!("{name} is not set")),
        VarError::NotUnicode(_) => ApiError::Configuration(format!("{name} is not valid Unicode")),
    }
}

fn transport_user_agent() -> String {
    format!("4leads rust-client,v{VERSION}")
}

/// Client for the 4leads REST API.
#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    builder: RequestBuilder,
    headers: Vec<String>,
    transport_options: TransportOptions,
    transport: T,
}

impl ApiClient<UreqTransport> {
    pub fn new(api_key: &str, options: ClientOptions) -> Result<Self, ApiError> {
        Self::with_transport(api_key, options, UreqTransport::new())
    }

    /// Build a client from `FOURLEADS_API_KEY` and, if set, `FOURLEADS_HOST`.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var(ENV_API_KEY).map_err(|e| env_error(ENV_API_KEY, e))?;
        let mut options = ClientOptions::default();
        match std::env::var(ENV_HOST) {
            Ok(host) => options = options.with_host(host),
            Err(VarError::NotPresent) => {}
            Err(e) => return Err(env_error(ENV_HOST, e)),
        }
        Self::new(&api_key, options)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(api_key: &str, options: ClientOptions, transport: T) -> Result<Self, ApiError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ApiError::Configuration("API key must not be empty".to_string()));
        }
        if api_key.contains(['\r', '\n']) {
            return Err(ApiError::Configuration("API key must not contain line breaks".to_string()));
        }
        let host = validate_host(&options.host)?;

        let headers = vec![
            format!("Authorization: Bearer {api_key}"),
            format!("User-Agent: four-leads-api/{VERSION};rust"),
            "Accept: application/json".to_string(),
        ];

        debug!(host = %host, "configured 4leads client");

        Ok(Self {
            builder: RequestBuilder::new(host, DEFAULT_VERSION),
            headers,
            transport_options: options.transport,
            transport,
        })
    }

    pub fn host(&self) -> &str {
        self.builder.host()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn version(&self) -> &str {
        self.builder.version()
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }

    /// Replace all caller-supplied transport options.
    pub fn set_transport_options(&mut self, options: TransportOptions) -> &mut Self {
        self.transport_options = options;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_url(&self, path: &str, query: Option<&QueryParams>) -> String {
        self.builder.build_url(path, query)
    }

    /// Caller options with the client's required options layered on top.
    pub fn create_options(&self, method: &HttpMethod) -> TransportOptions {
        let mut options = self.transport_options.clone();
        options.insert(OptionKey::IncludeHeaders, true);
        options.insert(OptionKey::ReturnTransfer, true);
        options.insert(OptionKey::CustomRequest, method.as_str());
        options.insert(OptionKey::FailOnError, false);
        options.insert(OptionKey::UserAgent, transport_user_agent());
        options.insert(OptionKey::VerifyPeer, true);
        options
    }

    /// Send one request. Any status code the server returns, including 4xx,
    /// 5xx and 429, comes back as `Ok(Response)`.
    pub fn request(
        &self,
        method: impl Into<HttpMethod>,
        url: &str,
        body: Option<&Value>,
        extra_headers: Option<&[String]>,
    ) -> Result<Response, ApiError> {
        let request = RequestBuilder::build_request(method.into(), url, body, &self.headers, extra_headers)?;
        let options = self.create_options(&request.method);

        debug!(
            method = %request.method,
            url = %request.url,
            body_len = request.body.as_ref().map_or(0, Vec::len),
            "dispatching request"
        );

        let raw = self.transport.perform(&request, &options).inspect_err(|e| {
            warn!(method = %request.method, url = %request.url, error = %e, "transport failed");
        })?;
        let response = RequestBuilder::parse_response(raw)?;

        debug!(status = response.status_code, url = %request.url, "received response");
        if response.is_rate_limited() {
            warn!(url = %request.url, "rate limited by the 4leads API");
        }

        Ok(response)
    }

    pub(crate) fn call(
        &self,
        operation: &Operation,
        segments: &[&str],
        query: Option<&QueryParams>,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = self.build_url(&operation.render(segments), query);
        debug!(operation = operation.name, "calling endpoint");
        self.request(operation.method.clone(), &url, body, None)
    }

    pub fn ping(&self) -> Result<Response, ApiError> {
        self.call(&PING, &[], None, None)
    }

    /// `true` when the API accepts the configured key.
    pub fn validate_key(&self) -> Result<bool, ApiError> {
        Ok(self.ping()?.status_code == 200)
    }

    pub fn contacts(&self) -> Contacts<'_, T> {
        Contacts::new(self)
    }

    pub fn tags(&self) -> Tags<'_, T> {
        Tags::new(self)
    }

    pub fn campaigns(&self) -> Campaigns<'_, T> {
        Campaigns::new(self)
    }

    pub fn opt_ins(&self) -> OptIns<'_, T> {
        OptIns::new(self)
    }

    pub fn opt_in_cases(&self) -> OptInCases<'_, T> {
        OptInCases::new(self)
    }

    pub fn global_fields(&self) -> GlobalFields<'_, T> {
        GlobalFields::new(self)
    }

    pub fn storage(&self) -> Storage<'_, T> {
        Storage::new(self)
    }

    pub fn integrations(&self) -> Integrations<'_, T> {
        Integrations::new(self)
    }
}

/// Accept absolute `http`/`https` URLs without query or fragment and strip a
/// trailing slash.
fn validate_host(host: &str) -> Result<String, ApiError> {
    let parsed = Url::parse(host).map_err(|e| ApiError::Configuration(format!("invalid host {host:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::Configuration(format!(
            "host {host:?} must use http or https"
        )));
    }
    if parsed.host_str().is_none() {
        return Err(ApiError::Configuration(format!("host {host:?} has no hostname")));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ApiError::Configuration(format!(
            "host {host:?} must not carry a query or fragment"
        )));
    }
    Ok(host.trim_end_matches('/').to_string())
}
