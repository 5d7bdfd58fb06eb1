//! Client construction options and per-request transport tuning.
//!
//! # Design
//! Transport options are a typed map rather than a struct so that callers can
//! replace the set wholesale and the client can layer its required options on
//! top. Transports read the keys they understand and ignore the rest.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Production endpoint of the 4leads API.
pub const DEFAULT_HOST: &str = "https://api.4leads.net";

/// Version path segment prepended to every request path.
pub const DEFAULT_VERSION: &str = "/v1";

/// Transport-level option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKey {
    /// Include the header block in the transport output.
    IncludeHeaders,
    /// Return the body as a value instead of streaming it.
    ReturnTransfer,
    /// Method sent on the request line.
    CustomRequest,
    /// Treat 4xx/5xx as transport failures.
    FailOnError,
    UserAgent,
    /// Verify the TLS peer certificate.
    VerifyPeer,
    /// Whole-request deadline in seconds.
    Timeout,
    /// Connect deadline in seconds.
    ConnectTimeout,
    /// Proxy URI, e.g. `http://proxy:3128`.
    Proxy,
    MaxRedirects,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(u64),
    Text(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// Ordered map of transport options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportOptions(BTreeMap<OptionKey, OptionValue>);

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: OptionKey, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: OptionKey, value: impl Into<OptionValue>) -> Option<OptionValue> {
        self.0.insert(key, value.into())
    }

    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.0.get(&key)
    }

    pub fn bool(&self, key: OptionKey) -> Option<bool> {
        match self.get(key)? {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Int(n) => Some(*n != 0),
            OptionValue::Text(_) => None,
        }
    }

    pub fn int(&self, key: OptionKey) -> Option<u64> {
        match self.get(key)? {
            OptionValue::Int(n) => Some(*n),
            OptionValue::Text(s) => s.parse().ok(),
            OptionValue::Bool(_) => None,
        }
    }

    pub fn text(&self, key: OptionKey) -> Option<&str> {
        match self.get(key)? {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn seconds(&self, key: OptionKey) -> Option<Duration> {
        self.int(key).map(Duration::from_secs)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionKey, &OptionValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TransportOptions
where
    K: Into<OptionKey>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Options accepted by `ApiClient::new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub host: String,
    /// Merged into every request; required client options win on collision.
    pub transport: TransportOptions,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            transport: TransportOptions::default(),
        }
    }
}

impl ClientOptions {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }
}
