use serde_json::json;

use crate::client::ApiClient;
use crate::endpoints::Operation;
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::transport::Transport;
use crate::types::GlobalValue;

pub(crate) const LIST: Operation = Operation::new("storage.list", HttpMethod::Get, "/storage");
pub(crate) const GET: Operation = Operation::new("storage.get", HttpMethod::Get, "/storage/{}");
pub(crate) const CREATE: Operation = Operation::new("storage.create", HttpMethod::Post, "/storage");
pub(crate) const UPDATE: Operation = Operation::new("storage.update", HttpMethod::Put, "/storage/{}");
pub(crate) const DELETE: Operation = Operation::new("storage.delete", HttpMethod::Delete, "/storage/{}");
pub(crate) const VALUES: Operation = Operation::new("storage.values", HttpMethod::Get, "/storage-values");
pub(crate) const VALUE: Operation = Operation::new("storage.value", HttpMethod::Get, "/storage-values/{}");
pub(crate) const SET_VALUE: Operation =
    Operation::new("storage.set_value", HttpMethod::Post, "/storage-values");

/// Global values ("storage"), obtained from `ApiClient::storage`.
///
/// Definitions live under `/storage`, bare values under `/storage-values`.
pub struct Storage<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Storage<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Response, ApiError> {
        self.client.call(&LIST, &[], None, None)
    }

    pub fn get(&self, key: &str) -> Result<Response, ApiError> {
        self.client.call(&GET, &[key], None, None)
    }

    /// The value for `key`, or every value when `key` is `None`.
    pub fn get_value(&self, key: Option<&str>) -> Result<Response, ApiError> {
        match key {
            Some(key) => self.client.call(&VALUE, &[key], None, None),
            None => self.client.call(&VALUES, &[], None, None),
        }
    }

    pub fn set_value(&self, key: &str, value: &str, overwrite: bool) -> Result<Response, ApiError> {
        let body = json!({
            "fields": [{ "key": key, "value": value }],
            "options": { "overwrite": overwrite },
        });
        self.client.call(&SET_VALUE, &[], None, Some(&body))
    }

    pub fn create(&self, value: &GlobalValue) -> Result<Response, ApiError> {
        let body = serde_json::to_value(value)?;
        self.client.call(&CREATE, &[], None, Some(&body))
    }

    pub fn update(&self, key: &str, value: &GlobalValue) -> Result<Response, ApiError> {
        let body = serde_json::to_value(value)?;
        self.client.call(&UPDATE, &[key], None, Some(&body))
    }

    pub fn delete(&self, key: &str) -> Result<Response, ApiError> {
        self.client.call(&DELETE, &[key], None, None)
    }
}
