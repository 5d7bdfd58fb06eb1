use serde_json::json;

use crate::builder::QueryParams;
use crate::client::ApiClient;
use crate::endpoints::Operation;
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::transport::Transport;
use crate::types::{Page, TagListMode};

pub(crate) const LIST: Operation = Operation::new("tags.list", HttpMethod::Get, "/tags");
pub(crate) const GET: Operation = Operation::new("tags.get", HttpMethod::Get, "/tags/{}");
pub(crate) const CREATE: Operation = Operation::new("tags.create", HttpMethod::Post, "/tags");
pub(crate) const UPDATE: Operation = Operation::new("tags.update", HttpMethod::Put, "/tags/{}");
pub(crate) const DELETE: Operation = Operation::new("tags.delete", HttpMethod::Delete, "/tags/{}");

/// Tag operations, obtained from `ApiClient::tags`.
pub struct Tags<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Tags<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// `mode` is only sent when it differs from the default, and an empty
    /// `search` is omitted.
    pub fn list(&self, page: Page, search: &str, mode: TagListMode) -> Result<Response, ApiError> {
        let mut query = QueryParams::new();
        if mode != TagListMode::Default {
            query.push("mode", mode.code());
        }
        page.append_to(&mut query);
        if !search.is_empty() {
            query.push("searchString", search);
        }
        self.client.call(&LIST, &[], Some(&query), None)
    }

    pub fn get(&self, id: u64) -> Result<Response, ApiError> {
        self.client.call(&GET, &[&id.to_string()], None, None)
    }

    pub fn create(&self, name: &str) -> Result<Response, ApiError> {
        self.client.call(&CREATE, &[], None, Some(&json!({ "name": name })))
    }

    pub fn update(&self, id: u64, name: &str) -> Result<Response, ApiError> {
        self.client
            .call(&UPDATE, &[&id.to_string()], None, Some(&json!({ "name": name })))
    }

    pub fn delete(&self, id: u64) -> Result<Response, ApiError> {
        self.client.call(&DELETE, &[&id.to_string()], None, None)
    }
}
