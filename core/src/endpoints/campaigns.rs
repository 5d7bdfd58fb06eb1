use serde_json::json;

use crate::builder::QueryParams;
use crate::client::ApiClient;
use crate::endpoints::{list_query, Operation};
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::transport::Transport;
use crate::types::Page;

/// Page size used by the form snippet list unless the caller asks otherwise.
pub const SNIPPET_PAGE_SIZE: u32 = 100;

pub(crate) const LIST: Operation = Operation::new("campaigns.list", HttpMethod::Get, "/campaigns");
pub(crate) const GET: Operation = Operation::new("campaigns.get", HttpMethod::Get, "/campaigns/{}");
pub(crate) const SNIPPETS: Operation =
    Operation::new("campaigns.snippets", HttpMethod::Get, "/campaigns/snippets");
pub(crate) const START: Operation = Operation::new("campaigns.start", HttpMethod::Post, "/campaigns/{}/start");
pub(crate) const STOP: Operation = Operation::new("campaigns.stop", HttpMethod::Post, "/campaigns/{}/stop");

/// Campaign operations, obtained from `ApiClient::campaigns`.
pub struct Campaigns<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Campaigns<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, page: Page, search: &str) -> Result<Response, ApiError> {
        self.client.call(&LIST, &[], Some(&list_query(page, search)), None)
    }

    pub fn get(&self, id: u64) -> Result<Response, ApiError> {
        self.client.call(&GET, &[&id.to_string()], None, None)
    }

    /// Embeddable form snippets. See `SNIPPET_PAGE_SIZE`.
    pub fn snippets(&self, page: Page, search: &str) -> Result<Response, ApiError> {
        let mut query = QueryParams::new();
        page.append_to(&mut query);
        if !search.is_empty() {
            query.push("searchString", search);
        }
        self.client.call(&SNIPPETS, &[], Some(&query), None)
    }

    pub fn start(&self, contact_id: u64, campaign_id: u64) -> Result<Response, ApiError> {
        self.client.call(
            &START,
            &[&campaign_id.to_string()],
            None,
            Some(&json!({ "contactId": contact_id })),
        )
    }

    pub fn stop(&self, contact_id: u64, campaign_id: u64) -> Result<Response, ApiError> {
        self.client.call(
            &STOP,
            &[&campaign_id.to_string()],
            None,
            Some(&json!({ "contactId": contact_id })),
        )
    }
}
