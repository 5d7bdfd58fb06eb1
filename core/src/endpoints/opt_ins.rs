use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::endpoints::{list_query, Operation};
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::transport::Transport;
use crate::types::Page;

pub(crate) const LIST: Operation = Operation::new("opt_ins.list", HttpMethod::Get, "/opt-ins");
pub(crate) const GET: Operation = Operation::new("opt_ins.get", HttpMethod::Get, "/opt-ins/{}");
pub(crate) const SEND: Operation = Operation::new("opt_ins.send", HttpMethod::Post, "/opt-ins/{}/send");
pub(crate) const CASE_LIST: Operation = Operation::new("opt_in_cases.list", HttpMethod::Get, "/opt-in-cases");
pub(crate) const CASE_GET: Operation = Operation::new("opt_in_cases.get", HttpMethod::Get, "/opt-in-cases/{}");
pub(crate) const CASE_GRANT: Operation =
    Operation::new("opt_in_cases.grant", HttpMethod::Post, "/opt-in-cases/{}/grant");
pub(crate) const CASE_REVOKE: Operation =
    Operation::new("opt_in_cases.revoke", HttpMethod::Post, "/opt-in-cases/{}/revoke");

/// Double opt-in processes, obtained from `ApiClient::opt_ins`.
pub struct OptIns<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> OptIns<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, page: Page, search: &str) -> Result<Response, ApiError> {
        self.client.call(&LIST, &[], Some(&list_query(page, search)), None)
    }

    pub fn get(&self, id: u64) -> Result<Response, ApiError> {
        self.client.call(&GET, &[&id.to_string()], None, None)
    }

    /// Send the opt-in mail of `opt_in_id` to a contact.
    pub fn send(&self, contact_id: u64, opt_in_id: u64) -> Result<Response, ApiError> {
        self.client.call(
            &SEND,
            &[&opt_in_id.to_string()],
            None,
            Some(&json!({ "contactId": contact_id })),
        )
    }
}

/// Consent records, obtained from `ApiClient::opt_in_cases`.
pub struct OptInCases<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> OptInCases<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, page: Page, search: &str) -> Result<Response, ApiError> {
        self.client.call(&CASE_LIST, &[], Some(&list_query(page, search)), None)
    }

    pub fn get(&self, id: u64) -> Result<Response, ApiError> {
        self.client.call(&CASE_GET, &[&id.to_string()], None, None)
    }

    /// Record consent. `ip` is the address the contact agreed from.
    pub fn grant(&self, contact_id: u64, case_id: u64, ip: Option<&str>) -> Result<Response, ApiError> {
        self.client
            .call(&CASE_GRANT, &[&case_id.to_string()], None, Some(&consent_body(contact_id, ip)))
    }

    pub fn revoke(&self, contact_id: u64, case_id: u64, ip: Option<&str>) -> Result<Response, ApiError> {
        self.client
            .call(&CASE_REVOKE, &[&case_id.to_string()], None, Some(&consent_body(contact_id, ip)))
    }
}

fn consent_body(contact_id: u64, ip: Option<&str>) -> Value {
    let mut body = json!({ "contactId": contact_id });
    if let Some(ip) = ip {
        body["ip"] = Value::from(ip);
    }
    body
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::client::tests::{client, Recorder};
    use crate::types::Page;

    #[test]
    fn grant_includes_ip_only_when_given() {
        let recorder = Recorder::replying(200, "{}");
        let c = client(&recorder);

        c.opt_in_cases().grant(7, 2, Some("203.0.113.9")).unwrap();
        assert_eq!(recorder.last().0.url, "https://api.4leads.net/v1/opt-in-cases/2/grant");
        assert_eq!(recorder.last_body(), json!({"contactId": 7, "ip": "203.0.113.9"}));

        c.opt_in_cases().revoke(7, 2, None).unwrap();
        assert_eq!(recorder.last().0.url, "https://api.4leads.net/v1/opt-in-cases/2/revoke");
        assert_eq!(recorder.last_body(), json!({"contactId": 7}));
    }

    #[test]
    fn opt_in_list_and_send() {
        let recorder = Recorder::replying(200, "{}");
        let c = client(&recorder);

        c.opt_ins().list(Page::default(), "welcome").unwrap();
        assert_eq!(
            recorder.last().0.url,
            "https://api.4leads.net/v1/opt-ins?pageNum=0&pageSize=50&searchString=welcome"
        );

        c.opt_ins().send(7, 1).unwrap();
        assert_eq!(recorder.last().0.url, "https://api.4leads.net/v1/opt-ins/1/send");
        assert_eq!(recorder.last_body(), json!({"contactId": 7}));
    }
}
