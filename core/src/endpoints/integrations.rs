use serde::Serialize;
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::endpoints::Operation;
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::transport::Transport;

pub(crate) const TRIGGER_EVENTS: Operation = Operation::new(
    "integrations.trigger_events",
    HttpMethod::Post,
    "/integrations/fl-plugin/{}/trigger-events",
);
pub(crate) const STOP_AUTOMATION: Operation = Operation::new(
    "integrations.stop_automation",
    HttpMethod::Post,
    "/integrations/fl-plugin/{}/stop-automation",
);
pub(crate) const ADD_SYNC_TAGS: Operation =
    Operation::new("integrations.add_sync_tags", HttpMethod::Post, "/integrations/fl-plugin/{}/tags");
pub(crate) const REMOVE_SYNC_TAGS: Operation =
    Operation::new("integrations.remove_sync_tags", HttpMethod::Delete, "/integrations/fl-plugin/{}/tags");
pub(crate) const FUNCTION_LIST: Operation = Operation::new(
    "integrations.function_list",
    HttpMethod::Get,
    "/integrations/fl-plugin/{}/function-list",
);

/// Plugin integration calls, obtained from `ApiClient::integrations`.
///
/// Every call carries the integration's `token` in the body, including the
/// `GET` and `DELETE` ones.
pub struct Integrations<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Integrations<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Forward plugin events. `events` must serialize to a JSON object; the
    /// token is added to it.
    pub fn trigger_events<E: Serialize + ?Sized>(
        &self,
        integration_id: &str,
        token: &str,
        events: &E,
    ) -> Result<Response, ApiError> {
        let mut body = serde_json::to_value(events)?;
        body.as_object_mut()
            .ok_or_else(|| ApiError::Serialization("events must serialize to a JSON object".to_string()))?
            .insert("token".to_string(), Value::from(token));
        self.client.call(&TRIGGER_EVENTS, &[integration_id], None, Some(&body))
    }

    pub fn stop_automation(&self, automation_id: u64, integration_id: &str, token: &str) -> Result<Response, ApiError> {
        let body = json!({ "token": token, "automationId": automation_id });
        self.client.call(&STOP_AUTOMATION, &[integration_id], None, Some(&body))
    }

    pub fn add_sync_tags(&self, integration_id: &str, token: &str, tag_ids: &[u64]) -> Result<Response, ApiError> {
        let body = json!({ "token": token, "tagIds": tag_ids });
        self.client.call(&ADD_SYNC_TAGS, &[integration_id], None, Some(&body))
    }

    pub fn remove_sync_tags(&self, integration_id: &str, token: &str, tag_ids: &[u64]) -> Result<Response, ApiError> {
        let body = json!({ "token": token, "tagIds": tag_ids });
        self.client.call(&REMOVE_SYNC_TAGS, &[integration_id], None, Some(&body))
    }

    pub fn function_list(&self, integration_id: &str, token: &str) -> Result<Response, ApiError> {
        self.client
            .call(&FUNCTION_LIST, &[integration_id], None, Some(&json!({ "token": token })))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::client::tests::{client, Recorder};
    use crate::error::ApiError;
    use crate::http::HttpMethod;

    #[test]
    fn trigger_events_adds_token() {
        let recorder = Recorder::replying(200, "{}");
        let events = json!({"events": [{"type": "purchase", "email": "a@b.de"}]});
        client(&recorder)
            .integrations()
            .trigger_events("wp-1", "tok", &events)
            .unwrap();
        assert_eq!(
            recorder.last().0.url,
            "https://api.4leads.net/v1/integrations/fl-plugin/wp-1/trigger-events"
        );
        assert_eq!(
            recorder.last_body(),
            json!({"events": [{"type": "purchase", "email": "a@b.de"}], "token": "tok"})
        );
    }

    #[test]
    fn trigger_events_requires_object() {
        let recorder = Recorder::replying(200, "{}");
        let err = client(&recorder)
            .integrations()
            .trigger_events("wp-1", "tok", &42)
            .unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn body_rides_on_get_and_delete() {
        let recorder = Recorder::replying(200, "[]");
        let c = client(&recorder);

        c.integrations().function_list("wp-1", "tok").unwrap();
        let (req, _) = recorder.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(recorder.last_body(), json!({"token": "tok"}));

        c.integrations().remove_sync_tags("wp-1", "tok", &[5]).unwrap();
        let (req, _) = recorder.last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(recorder.last_body(), json!({"token": "tok", "tagIds": [5]}));
    }
}
