use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::builder::{QueryParams, QueryValue};
use crate::client::ApiClient;
use crate::endpoints::{list_query, Operation};
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::transport::Transport;
use crate::types::{ContactStatus, Page};

pub(crate) const LIST: Operation = Operation::new("contacts.list", HttpMethod::Get, "/contacts");
pub(crate) const GET: Operation = Operation::new("contacts.get", HttpMethod::Get, "/contacts/{}");
pub(crate) const FIELDS: Operation =
    Operation::new("contacts.fields", HttpMethod::Get, "/contacts/{}/getFieldList");
pub(crate) const TAGS: Operation = Operation::new("contacts.tags", HttpMethod::Get, "/contacts/{}/getTagList");
pub(crate) const COMPARE_TAGS: Operation =
    Operation::new("contacts.compare_tags", HttpMethod::Get, "/contacts/{}/compareTagList");
pub(crate) const CREATE: Operation = Operation::new("contacts.create", HttpMethod::Post, "/contacts");
pub(crate) const UPDATE: Operation = Operation::new("contacts.update", HttpMethod::Put, "/contacts/{}");
pub(crate) const DELETE: Operation = Operation::new("contacts.delete", HttpMethod::Delete, "/contacts/{}");
pub(crate) const ADD_TAG: Operation = Operation::new("contacts.add_tag", HttpMethod::Post, "/contacts/{}/addTag");
pub(crate) const REMOVE_TAG: Operation =
    Operation::new("contacts.remove_tag", HttpMethod::Post, "/contacts/{}/removeTag");
pub(crate) const ADD_TAG_LIST: Operation =
    Operation::new("contacts.add_tag_list", HttpMethod::Post, "/contacts/{}/addTagList");
pub(crate) const REMOVE_TAG_LIST: Operation =
    Operation::new("contacts.remove_tag_list", HttpMethod::Post, "/contacts/{}/removeTagList");

/// Filters for `Contacts::list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactQuery {
    pub page: Page,
    pub search: String,
    pub mode: Option<u32>,
    pub status: Option<ContactStatus>,
}

/// Contact operations, obtained from `ApiClient::contacts`.
///
/// Methods taking `id_or_email` accept either the numeric contact id or the
/// contact's e-mail address.
pub struct Contacts<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Contacts<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, filter: &ContactQuery) -> Result<Response, ApiError> {
        let mut query = list_query(filter.page, &filter.search);
        if let Some(mode) = filter.mode {
            query.push("mode", mode);
        }
        if let Some(status) = filter.status {
            query.push("status", status.code());
        }
        self.client.call(&LIST, &[], Some(&query), None)
    }

    /// Fetch a contact, optionally embedding related collections.
    pub fn get(&self, id: u64, embed: &[&str]) -> Result<Response, ApiError> {
        let mut query = QueryParams::new();
        if !embed.is_empty() {
            query.push("embed", QueryValue::list(embed));
        }
        self.client.call(&GET, &[&id.to_string()], Some(&query), None)
    }

    pub fn get_by_email(&self, email: &str) -> Result<Response, ApiError> {
        self.client.call(&GET, &[email], None, None)
    }

    /// Global field values of a contact, optionally restricted to `field_ids`.
    pub fn fields(&self, id_or_email: &str, field_ids: &[u64]) -> Result<Response, ApiError> {
        let mut query = QueryParams::new();
        if !field_ids.is_empty() {
            query.push("fieldIds", QueryValue::list(field_ids));
        }
        self.client.call(&FIELDS, &[id_or_email], Some(&query), None)
    }

    pub fn tags(&self, id_or_email: &str) -> Result<Response, ApiError> {
        self.client.call(&TAGS, &[id_or_email], None, None)
    }

    /// Which of `tag_ids` the contact carries. The ids travel both in the
    /// query string and as a (GET) body.
    pub fn compare_tags(&self, id_or_email: &str, tag_ids: &[u64]) -> Result<Response, ApiError> {
        let query = QueryParams::new().with("tagIds", QueryValue::list(tag_ids));
        let body: Map<String, Value> = tag_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (format!("tagIds[{index}]"), Value::from(*id)))
            .collect();
        self.client
            .call(&COMPARE_TAGS, &[id_or_email], Some(&query), Some(&Value::Object(body)))
    }

    /// Create a contact. With `no_update` the API refuses to modify an
    /// existing contact with the same e-mail address.
    pub fn create<C: Serialize + ?Sized>(&self, contact: &C, no_update: bool) -> Result<Response, ApiError> {
        let mut body = serde_json::to_value(contact)?;
        if no_update {
            body.as_object_mut()
                .ok_or_else(|| ApiError::Serialization("contact must serialize to a JSON object".to_string()))?
                .insert("_noUpdate".to_string(), Value::Bool(true));
        }
        self.client.call(&CREATE, &[], None, Some(&body))
    }

    pub fn update<C: Serialize + ?Sized>(&self, id: u64, contact: &C) -> Result<Response, ApiError> {
        let body = serde_json::to_value(contact)?;
        self.client.call(&UPDATE, &[&id.to_string()], None, Some(&body))
    }

    pub fn delete(&self, id: u64) -> Result<Response, ApiError> {
        self.client.call(&DELETE, &[&id.to_string()], None, None)
    }

    pub fn add_tag(&self, contact_id: u64, tag_id: u64) -> Result<Response, ApiError> {
        self.client
            .call(&ADD_TAG, &[&contact_id.to_string()], None, Some(&json!({ "tagId": tag_id })))
    }

    pub fn remove_tag(&self, contact_id: u64, tag_id: u64) -> Result<Response, ApiError> {
        self.client
            .call(&REMOVE_TAG, &[&contact_id.to_string()], None, Some(&json!({ "tagId": tag_id })))
    }

    pub fn add_tag_list(&self, contact_id: u64, tag_ids: &[u64]) -> Result<Response, ApiError> {
        self.client.call(
            &ADD_TAG_LIST,
            &[&contact_id.to_string()],
            None,
            Some(&json!({ "tagIds": tag_ids })),
        )
    }

    pub fn remove_tag_list(&self, contact_id: u64, tag_ids: &[u64]) -> Result<Response, ApiError> {
        self.client.call(
            &REMOVE_TAG_LIST,
            &[&contact_id.to_string()],
            None,
            Some(&json!({ "tagIds": tag_ids })),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::ContactQuery;
    use crate::client::tests::{client, Recorder};
    use crate::error::ApiError;
    use crate::http::HttpMethod;
    use crate::types::{ContactStatus, Page};

    #[test]
    fn list_always_sends_search_string() {
        let recorder = Recorder::replying(200, "[]");
        client(&recorder).contacts().list(&ContactQuery::default()).unwrap();
        assert_eq!(
            recorder.last().0.url,
            "https://api.4leads.net/v1/contacts?pageNum=0&pageSize=50&searchString="
        );
    }

    #[test]
    fn list_with_status_filter() {
        let recorder = Recorder::replying(200, "[]");
        let filter = ContactQuery {
            page: Page::new(1, 20),
            search: "@example.com".to_string(),
            mode: Some(1),
            status: Some(ContactStatus::Verified),
        };
        client(&recorder).contacts().list(&filter).unwrap();
        assert_eq!(
            recorder.last().0.url,
            "https://api.4leads.net/v1/contacts?pageNum=1&pageSize=20&searchString=%40example.com&mode=1&status=2"
        );
    }

    #[test]
    fn get_with_embed_and_by_email() {
        let recorder = Recorder::replying(200, "{}");
        let c = client(&recorder);

        c.contacts().get(5, &["tags", "optIns"]).unwrap();
        assert_eq!(
            recorder.last().0.url,
            "https://api.4leads.net/v1/contacts/5?embed%5B0%5D=tags&embed%5B1%5D=optIns"
        );

        c.contacts().get(5, &[]).unwrap();
        assert_eq!(recorder.last().0.url, "https://api.4leads.net/v1/contacts/5");

        c.contacts().get_by_email("max+news@example.com").unwrap();
        assert_eq!(
            recorder.last().0.url,
            "https://api.4leads.net/v1/contacts/max%2Bnews%40example.com"
        );
    }

    #[test]
    fn compare_tags_sends_ids_in_query_and_body() {
        let recorder = Recorder::replying(200, "{}");
        client(&recorder).contacts().compare_tags("17", &[3, 9]).unwrap();
        let (req, _) = recorder.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://api.4leads.net/v1/contacts/17/compareTagList?tagIds%5B0%5D=3&tagIds%5B1%5D=9"
        );
        assert_eq!(recorder.last_body(), json!({"tagIds[0]": 3, "tagIds[1]": 9}));
    }

    #[test]
    fn fields_filter() {
        let recorder = Recorder::replying(200, "[]");
        client(&recorder).contacts().fields("a@b.de", &[11]).unwrap();
        assert_eq!(
            recorder.last().0.url,
            "https://api.4leads.net/v1/contacts/a%40b.de/getFieldList?fieldIds%5B0%5D=11"
        );
    }

    #[test]
    fn create_marks_no_update() {
        let recorder = Recorder::replying(201, r#"{"id":1}"#);
        let contact = json!({"email": "jane@example.com", "fname": "Jane"});
        client(&recorder).contacts().create(&contact, true).unwrap();
        assert_eq!(
            recorder.last_body(),
            json!({"email": "jane@example.com", "fname": "Jane", "_noUpdate": true})
        );

        client(&recorder).contacts().create(&contact, false).unwrap();
        assert_eq!(recorder.last_body(), contact);
    }

    #[test]
    fn create_rejects_non_object_when_no_update() {
        let recorder = Recorder::replying(201, "{}");
        let err = client(&recorder).contacts().create(&["not", "an", "object"], true).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn unserializable_body_fails_before_io() {
        let recorder = Recorder::replying(200, "{}");
        let mut bad = BTreeMap::new();
        bad.insert((1, 2), "tuple keys are not JSON");
        let err = client(&recorder).contacts().update(1, &bad).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn tag_assignment_bodies() {
        let recorder = Recorder::replying(200, "{}");
        let c = client(&recorder);

        c.contacts().add_tag(4, 12).unwrap();
        assert_eq!(recorder.last().0.url, "https://api.4leads.net/v1/contacts/4/addTag");
        assert_eq!(recorder.last_body(), json!({"tagId": 12}));

        c.contacts().remove_tag_list(4, &[1, 2]).unwrap();
        assert_eq!(recorder.last().0.url, "https://api.4leads.net/v1/contacts/4/removeTagList");
        assert_eq!(recorder.last_body(), json!({"tagIds": [1, 2]}));
    }
}
