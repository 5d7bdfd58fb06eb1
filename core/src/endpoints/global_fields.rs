use serde::Serialize;
use serde_json::json;

use crate::builder::QueryParams;
use crate::client::ApiClient;
use crate::endpoints::{list_query, Operation};
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::transport::Transport;
use crate::types::{FieldList, Page};

pub(crate) const LIST: Operation = Operation::new("global_fields.list", HttpMethod::Get, "/globalFields");
pub(crate) const GET: Operation = Operation::new("global_fields.get", HttpMethod::Get, "/globalFields/{}");
pub(crate) const CREATE: Operation = Operation::new("global_fields.create", HttpMethod::Post, "/globalFields");
pub(crate) const UPDATE: Operation = Operation::new("global_fields.update", HttpMethod::Put, "/globalFields/{}");
pub(crate) const DELETE: Operation =
    Operation::new("global_fields.delete", HttpMethod::Delete, "/globalFields/{}");
pub(crate) const GET_VALUE: Operation =
    Operation::new("global_fields.get_value", HttpMethod::Get, "/globalFields/{}/getValue");
pub(crate) const SET_VALUE: Operation =
    Operation::new("global_fields.set_value", HttpMethod::Post, "/globalFields/{}/setValue");
pub(crate) const SET_FIELD_LIST: Operation =
    Operation::new("global_fields.set_field_list", HttpMethod::Post, "/globalFields/setFieldList");

/// Custom contact fields, obtained from `ApiClient::global_fields`.
pub struct GlobalFields<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> GlobalFields<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, page: Page, search: &str) -> Result<Response, ApiError> {
        self.client.call(&LIST, &[], Some(&list_query(page, search)), None)
    }

    pub fn get(&self, id: u64) -> Result<Response, ApiError> {
        self.client.call(&GET, &[&id.to_string()], None, None)
    }

    pub fn create<F: Serialize + ?Sized>(&self, field: &F) -> Result<Response, ApiError> {
        let body = serde_json::to_value(field)?;
        self.client.call(&CREATE, &[], None, Some(&body))
    }

    pub fn update<F: Serialize + ?Sized>(&self, id: u64, field: &F) -> Result<Response, ApiError> {
        let body = serde_json::to_value(field)?;
        self.client.call(&UPDATE, &[&id.to_string()], None, Some(&body))
    }

    pub fn delete(&self, id: u64) -> Result<Response, ApiError> {
        self.client.call(&DELETE, &[&id.to_string()], None, None)
    }

    pub fn get_value(&self, field_id: u64, contact_id: u64) -> Result<Response, ApiError> {
        let query = QueryParams::new().with("contactId", contact_id);
        self.client.call(&GET_VALUE, &[&field_id.to_string()], Some(&query), None)
    }

    /// Write one field of one contact. With `overwrite` false only an empty
    /// value is replaced; `do_triggers` fires automations bound to the field.
    pub fn set_value<V: Serialize + ?Sized>(
        &self,
        field_id: u64,
        contact_id: u64,
        value: &V,
        do_triggers: bool,
        overwrite: bool,
    ) -> Result<Response, ApiError> {
        let body = json!({
            "contactId": contact_id,
            "value": serde_json::to_value(value)?,
            "doTriggers": do_triggers,
            "overwrite": overwrite,
        });
        self.client.call(&SET_VALUE, &[&field_id.to_string()], None, Some(&body))
    }

    pub fn set_field_list(&self, contact_id: u64, fields: &FieldList) -> Result<Response, ApiError> {
        let body = json!({
            "contactId": contact_id,
            "fields": serde_json::to_value(fields)?,
        });
        self.client.call(&SET_FIELD_LIST, &[], None, Some(&body))
    }
}
