//! In-memory stand-in for the 4leads API, used by integration tests.
//!
//! Covers the `/v1` subset the client tests exercise: key validation, tags,
//! contacts with tag assignment, and global values. Every route requires
//! `Authorization: Bearer <api key>`; failures carry a `{"message": ..}` body
//! and deletes answer `204` with an empty body.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_API_KEY: &str = "test-key";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct TagInput {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub email: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    #[serde(skip)]
    pub tag_ids: BTreeSet<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalValue {
    pub name: String,
    pub type_id: String,
    pub key: String,
    pub value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRef {
    pub tag_id: u64,
}

#[derive(Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Deserialize)]
pub struct SetOptions {
    #[serde(default = "yes")]
    pub overwrite: bool,
}

#[derive(Deserialize)]
pub struct SetValues {
    pub fields: Vec<KeyValue>,
    pub options: Option<SetOptions>,
}

fn yes() -> bool {
    true
}

fn default_page_size() -> usize {
    50
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub page_num: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub search_string: String,
    #[serde(default)]
    pub mode: u8,
}

#[derive(Default)]
pub struct Store {
    last_id: u64,
    pub tags: BTreeMap<u64, Tag>,
    pub contacts: BTreeMap<u64, Contact>,
    pub storage: BTreeMap<String, GlobalValue>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn contact_mut(&mut self, id_or_email: &str) -> Option<&mut Contact> {
        match id_or_email.parse::<u64>() {
            Ok(id) => self.contacts.get_mut(&id),
            Err(_) => self.contacts.values_mut().find(|c| c.email == id_or_email),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

/// Error reply with a JSON message body.
pub struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

const NOT_FOUND: Failure = Failure(StatusCode::NOT_FOUND, "not found");

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Arc::new(RwLock::new(Store::default())),
    };

    let v1 = Router::new()
        .route("/ping", get(ping))
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag).put(update_tag).delete(delete_tag))
        .route("/contacts", post(create_contact))
        .route("/contacts/{id}", get(get_contact).delete(delete_contact))
        .route("/contacts/{id}/addTag", post(add_tag))
        .route("/contacts/{id}/removeTag", post(remove_tag))
        .route("/contacts/{id}/getTagList", get(contact_tags))
        .route("/storage", get(list_storage).post(create_storage))
        .route(
            "/storage/{key}",
            get(get_storage).put(update_storage).delete(delete_storage),
        )
        .route("/storage-values", get(list_values).post(set_values))
        .route("/storage-values/{key}", get(get_value));

    Router::new()
        .nest("/v1", v1)
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock 4leads API listening");
    }
    axum::serve(listener, app(api_key)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if presented != Some(&*state.api_key) {
        tracing::debug!(path = %request.uri().path(), "rejected unauthenticated request");
        return Failure(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn page<T: Clone>(items: impl Iterator<Item = T>, params: &ListParams) -> Vec<T> {
    items
        .skip(params.page_num.saturating_mul(params.page_size))
        .take(params.page_size)
        .collect()
}

async fn list_tags(State(state): State<AppState>, Query(params): Query<ListParams>) -> Json<Value> {
    let store = state.db.read().await;
    let needle = params.search_string.to_lowercase();
    let matching: Vec<&Tag> = store
        .tags
        .values()
        .filter(|tag| tag.name.to_lowercase().contains(&needle))
        .collect();
    let items: Vec<Value> = page(matching.iter().copied(), &params)
        .into_iter()
        .map(|tag| match params.mode {
            1 => json!(tag.id),
            _ => json!(tag),
        })
        .collect();
    Json(json!({ "items": items, "total": matching.len() }))
}

async fn create_tag(
    State(state): State<AppState>,
    Json(input): Json<TagInput>,
) -> Result<(StatusCode, Json<Tag>), Failure> {
    if input.name.trim().is_empty() {
        return Err(Failure(StatusCode::UNPROCESSABLE_ENTITY, "name is required"));
    }
    let mut store = state.db.write().await;
    let tag = Tag {
        id: store.next_id(),
        name: input.name,
    };
    store.tags.insert(tag.id, tag.clone());
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn get_tag(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Tag>, Failure> {
    let store = state.db.read().await;
    store.tags.get(&id).cloned().map(Json).ok_or(NOT_FOUND)
}

async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<TagInput>,
) -> Result<Json<Tag>, Failure> {
    let mut store = state.db.write().await;
    let tag = store.tags.get_mut(&id).ok_or(NOT_FOUND)?;
    tag.name = input.name;
    Ok(Json(tag.clone()))
}

async fn delete_tag(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, Failure> {
    let mut store = state.db.write().await;
    store.tags.remove(&id).ok_or(NOT_FOUND)?;
    for contact in store.contacts.values_mut() {
        contact.tag_ids.remove(&id);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn create_contact(
    State(state): State<AppState>,
    Json(mut input): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Contact>), Failure> {
    let no_update = input.remove("_noUpdate").and_then(|v| v.as_bool()).unwrap_or(false);
    input.remove("id");
    let email = match input.remove("email") {
        Some(Value::String(email)) if !email.is_empty() => email,
        _ => return Err(Failure(StatusCode::UNPROCESSABLE_ENTITY, "email is required")),
    };

    let mut guard = state.db.write().await;
    let store = &mut *guard;
    if let Some(existing) = store.contacts.values_mut().find(|c| c.email == email) {
        if no_update {
            return Err(Failure(StatusCode::CONFLICT, "contact already exists"));
        }
        existing.attributes.extend(input);
        return Ok((StatusCode::OK, Json(existing.clone())));
    }

    let contact = Contact {
        id: store.next_id(),
        email,
        attributes: input,
        tag_ids: BTreeSet::new(),
    };
    store.contacts.insert(contact.id, contact.clone());
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn get_contact(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Contact>, Failure> {
    let mut store = state.db.write().await;
    store.contact_mut(&id).map(|c| Json(c.clone())).ok_or(NOT_FOUND)
}

async fn delete_contact(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, Failure> {
    let mut store = state.db.write().await;
    store
        .contacts
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(NOT_FOUND)
}

async fn add_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TagRef>,
) -> Result<Json<Value>, Failure> {
    let mut guard = state.db.write().await;
    let store = &mut *guard;
    if !store.tags.contains_key(&input.tag_id) {
        return Err(Failure(StatusCode::NOT_FOUND, "tag not found"));
    }
    let contact = store.contact_mut(&id).ok_or(NOT_FOUND)?;
    let added = contact.tag_ids.insert(input.tag_id);
    Ok(Json(json!({ "added": added })))
}

async fn remove_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TagRef>,
) -> Result<Json<Value>, Failure> {
    let mut store = state.db.write().await;
    let contact = store.contact_mut(&id).ok_or(NOT_FOUND)?;
    let removed = contact.tag_ids.remove(&input.tag_id);
    Ok(Json(json!({ "removed": removed })))
}

async fn contact_tags(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, Failure> {
    let mut guard = state.db.write().await;
    let store = &mut *guard;
    let tag_ids = store.contact_mut(&id).ok_or(NOT_FOUND)?.tag_ids.clone();
    let items: Vec<&Tag> = tag_ids.iter().filter_map(|id| store.tags.get(id)).collect();
    Ok(Json(json!({ "items": items })))
}

async fn list_storage(State(state): State<AppState>) -> Json<Value> {
    let store = state.db.read().await;
    let items: Vec<&GlobalValue> = store.storage.values().collect();
    Json(json!({ "items": items }))
}

async fn create_storage(
    State(state): State<AppState>,
    Json(input): Json<GlobalValue>,
) -> Result<(StatusCode, Json<GlobalValue>), Failure> {
    let mut store = state.db.write().await;
    if store.storage.contains_key(&input.key) {
        return Err(Failure(StatusCode::CONFLICT, "key already exists"));
    }
    store.storage.insert(input.key.clone(), input.clone());
    Ok((StatusCode::CREATED, Json(input)))
}

async fn get_storage(State(state): State<AppState>, Path(key): Path<String>) -> Result<Json<GlobalValue>, Failure> {
    let store = state.db.read().await;
    store.storage.get(&key).cloned().map(Json).ok_or(NOT_FOUND)
}

async fn update_storage(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<GlobalValue>,
) -> Result<Json<GlobalValue>, Failure> {
    let mut store = state.db.write().await;
    store.storage.remove(&key).ok_or(NOT_FOUND)?;
    store.storage.insert(input.key.clone(), input.clone());
    Ok(Json(input))
}

async fn delete_storage(State(state): State<AppState>, Path(key): Path<String>) -> Result<StatusCode, Failure> {
    let mut store = state.db.write().await;
    store
        .storage
        .remove(&key)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(NOT_FOUND)
}

async fn list_values(State(state): State<AppState>) -> Json<Value> {
    let store = state.db.read().await;
    let items: Vec<Value> = store
        .storage
        .values()
        .map(|v| json!({ "key": v.key, "value": v.value }))
        .collect();
    Json(json!({ "items": items }))
}

async fn get_value(State(state): State<AppState>, Path(key): Path<String>) -> Result<Json<Value>, Failure> {
    let store = state.db.read().await;
    let entry = store.storage.get(&key).ok_or(NOT_FOUND)?;
    Ok(Json(json!({ "key": entry.key, "value": entry.value })))
}

/// Unknown keys fail the whole batch. Without `overwrite` only empty values
/// are replaced.
async fn set_values(State(state): State<AppState>, Json(input): Json<SetValues>) -> Result<Json<Value>, Failure> {
    let overwrite = input.options.map_or(true, |o| o.overwrite);
    let mut store = state.db.write().await;
    if input.fields.iter().any(|f| !store.storage.contains_key(&f.key)) {
        return Err(NOT_FOUND);
    }
    let mut updated = 0;
    for field in input.fields {
        if let Some(entry) = store.storage.get_mut(&field.key) {
            if overwrite || entry.value.is_empty() {
                entry.value = field.value;
                updated += 1;
            }
        }
    }
    Ok(Json(json!({ "updated": updated })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_flattens_attributes() {
        let mut attributes = Map::new();
        attributes.insert("fname".to_string(), json!("Jane"));
        let contact = Contact {
            id: 3,
            email: "jane@example.com".to_string(),
            attributes,
            tag_ids: BTreeSet::from([1]),
        };
        assert_eq!(
            serde_json::to_value(&contact).unwrap(),
            json!({"id": 3, "email": "jane@example.com", "fname": "Jane"})
        );
    }

    #[test]
    fn list_params_defaults() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page_num, 0);
        assert_eq!(params.page_size, 50);
        assert!(params.search_string.is_empty());
        assert_eq!(params.mode, 0);
    }

    #[test]
    fn page_slices_by_number_and_size() {
        let params = ListParams {
            page_num: 1,
            page_size: 2,
            search_string: String::new(),
            mode: 0,
        };
        assert_eq!(page(1..=5, &params), vec![3, 4]);
    }

    #[test]
    fn lookup_by_id_or_email() {
        let mut store = Store::default();
        let id = store.next_id();
        store.contacts.insert(
            id,
            Contact {
                id,
                email: "a@b.de".to_string(),
                attributes: Map::new(),
                tag_ids: BTreeSet::new(),
            },
        );
        assert!(store.contact_mut("1").is_some());
        assert!(store.contact_mut("a@b.de").is_some());
        assert!(store.contact_mut("x@y.de").is_none());
    }
}
