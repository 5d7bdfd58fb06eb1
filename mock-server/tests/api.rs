use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Tag, DEFAULT_API_KEY};
use serde_json::{json, Value};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn bearer() -> String {
    format!("Bearer {DEFAULT_API_KEY}")
}

fn authed(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, bearer())
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, bearer())
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn ping_with_valid_key() {
    let resp = app(DEFAULT_API_KEY).oneshot(authed("GET", "/v1/ping")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ping_without_key_is_unauthorized() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(Request::builder().uri("/v1/ping").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn ping_with_wrong_key_is_unauthorized() {
    let resp = app("other-key").oneshot(authed("GET", "/v1/ping")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- tags ---

#[tokio::test]
async fn list_tags_empty() {
    let resp = app(DEFAULT_API_KEY).oneshot(authed("GET", "/v1/tags")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"items": [], "total": 0}));
}

#[tokio::test]
async fn create_tag_returns_201() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(json_request("POST", "/v1/tags", r#"{"name":"Newsletter"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let tag: Tag = body_json(resp).await;
    assert_eq!(tag.name, "Newsletter");
}

#[tokio::test]
async fn create_tag_blank_name_returns_422() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(json_request("POST", "/v1/tags", r#"{"name":"  "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_tag_not_found() {
    let resp = app(DEFAULT_API_KEY).oneshot(authed("GET", "/v1/tags/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "not found");
}

#[tokio::test]
async fn tag_list_paging_search_and_mode() {
    let mut app = app(DEFAULT_API_KEY).into_service();
    for name in ["Alpha", "Beta", "Alphabet"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/v1/tags", &json!({ "name": name }).to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/v1/tags?pageNum=0&pageSize=1&searchString=alpha"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"], json!([{"id": 1, "name": "Alpha"}]));

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/v1/tags?mode=1&pageNum=0&pageSize=50"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["items"], json!([1, 2, 3]));
}

// --- contacts ---

#[tokio::test]
async fn contact_lifecycle_with_tags() {
    let mut app = app(DEFAULT_API_KEY).into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v1/tags", r#"{"name":"VIP"}"#))
        .await
        .unwrap();
    let tag: Tag = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/contacts",
            r#"{"email":"jane@example.com","fname":"Jane"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let contact: Value = body_json(resp).await;
    let id = contact["id"].as_u64().unwrap();
    assert_eq!(contact["fname"], "Jane");

    // same e-mail with _noUpdate is refused
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/contacts",
            r#"{"email":"jane@example.com","fname":"J","_noUpdate":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/v1/contacts/{id}/addTag"),
            &json!({ "tagId": tag.id }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/v1/contacts/jane%40example.com/getTagList"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["items"], json!([{"id": tag.id, "name": "VIP"}]));

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("DELETE", &format!("/v1/contacts/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", &format!("/v1/contacts/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_contact_requires_email() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(json_request("POST", "/v1/contacts", r#"{"fname":"Nobody"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- storage ---

#[tokio::test]
async fn storage_values_respect_overwrite() {
    let mut app = app(DEFAULT_API_KEY).into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/storage",
            r#"{"name":"Promo","typeId":"text","key":"promo","value":"SPRING"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/storage-values",
            r#"{"fields":[{"key":"promo","value":"SUMMER"}],"options":{"overwrite":false}}"#,
        ))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["updated"], 0);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/storage-values",
            r#"{"fields":[{"key":"promo","value":"SUMMER"}],"options":{"overwrite":true}}"#,
        ))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["updated"], 1);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/v1/storage-values/promo"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"key": "promo", "value": "SUMMER"}));
}

#[tokio::test]
async fn storage_value_for_unknown_key_is_404() {
    let resp = app(DEFAULT_API_KEY)
        .oneshot(json_request(
            "POST",
            "/v1/storage-values",
            r#"{"fields":[{"key":"missing","value":"x"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
