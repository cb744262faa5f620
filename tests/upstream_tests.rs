mod common;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, post},
};
use common::{TINY_PNG, body_json, full_enrollment, get_request};
use ppdb::clients::chat::{ChatClient, ChatError};
use ppdb::clients::storage::{BlobStore, GcsBlobStore};
use ppdb::config::{AiConfig, StorageBackend, StorageConfig};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Debug, Clone)]
struct Recorded {
    name: String,
    content_type: String,
    authorization: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct FakeGcs {
    uploads: Arc<Mutex<Vec<Recorded>>>,
    deletes: Arc<Mutex<Vec<String>>>,
}

async fn gcs_upload(
    State(fake): State<FakeGcs>,
    Path(bucket): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if query.get("uploadType").map(String::as_str) != Some("media") {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "uploadType"})));
    }
    let name = query.get("name").cloned().unwrap_or_default();

    fake.uploads.lock().unwrap().push(Recorded {
        name: name.clone(),
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        bytes: body.to_vec(),
    });

    (
        StatusCode::OK,
        Json(json!({"bucket": bucket, "name": name, "size": body.len().to_string()})),
    )
}

async fn gcs_delete(
    State(fake): State<FakeGcs>,
    Path((_bucket, object)): Path<(String, String)>,
) -> StatusCode {
    fake.deletes.lock().unwrap().push(object);
    StatusCode::NO_CONTENT
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_fake_gcs() -> (FakeGcs, String) {
    let fake = FakeGcs::default();
    let router = Router::new()
        .route("/upload/storage/v1/b/{bucket}/o", post(gcs_upload))
        .route("/storage/v1/b/{bucket}/o/{object}", delete(gcs_delete))
        .with_state(fake.clone());
    let base = serve(router).await;
    (fake, base)
}

fn gcs_config(base: &str) -> StorageConfig {
    StorageConfig {
        backend: StorageBackend::Gcs,
        bucket: "ppdb-test".to_string(),
        upload_base_url: format!("{base}/upload/storage/v1"),
        api_base_url: format!("{base}/storage/v1"),
        access_token: Some("gcs-token".to_string()),
        ..StorageConfig::default()
    }
}

#[tokio::test]
async fn gcs_store_uploads_with_media_request() {
    let (fake, base) = spawn_fake_gcs().await;
    let store = GcsBlobStore::new(reqwest::Client::new(), &gcs_config(&base));

    store
        .put("0f8e-object", "image/png", TINY_PNG.to_vec())
        .await
        .unwrap();

    let uploads = fake.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].name, "0f8e-object");
    assert_eq!(uploads[0].content_type, "image/png");
    assert_eq!(uploads[0].authorization.as_deref(), Some("Bearer gcs-token"));
    assert_eq!(uploads[0].bytes, TINY_PNG);

    assert_eq!(
        store.public_url("0f8e-object"),
        "https://storage.googleapis.com/ppdb-test/0f8e-object"
    );

    store.delete("0f8e-object").await.unwrap();
    assert_eq!(fake.deletes.lock().unwrap().as_slice(), ["0f8e-object"]);
}

#[tokio::test]
async fn gcs_rejection_surfaces_status() {
    let router = Router::new().route(
        "/upload/storage/v1/b/{bucket}/o",
        post(|| async { (StatusCode::FORBIDDEN, "permission denied") }),
    );
    let base = serve(router).await;
    let store = GcsBlobStore::new(reqwest::Client::new(), &gcs_config(&base));

    let err = store
        .put("obj", "image/png", TINY_PNG.to_vec())
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("403"), "{message}");
    assert!(message.contains("permission denied"), "{message}");
}

#[tokio::test]
async fn enrollment_through_gcs_backend() {
    let (fake, base) = spawn_fake_gcs().await;
    let (mut config, root) = common::test_config();
    config.storage = gcs_config(&base);
    let app = common::spawn_app_with(config, root).await;

    let user = app.create_user("A", "a@x.com", "secret1", 1).await;
    let auth = app.bearer_for(&user);

    let request = full_enrollment("1", "2005-06-15")
        .file("pas_foto", "foto.jpg", "image/jpeg", TINY_PNG)
        .into_request("/datapokok", Some(&auth));
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let pas_foto = body["data"]["pas_foto"].as_str().unwrap();

    let uploads = fake.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].content_type, "image/jpeg");
    assert_eq!(
        pas_foto,
        format!("https://storage.googleapis.com/ppdb-test/{}", uploads[0].name)
    );
    assert!(uuid::Uuid::parse_str(&uploads[0].name).is_ok());
}

#[tokio::test]
async fn upload_failure_is_server_error_and_writes_nothing() {
    let router = Router::new().route(
        "/upload/storage/v1/b/{bucket}/o",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = serve(router).await;
    let (mut config, root) = common::test_config();
    config.storage = gcs_config(&base);
    let app = common::spawn_app_with(config, root).await;

    let user = app.create_user("A", "a@x.com", "secret1", 1).await;
    let auth = app.bearer_for(&user);

    let request = full_enrollment("1", "2005-06-15")
        .file("pas_foto", "foto.png", "image/png", TINY_PNG)
        .into_request("/datapokok", Some(&auth));
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "Image upload failed");
    assert_eq!(app.store().count_applicants().await.unwrap(), 0);
    assert_eq!(app.store().count_scores().await.unwrap(), 0);
}

async fn spawn_fake_chat(reply: Value, status: StatusCode) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let router = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let seen = seen_clone.clone();
            let reply = reply.clone();
            async move {
                let mut body = body;
                body["authorization"] = json!(headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default());
                seen.lock().unwrap().push(body);
                (status, Json(reply))
            }
        }),
    );

    let base = serve(router).await;
    (format!("{base}/v1"), seen)
}

fn ai_config(base_url: String) -> AiConfig {
    AiConfig {
        base_url,
        api_key: Some("sk-test".to_string()),
        model: "gpt-3.5-turbo".to_string(),
    }
}

#[tokio::test]
async fn chat_client_returns_first_choice() {
    let (base, seen) = spawn_fake_chat(
        json!({"choices": [
            {"message": {"role": "assistant", "content": "PPDB adalah penerimaan peserta didik baru."}},
            {"message": {"role": "assistant", "content": "ignored"}}
        ]}),
        StatusCode::OK,
    )
    .await;

    let client = ChatClient::new(reqwest::Client::new(), &ai_config(base));
    let answer = client.complete("Apa itu PPDB?").await.unwrap();
    assert_eq!(answer, "PPDB adalah penerimaan peserta didik baru.");

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["model"], "gpt-3.5-turbo");
    assert_eq!(requests[0]["messages"][0]["role"], "user");
    assert_eq!(requests[0]["messages"][0]["content"], "Apa itu PPDB?");
    assert_eq!(requests[0]["authorization"], "Bearer sk-test");
}

#[tokio::test]
async fn chat_client_reports_empty_choices() {
    let (base, _) = spawn_fake_chat(json!({"choices": []}), StatusCode::OK).await;
    let client = ChatClient::new(reqwest::Client::new(), &ai_config(base));

    assert!(matches!(
        client.complete("halo").await,
        Err(ChatError::EmptyResponse)
    ));
}

#[tokio::test]
async fn ai_route_proxies_and_surfaces_upstream_errors() {
    let (ok_base, seen) = spawn_fake_chat(
        json!({"choices": [{"message": {"role": "assistant", "content": "Halo juga"}}]}),
        StatusCode::OK,
    )
    .await;
    let (mut config, root) = common::test_config();
    config.ai = ai_config(ok_base);
    let app = common::spawn_app_with(config, root).await;
    let user = app.create_user("A", "a@x.com", "secret1", 1).await;
    let auth = app.bearer_for(&user);

    let response = app
        .router
        .clone()
        .oneshot(get_request("/ai?tanya=halo", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], "Halo juga");
    assert_eq!(body["message"], "Success get answer");

    let response = app
        .router
        .clone()
        .oneshot(get_request("/ai?tanya=%20Apa%20itu%20PPDB%3F%20", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1]["messages"][0]["content"], " Apa itu PPDB? ");

    let response = app
        .router
        .clone()
        .oneshot(get_request("/ai?tanya=%20%20", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (err_base, _) = spawn_fake_chat(
        json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    let (mut config, root) = common::test_config();
    config.ai = ai_config(err_base);
    let app = common::spawn_app_with(config, root).await;
    let user = app.create_user("A", "a@x.com", "secret1", 1).await;
    let auth = app.bearer_for(&user);

    let response = app
        .router
        .clone()
        .oneshot(get_request("/ai?tanya=halo", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Incorrect API key provided")
    );
}
