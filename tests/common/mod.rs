#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use ppdb::api::AppState;
use ppdb::config::{Config, StorageBackend};
use ppdb::db::User;
use std::path::PathBuf;
use std::sync::Arc;

pub const BOUNDARY: &str = "ppdb-test-boundary";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub upload_root: PathBuf,
}

impl TestApp {
    pub fn store(&self) -> &ppdb::db::Store {
        self.state.store()
    }

    pub fn bucket_dir(&self) -> PathBuf {
        self.upload_root.join(&self.state.config().storage.bucket)
    }

    /// Files currently stored in the local bucket.
    pub fn stored_objects(&self) -> Vec<String> {
        std::fs::read_dir(self.bucket_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn create_user(&self, name: &str, email: &str, password: &str, role: i32) -> User {
        self.store()
            .user_repo()
            .create(name, email, password, role, &self.state.config().security)
            .await
            .expect("failed to create user")
    }

    pub fn bearer_for(&self, user: &User) -> String {
        let token = self.state.tokens().issue(user).expect("failed to issue token");
        format!("Bearer {token}")
    }
}

/// Config pointing at a fresh temp database and local photo storage.
pub fn test_config() -> (Config, PathBuf) {
    let id = uuid::Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("ppdb-test-{id}.db"));
    let upload_root = std::env::temp_dir().join(format!("ppdb-test-uploads-{id}"));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = "test-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.storage.backend = StorageBackend::Local;
    config.storage.bucket = "pas-foto".to_string();
    config.storage.public_base_url = "http://localhost:8000/uploads".to_string();
    config.storage.root_path = upload_root.to_string_lossy().into_owned();
    config.observability.metrics_enabled = false;

    (config, upload_root)
}

pub async fn spawn_app_with(config: Config, upload_root: PathBuf) -> TestApp {
    let state = ppdb::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = ppdb::api::router(state.clone());

    TestApp {
        state,
        router,
        upload_root,
    }
}

pub async fn spawn_app() -> TestApp {
    let (config, upload_root) = test_config();
    spawn_app_with(config, upload_root).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}

pub fn json_request(method: &str, uri: &str, auth: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

/// Minimal multipart/form-data encoder.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str, auth: Option<&str>) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(self.bytes)).unwrap()
    }
}

/// 1x1 transparent PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Multipart form with every applicant field filled in.
pub fn full_enrollment(user_id: &str, tanggal_lahir: &str) -> MultipartBody {
    MultipartBody::default()
        .text("user_id", user_id)
        .text("email", "siswa@x.com")
        .text("nama_lengkap", "Siti Aminah")
        .text("nisn", "0051234567")
        .text("jenis_kelamin", "P")
        .text("tempat_lahir", "Bandung")
        .text("tanggal_lahir", tanggal_lahir)
        .text("asal_sekolah", "SMP Negeri 1")
        .text("nama_ayah", "Ahmad")
        .text("no_wa_ayah", "081200000001")
        .text("nama_ibu", "Fatimah")
        .text("no_wa_ibu", "081200000002")
}
