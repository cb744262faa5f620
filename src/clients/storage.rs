//! Blob storage for applicant photos.
//!
//! Two backends: Google Cloud Storage through its JSON API, and a plain
//! directory on disk for development and tests.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::{StorageBackend, StorageConfig};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object name: {0}")]
    InvalidObjectName(String),

    #[error("Storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Storage service returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Key/blob store addressed by bucket and object name.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` under `object`, replacing any existing blob.
    async fn put(&self, object: &str, content_type: &str, bytes: Vec<u8>)
    -> Result<(), StorageError>;

    /// Removes `object`. Deleting a missing object is not an error.
    async fn delete(&self, object: &str) -> Result<(), StorageError>;

    fn bucket(&self) -> &str;

    fn public_base_url(&self) -> &str;

    /// `<public-base>/<bucket>/<object>`
    fn public_url(&self, object: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url().trim_end_matches('/'),
            self.bucket(),
            object
        )
    }

    /// Inverse of [`BlobStore::public_url`]. `None` for URLs that do not
    /// point into this store.
    fn object_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!(
            "{}/{}/",
            self.public_base_url().trim_end_matches('/'),
            self.bucket()
        );
        url.strip_prefix(&prefix)
            .filter(|object| !object.is_empty())
            .map(str::to_string)
    }
}

fn validate_object_name(object: &str) -> Result<(), StorageError> {
    if object.is_empty()
        || object.contains('/')
        || object.contains('\\')
        || object.contains("..")
    {
        return Err(StorageError::InvalidObjectName(object.to_string()));
    }
    Ok(())
}

pub struct GcsBlobStore {
    client: Client,
    bucket: String,
    public_base_url: String,
    upload_base_url: String,
    api_base_url: String,
    access_token: Option<String>,
}

impl GcsBlobStore {
    #[must_use]
    pub fn new(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn upload_url(&self, object: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&format!("{}/b/{}/o", self.upload_base_url, self.bucket))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object);
        Ok(url)
    }

    fn object_url(&self, object: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&format!("{}/b/{}/o", self.api_base_url, self.bucket))?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(object);
        Ok(url)
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn put(
        &self,
        object: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        validate_object_name(object)?;
        let url = self.upload_url(object)?;
        let size = bytes.len();

        let response = self
            .authorize(self.client.post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { status, body });
        }

        info!("Uploaded gs://{}/{} ({} bytes)", self.bucket, object, size);
        Ok(())
    }

    async fn delete(&self, object: &str) -> Result<(), StorageError> {
        validate_object_name(object)?;
        let url = self.object_url(object)?;

        let response = self.authorize(self.client.delete(url)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("gs://{}/{} already gone", self.bucket, object);
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { status, body });
        }

        info!("Deleted gs://{}/{}", self.bucket, object);
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}

/// Stores blobs as `<root>/<bucket>/<object>`.
pub struct LocalBlobStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalBlobStore {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root_path),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        object: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        validate_object_name(object)?;
        let dir = self.bucket_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(object), bytes).await?;
        debug!("Stored {}/{} on disk", self.bucket, object);
        Ok(())
    }

    async fn delete(&self, object: &str) -> Result<(), StorageError> {
        validate_object_name(object)?;
        match tokio::fs::remove_file(self.bucket_dir().join(object)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}

#[must_use]
pub fn build_blob_store(client: Client, config: &StorageConfig) -> Arc<dyn BlobStore> {
    match config.backend {
        StorageBackend::Gcs => Arc::new(GcsBlobStore::new(client, config)),
        StorageBackend::Local => Arc::new(LocalBlobStore::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config(root: &std::path::Path) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Local,
            bucket: "foto".to_string(),
            public_base_url: "http://localhost:8000/uploads/".to_string(),
            root_path: root.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        }
    }

    #[test]
    fn public_url_joins_base_bucket_and_object() {
        let store = GcsBlobStore::new(Client::new(), &StorageConfig::default());
        assert_eq!(
            store.public_url("abc"),
            "https://storage.googleapis.com/ppdb-pas-foto/abc"
        );
        assert_eq!(
            store.object_from_url("https://storage.googleapis.com/ppdb-pas-foto/abc"),
            Some("abc".to_string())
        );
        assert_eq!(store.object_from_url("https://example.com/abc"), None);
    }

    #[test]
    fn upload_url_uses_media_upload() {
        let store = GcsBlobStore::new(Client::new(), &StorageConfig::default());
        let url = store.upload_url("abc-123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/upload/storage/v1/b/ppdb-pas-foto/o?uploadType=media&name=abc-123"
        );
        let url = store.object_url("abc-123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/ppdb-pas-foto/o/abc-123"
        );
    }

    #[test]
    fn rejects_path_like_object_names() {
        assert!(validate_object_name("ok-name").is_ok());
        assert!(validate_object_name("").is_err());
        assert!(validate_object_name("../etc/passwd").is_err());
        assert!(validate_object_name("a/b").is_err());
    }

    #[tokio::test]
    async fn local_store_writes_and_deletes() {
        let root = std::env::temp_dir().join(format!("ppdb-blob-{}", uuid::Uuid::new_v4()));
        let store = LocalBlobStore::new(&local_config(&root));

        store.put("obj", "image/png", vec![1, 2, 3]).await.unwrap();
        let path = root.join("foto").join("obj");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![1, 2, 3]);
        assert_eq!(
            store.public_url("obj"),
            "http://localhost:8000/uploads/foto/obj"
        );

        store.delete("obj").await.unwrap();
        assert!(!path.exists());
        store.delete("obj").await.unwrap();

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
