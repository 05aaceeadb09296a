//! Blob storage for student photos and recognition model artifacts.
//!
//! [`S3BlobStore`] talks to AWS S3 or MinIO. [`MemoryBlobStore`] keeps objects
//! in process and backs tests and `STORAGE_BACKEND=memory`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};

/// Placeholder written when a student folder is created.
pub const FOLDER_PLACEHOLDER: &str = ".init.txt";

/// Object metadata returned by [`BlobStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobObject {
    pub key: String,
    pub size: u64,
}

impl BlobObject {
    /// Last path segment of the key.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// Narrow object-store capability used by the handlers.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()>;

    /// Object bytes and content type. Missing keys are NotFound.
    async fn download(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)>;

    /// Objects whose key starts with `prefix`, ordered by key.
    async fn list(&self, prefix: &str) -> AppResult<Vec<BlobObject>>;

    /// Remove one object. Missing keys are NotFound.
    async fn remove(&self, key: &str) -> AppResult<()>;

    fn public_url(&self, key: &str) -> String;

    /// Accept either an in-bucket key or a full public URL and return the key.
    fn key_from_reference(&self, reference: &str) -> String {
        let base = self.public_url("");
        let base = base.trim_end_matches('/');
        let key = reference
            .strip_prefix(base)
            .unwrap_or(reference)
            .trim_start_matches('/');
        let key = key.split(['?', '#']).next().unwrap_or(key);
        urlencoding::decode(key)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| key.to_string())
    }
}

/// Public link for `key`, percent-encoding each path segment.
fn public_object_url(base: &str, key: &str) -> String {
    let encoded: Vec<_> = key.split('/').map(urlencoding::encode).collect();
    format!("{}/{}", base, encoded.join("/"))
}

/// Prefix holding one student's photos.
pub fn student_folder(student_id: &str) -> String {
    format!("students/{}/", student_id)
}

pub fn student_photo_key(student_id: &str, filename: &str) -> String {
    format!("{}{}", student_folder(student_id), filename)
}

/// Merged face-encoding model of a class section.
pub fn class_model_key(class_section_id: &str) -> String {
    format!("models/{}", class_section_id)
}

/// Get the content type for a file based on its extension.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Reduce a client-supplied file name to a single safe path segment.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(
        name.chars()
            .map(|c| if c.is_control() { '_' } else { c })
            .collect(),
    )
}

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    /// Create a new S3 storage client from configuration.
    pub async fn new(config: &StorageSettings) -> AppResult<Self> {
        let credentials =
            Credentials::new(&config.access_key, &config.secret_key, None, None, "attendance");

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let store = Self {
            client: Client::from_conf(s3_config_builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url(),
        };

        store.ensure_bucket_exists().await?;
        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(store)
    }

    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if !service_error.is_not_found() {
                    return Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )));
                }
                info!("Creating S3 bucket '{}'", self.bucket);
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| AppError::Storage(format!("Failed to create bucket: {}", e)))?;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload {}: {}", key, e)))?;
        Ok(())
    }

    async fn download(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    AppError::NotFound(format!("File {}", key))
                } else {
                    AppError::Storage(format!("Failed to get {}: {}", key, service_error))
                }
            })?;

        let content_type = response.content_type().map(String::from);
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read S3 response body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok((data, content_type))
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<BlobObject>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| AppError::Storage(format!("Failed to list {}: {}", prefix, e)))?;

            objects.extend(response.contents().iter().filter_map(|object| {
                object.key().map(|key| BlobObject {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                })
            }));

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        // S3 deletes of missing keys succeed silently, so stat first
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    AppError::NotFound(format!("File {}", key))
                } else {
                    AppError::Storage(format!("Failed to stat {}: {}", key, service_error))
                }
            })?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete {}: {}", key, e)))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base_url, key)
    }
}

/// In-process blob store.
pub struct MemoryBlobStore {
    objects: RwLock<BTreeMap<String, (Vec<u8>, Option<String>)>>,
    public_base_url: String,
}

impl MemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (data, content_type.map(String::from)));
        Ok(())
    }

    async fn download(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("File {}", key)))
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<BlobObject>> {
        Ok(self
            .objects
            .read()
            .await
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, (data, _))| BlobObject {
                key: key.clone(),
                size: data.len() as u64,
            })
            .collect())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("File {}", key)))
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base_url, key)
    }
}
