//! GCS Storage - Firebase 项目的 Cloud Storage bucket
//!
//! 实现 StorageBackendPort，通过 JSON API 上传/删除对象
//!
//! 上传分两步：
//! 1. POST /upload/storage/v1/b/{bucket}/o?uploadType=media&name={key}
//! 2. POST /storage/v1/b/{bucket}/o/{key}/acl  {"entity":"allUsers","role":"READER"}
//!
//! 两步之间崩溃会留下一个私有对象，只影响可用性

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{header::CONTENT_TYPE, Client, Response, Url};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::ports::{
    EndpointInfo, StorageBackendPort, StorageDescriptor, StorageError, StorageKind,
};

const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.full_control";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const UPLOAD_PREFIX: &str = "uploads";

/// GCS 后端配置
#[derive(Debug, Clone)]
pub struct GcsStorageConfig {
    pub project_id: String,
    pub private_key_id: String,
    /// PEM 私钥，允许使用字面量 `\n` 代替换行（环境变量里常见）
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub storage_bucket: String,
    pub token_uri: String,
    /// JSON API 基础地址
    pub api_base: String,
    /// 公网访问地址前缀
    pub public_base: String,
    pub timeout_secs: u64,
}

impl Default for GcsStorageConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            private_key_id: String::new(),
            private_key: String::new(),
            client_email: String::new(),
            client_id: String::new(),
            storage_bucket: String::new(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            api_base: "https://storage.googleapis.com".to_string(),
            public_base: "https://storage.googleapis.com".to_string(),
            timeout_secs: 60,
        }
    }
}

impl GcsStorageConfig {
    /// 四项必需凭据全部非空
    pub fn is_configured(&self) -> bool {
        !self.project_id.is_empty()
            && !self.private_key.is_empty()
            && !self.client_email.is_empty()
            && !self.storage_bucket.is_empty()
    }
}

/// 扩展名 → Content-Type
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// 生成对象 key：`uploads/<name>` 或 `uploads/<uuid>-<basename>`
pub fn storage_key(local_path: &Path, name: Option<&str>) -> Result<String, StorageError> {
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        return Ok(format!("{}/{}", UPLOAD_PREFIX, name));
    }

    let basename = local_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            StorageError::IoError(format!("Invalid file name: {}", local_path.display()))
        })?;

    Ok(format!("{}/{}-{}", UPLOAD_PREFIX, Uuid::new_v4(), basename))
}

/// 从公网 URL 取回对象 key（最后两段 `uploads/<file>`）
fn object_key_from_url(public_url: &str) -> Option<String> {
    let mut parts = public_url.trim_end_matches('/').rsplit('/');
    let file = parts.next().filter(|s| !s.is_empty())?;
    let dir = parts.next().filter(|s| !s.is_empty())?;
    Some(format!("{}/{}", dir, file))
}

#[derive(Debug, Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// GCS 存储后端
pub struct GcsStorageBackend {
    config: GcsStorageConfig,
    client: Client,
    /// 私钥解析成功才有值，等价于 "initialized"
    signing_key: Option<EncodingKey>,
    token: Mutex<Option<CachedToken>>,
}

impl GcsStorageBackend {
    pub fn new(config: GcsStorageConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        let signing_key = Self::initialize(&config);

        Ok(Self {
            config,
            client,
            signing_key,
            token: Mutex::new(None),
        })
    }

    fn initialize(config: &GcsStorageConfig) -> Option<EncodingKey> {
        if !config.is_configured() {
            tracing::warn!("Cloud storage not configured - using local storage fallback");
            return None;
        }

        let pem = config.private_key.replace("\\n", "\n");
        match EncodingKey::from_rsa_pem(pem.as_bytes()) {
            Ok(key) => {
                tracing::info!(
                    bucket = %config.storage_bucket,
                    project_id = %config.project_id,
                    "Cloud storage initialized successfully"
                );
                Some(key)
            }
            Err(e) => {
                tracing::error!(error = %e, "Cloud storage initialization failed");
                None
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.signing_key.is_some()
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.public_base.trim_end_matches('/'),
            self.config.storage_bucket,
            key
        )
    }

    /// 拼接 API 地址，每一段单独做百分号编码（对象 key 里的 `/` 会变成 `%2F`）
    fn api_url(&self, segments: &[&str]) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| StorageError::IoError(format!("Invalid storage API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::IoError("Storage API base cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, StorageError> {
        let key = self.signing_key.as_ref().ok_or(StorageError::NotInitialized)?;

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() + ChronoDuration::seconds(60) {
                return Ok(token.value.clone());
            }
        }

        let now = Utc::now().timestamp();
        let claims = ServiceAccountClaims {
            iss: &self.config.client_email,
            scope: STORAGE_SCOPE,
            aud: &self.config.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let mut header = Header::new(Algorithm::RS256);
        if !self.config.private_key_id.is_empty() {
            header.kid = Some(self.config.private_key_id.clone());
        }
        let assertion = jsonwebtoken::encode(&header, &claims, key)
            .map_err(|e| StorageError::AuthError(format!("Failed to sign assertion: {}", e)))?;

        let response = self
            .client
            .post(&self.config.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| StorageError::AuthError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::AuthError(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::AuthError(format!("Invalid token response: {}", e)))?;

        tracing::debug!(expires_in = token.expires_in, "Fetched storage access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Utc::now() + ChronoDuration::seconds(token.expires_in),
        });

        Ok(token.access_token)
    }

    async fn ensure_success(response: Response, action: &str) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::UploadFailed(format!(
            "{} failed with HTTP {}: {}",
            action, status, body
        )))
    }

    async fn write_object(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<(), StorageError> {
        let token = self.access_token().await?;
        let mut url = self.api_url(&["upload", "storage", "v1", "b", &self.config.storage_bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Self::ensure_success(response, "Object write").await
    }

    async fn make_public(&self, key: &str) -> Result<(), StorageError> {
        let token = self.access_token().await?;
        let url = self.api_url(&["storage", "v1", "b", &self.config.storage_bucket, "o", key, "acl"])?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "entity": "allUsers", "role": "READER" }))
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Self::ensure_success(response, "Make public").await
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let token = self.access_token().await?;
        let url = self.api_url(&["storage", "v1", "b", &self.config.storage_bucket, "o", key])?;

        let response = self
            .client
            .delete(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Self::ensure_success(response, "Object delete").await
    }
}

#[async_trait]
impl StorageBackendPort for GcsStorageBackend {
    fn kind(&self) -> StorageKind {
        StorageKind::Remote
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn upload_file(&self, local_path: &Path, name: Option<&str>) -> Result<String, StorageError> {
        if !self.is_initialized() {
            return Err(StorageError::NotInitialized);
        }
        if !local_path.exists() {
            return Err(StorageError::FileNotFound(
                local_path.to_string_lossy().to_string(),
            ));
        }

        let key = storage_key(local_path, name)?;
        let content_type = content_type_for(local_path);
        let data = tokio::fs::read(local_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        tracing::info!(key = %key, size = data.len(), "Uploading file to cloud storage");

        self.write_object(&key, content_type, data).await?;
        self.make_public(&key).await?;

        let public_url = self.public_url(&key);
        tracing::info!(url = %public_url, "File uploaded successfully");

        Ok(public_url)
    }

    async fn delete_file(&self, public_url: &str) -> bool {
        if !self.is_initialized() {
            tracing::warn!("Cloud storage not initialized, skipping file deletion");
            return false;
        }

        let Some(key) = object_key_from_url(public_url) else {
            tracing::warn!(url = %public_url, "Cannot derive object key from URL");
            return false;
        };

        match self.delete_object(&key).await {
            Ok(()) => {
                tracing::info!(key = %key, "File deleted successfully");
                true
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Cloud storage delete failed");
                false
            }
        }
    }

    fn describe(&self) -> StorageDescriptor {
        let configured = self.is_configured();
        let initialized = self.is_initialized();

        let endpoint = if initialized {
            EndpointInfo::Bucket {
                bucket: self.config.storage_bucket.clone(),
                project_id: self.config.project_id.clone(),
            }
        } else if configured {
            EndpointInfo::Message {
                message: "Cloud storage configured but not initialized".to_string(),
            }
        } else {
            EndpointInfo::Message {
                message: "Cloud storage not configured".to_string(),
            }
        };

        StorageDescriptor {
            kind: StorageKind::Remote,
            configured,
            initialized,
            endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path as AxumPath, Query, State},
        http::{HeaderMap, StatusCode},
        routing::{delete, post},
        Json, Router,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex as StdMutex};
    use tempfile::tempdir;

    const TEST_KEY: &str = include_str!("testdata/service_account_key.pem");

    #[derive(Default)]
    struct MockGcs {
        calls: StdMutex<Vec<String>>,
    }

    impl MockGcs {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn bearer(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn spawn_mock() -> (String, Arc<MockGcs>) {
        let mock = Arc::new(MockGcs::default());

        let app = Router::new()
            .route(
                "/token",
                post(|State(m): State<Arc<MockGcs>>| async move {
                    m.record("token".to_string());
                    Json(serde_json::json!({
                        "access_token": "test-token",
                        "expires_in": 3600,
                        "token_type": "Bearer"
                    }))
                }),
            )
            .route(
                "/upload/storage/v1/b/:bucket/o",
                post(
                    |State(m): State<Arc<MockGcs>>,
                     AxumPath(bucket): AxumPath<String>,
                     Query(q): Query<HashMap<String, String>>,
                     headers: HeaderMap| async move {
                        if bearer(&headers) != "Bearer test-token" {
                            return StatusCode::UNAUTHORIZED;
                        }
                        let content_type = headers
                            .get("content-type")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        m.record(format!(
                            "upload {} {} {}",
                            bucket,
                            q.get("name").cloned().unwrap_or_default(),
                            content_type
                        ));
                        StatusCode::OK
                    },
                ),
            )
            .route(
                "/storage/v1/b/:bucket/o/:object/acl",
                post(
                    |State(m): State<Arc<MockGcs>>,
                     AxumPath((_bucket, object)): AxumPath<(String, String)>| async move {
                        m.record(format!("acl {}", object));
                        StatusCode::OK
                    },
                ),
            )
            .route(
                "/storage/v1/b/:bucket/o/:object",
                delete(
                    |State(m): State<Arc<MockGcs>>,
                     AxumPath((_bucket, object)): AxumPath<(String, String)>| async move {
                        m.record(format!("delete {}", object));
                        if object.contains("missing") {
                            StatusCode::NOT_FOUND
                        } else {
                            StatusCode::NO_CONTENT
                        }
                    },
                ),
            )
            .with_state(mock.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), mock)
    }

    fn configured(api_base: &str) -> GcsStorageConfig {
        GcsStorageConfig {
            project_id: "test-project".to_string(),
            private_key_id: "key-1".to_string(),
            private_key: TEST_KEY.to_string(),
            client_email: "svc@test-project.iam.gserviceaccount.com".to_string(),
            client_id: "123".to_string(),
            storage_bucket: "test-bucket".to_string(),
            token_uri: format!("{}/token", api_base),
            api_base: api_base.to_string(),
            ..GcsStorageConfig::default()
        }
    }

    fn write_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"image bytes").unwrap();
        path
    }

    #[test]
    fn test_is_configured_requires_all_four_credentials() {
        let base = configured("http://localhost");
        assert!(base.is_configured());

        let flips: [fn(&mut GcsStorageConfig); 4] = [
            |c| c.project_id.clear(),
            |c| c.private_key.clear(),
            |c| c.client_email.clear(),
            |c| c.storage_bucket.clear(),
        ];
        for flip in flips {
            let mut config = base.clone();
            flip(&mut config);
            assert!(!config.is_configured());
        }

        // 非必需字段为空不影响
        let mut config = base.clone();
        config.private_key_id.clear();
        config.client_id.clear();
        assert!(config.is_configured());
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(content_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.png")), "image/png");
        assert_eq!(content_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(content_type_for(Path::new("a.gif")), "image/gif");
        assert_eq!(content_type_for(Path::new("a.bmp")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_storage_key() {
        let explicit = storage_key(Path::new("/tmp/x.png"), Some("fixed.png")).unwrap();
        assert_eq!(explicit, "uploads/fixed.png");

        let a = storage_key(Path::new("/tmp/a/person.jpg"), None).unwrap();
        let b = storage_key(Path::new("/tmp/b/person.jpg"), None).unwrap();
        assert!(a.starts_with("uploads/") && a.ends_with("-person.jpg"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_object_key_from_url() {
        assert_eq!(
            object_key_from_url("https://storage.googleapis.com/bucket/uploads/abc-person.jpg"),
            Some("uploads/abc-person.jpg".to_string())
        );
        assert_eq!(object_key_from_url("person.jpg"), None);
    }

    #[test]
    fn test_escaped_newlines_in_private_key_are_accepted() {
        let mut config = configured("http://localhost");
        config.private_key = TEST_KEY.replace('\n', "\\n");
        let backend = GcsStorageBackend::new(config).unwrap();
        assert!(backend.is_initialized());
    }

    #[tokio::test]
    async fn test_invalid_key_leaves_backend_uninitialized() {
        let mut config = configured("http://localhost");
        config.private_key = "not a pem".to_string();
        let backend = GcsStorageBackend::new(config).unwrap();

        assert!(backend.is_configured());
        assert!(!backend.is_initialized());

        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "person.jpg");
        let err = backend.upload_file(&path, None).await.unwrap_err();
        assert!(matches!(err, StorageError::NotInitialized));
        assert!(!backend.delete_file("https://storage.googleapis.com/b/uploads/x.jpg").await);

        let json = serde_json::to_value(backend.describe()).unwrap();
        assert_eq!(json["type"], "remote");
        assert_eq!(json["configured"], true);
        assert_eq!(json["initialized"], false);
        assert_eq!(json["message"], "Cloud storage configured but not initialized");
    }

    #[tokio::test]
    async fn test_upload_writes_then_makes_public() {
        let (base, mock) = spawn_mock().await;
        let backend = GcsStorageBackend::new(configured(&base)).unwrap();
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "person.jpg");

        let url = backend.upload_file(&path, None).await.unwrap();

        let prefix = "https://storage.googleapis.com/test-bucket/uploads/";
        assert!(url.starts_with(prefix));
        assert!(url.ends_with("-person.jpg"));
        let key = url.trim_start_matches("https://storage.googleapis.com/test-bucket/");

        assert_eq!(
            mock.calls(),
            vec![
                "token".to_string(),
                format!("upload test-bucket {} image/jpeg", key),
                format!("acl {}", key),
            ]
        );
        // 本地文件不会被删除
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_same_basename_uploads_get_distinct_urls() {
        let (base, mock) = spawn_mock().await;
        let backend = GcsStorageBackend::new(configured(&base)).unwrap();
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        let a = write_file(dir_a.path(), "garment.png");
        let b = write_file(dir_b.path(), "garment.png");

        let (url_a, url_b) = tokio::join!(backend.upload_file(&a, None), backend.upload_file(&b, None));
        let (url_a, url_b) = (url_a.unwrap(), url_b.unwrap());

        assert_ne!(url_a, url_b);
        assert!(url_a.ends_with("-garment.png") && url_b.ends_with("-garment.png"));
        // token 只取一次
        assert_eq!(mock.calls().iter().filter(|c| *c == "token").count(), 1);
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let (base, mock) = spawn_mock().await;
        let backend = GcsStorageBackend::new(configured(&base)).unwrap();

        let err = backend
            .upload_file(Path::new("/nonexistent/person.jpg"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::FileNotFound(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_outcome_without_error() {
        let (base, mock) = spawn_mock().await;
        let backend = GcsStorageBackend::new(configured(&base)).unwrap();

        assert!(
            backend
                .delete_file("https://storage.googleapis.com/test-bucket/uploads/abc-person.jpg")
                .await
        );
        assert!(
            !backend
                .delete_file("https://storage.googleapis.com/test-bucket/uploads/missing.jpg")
                .await
        );
        assert!(mock
            .calls()
            .contains(&"delete uploads/abc-person.jpg".to_string()));
    }

    #[test]
    fn test_describe_initialized_bucket() {
        let backend = GcsStorageBackend::new(configured("http://localhost")).unwrap();
        let json = serde_json::to_value(backend.describe()).unwrap();
        assert_eq!(json["type"], "remote");
        assert_eq!(json["name"], "test-bucket");
        assert_eq!(json["projectId"], "test-project");
        assert_eq!(json["initialized"], true);
    }
}
