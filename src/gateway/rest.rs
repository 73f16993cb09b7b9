//! HTTP backend: PostgREST table, storage buckets and password auth

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{GatewayError, NewPostRow, PostGateway, PostRow, Session, SessionProvider};
use crate::config::BackendConfig;

/// Characters left as-is in object keys; `/` keeps folder structure
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Client for the hosted backend
#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    table: String,
    bucket: String,
    session_file: Option<PathBuf>,
}

impl RestBackend {
    /// Build a client from configuration
    ///
    /// `session_file`, when set, keeps the signed-in session across runs.
    pub fn new(config: &BackendConfig, session_file: Option<PathBuf>) -> Result<Self, GatewayError> {
        if !config.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.api_key)
                .map_err(|e| GatewayError::Config(format!("api_key: {}", e)))?,
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.posts_table.clone(),
            bucket: config.image_bucket.clone(),
            session_file,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.endpoint, self.table)
    }

    fn storage_url(&self, action: &str, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}{}/{}",
            self.endpoint,
            action,
            bucket,
            encode_key(key)
        )
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.endpoint, path)
    }

    /// Turn the relative `signedURL` returned by storage into an absolute URL
    fn absolute_signed_url(&self, signed: &str) -> String {
        if signed.starts_with("http://") || signed.starts_with("https://") {
            return signed.to_string();
        }
        format!(
            "{}/storage/v1/{}",
            self.endpoint,
            signed.trim_start_matches('/')
        )
    }

    async fn load_session(&self) -> Result<Option<Session>, GatewayError> {
        let Some(path) = &self.session_file else {
            return Ok(None);
        };
        read_session_file(path).await
    }

    async fn store_session(&self, session: &Session) -> Result<(), GatewayError> {
        if let Some(path) = &self.session_file {
            write_session_file(path, session).await?;
        }
        Ok(())
    }

    async fn forget_session(&self) {
        if let Some(path) = &self.session_file {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove session file {:?}: {}", path, e);
                }
            }
        }
    }
}

#[derive(Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

#[async_trait]
impl PostGateway for RestBackend {
    async fn list_posts(
        &self,
        order_by: &str,
        descending: bool,
    ) -> Result<Vec<PostRow>, GatewayError> {
        let order = format!("{}.{}", order_by, if descending { "desc" } else { "asc" });
        let response = self
            .client
            .get(self.table_url())
            .bearer_auth(&self.api_key)
            .query(&[("select", "*"), ("order", order.as_str())])
            .send()
            .await?;

        decode(check(response).await?).await
    }

    async fn get_post_by_exact_match(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<PostRow>, GatewayError> {
        let filter = format!("eq.{}", value);
        let response = self
            .client
            .get(self.table_url())
            .bearer_auth(&self.api_key)
            .query(&[("select", "*"), (field, filter.as_str()), ("limit", "1")])
            .send()
            .await?;

        let rows: Vec<PostRow> = decode(check(response).await?).await?;
        Ok(rows.into_iter().next())
    }

    async fn create_post(
        &self,
        session: &Session,
        row: &NewPostRow,
    ) -> Result<Vec<PostRow>, GatewayError> {
        let response = self
            .client
            .post(self.table_url())
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;

        decode(check(response).await?).await
    }

    async fn create_signed_url(
        &self,
        storage_key: &str,
        ttl_seconds: u64,
    ) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(self.storage_url("sign/", &self.bucket, storage_key))
            .bearer_auth(&self.api_key)
            .json(&SignRequest {
                expires_in: ttl_seconds,
            })
            .send()
            .await?;

        let signed: SignResponse = decode(check(response).await?).await?;
        Ok(self.absolute_signed_url(&signed.signed_url))
    }

    async fn upload_object(
        &self,
        session: &Session,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(self.storage_url("", bucket, key))
            .bearer_auth(&session.access_token)
            .header(
                header::CONTENT_TYPE,
                content_type.unwrap_or("application/octet-stream"),
            )
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let uploaded: UploadResponse = decode(check(response).await?).await?;
        Ok(stored_key(uploaded.key.as_deref(), bucket, key))
    }
}

#[async_trait]
impl SessionProvider for RestBackend {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        let Some(saved) = self.load_session().await? else {
            return Ok(None);
        };

        let response = self
            .client
            .get(self.auth_url("user"))
            .bearer_auth(&saved.access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::info!("Saved session has expired");
            self.forget_session().await;
            return Ok(None);
        }

        let user: AuthUser = decode(check(response).await?).await?;
        Ok(Some(Session {
            user_id: user.id,
            email: user.email,
            access_token: saved.access_token,
        }))
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let token: TokenResponse = decode(check(response).await?).await?;
        let session = Session {
            user_id: token.user.id,
            email: token.user.email,
            access_token: token.access_token,
        };

        if let Err(e) = self.store_session(&session).await {
            tracing::warn!("Signed in, but the session could not be saved: {}", e);
        }
        Ok(session)
    }

    async fn destroy_session(&self, session: &Session) -> Result<(), GatewayError> {
        self.forget_session().await;

        let response = self
            .client
            .post(self.auth_url("logout"))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Map non-2xx responses to [`GatewayError::Status`]
async fn check(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Status {
        status: status.as_u16(),
        message: error_message(&body, status),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Best human-readable message from an error body
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "msg", "error_description", "error"] {
            if let Some(serde_json::Value::String(message)) = map.get(field) {
                return message.clone();
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.chars().take(200).collect()
    }
}

fn encode_key(key: &str) -> String {
    utf8_percent_encode(key.trim_start_matches('/'), KEY_SEGMENT).to_string()
}

/// Storage answers with `<bucket>/<key>`; callers want the bare key
fn stored_key(reported: Option<&str>, bucket: &str, requested: &str) -> String {
    reported
        .map(|k| {
            k.strip_prefix(bucket)
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(k)
                .to_string()
        })
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| requested.to_string())
}

async fn read_session_file(path: &Path) -> Result<Option<Session>, GatewayError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str::<Session>(&content) {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            tracing::warn!("Ignoring unreadable session file {:?}: {}", path, e);
            Ok(None)
        }
    }
}

async fn write_session_file(path: &Path, session: &Session) -> Result<(), GatewayError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content =
        serde_json::to_string_pretty(session).map_err(|e| GatewayError::Decode(e.to_string()))?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(session_file: Option<PathBuf>) -> RestBackend {
        let config = BackendConfig {
            endpoint: "https://project.example.co/".to_string(),
            api_key: "anon-key".to_string(),
            ..BackendConfig::default()
        };
        RestBackend::new(&config, session_file).unwrap()
    }

    #[test]
    fn test_requires_endpoint() {
        let result = RestBackend::new(&BackendConfig::default(), None);
        assert!(matches!(result, Err(GatewayError::NotConfigured)));
    }

    #[test]
    fn test_urls() {
        let backend = backend(None);
        assert_eq!(backend.table_url(), "https://project.example.co/rest/v1/posts");
        assert_eq!(
            backend.storage_url("sign/", "blog-images", "a b/c.png"),
            "https://project.example.co/storage/v1/object/sign/blog-images/a%20b/c.png"
        );
        assert_eq!(
            backend.auth_url("token"),
            "https://project.example.co/auth/v1/token"
        );
    }

    #[test]
    fn test_absolute_signed_url() {
        let backend = backend(None);
        assert_eq!(
            backend.absolute_signed_url("/object/sign/blog-images/a.png?token=t"),
            "https://project.example.co/storage/v1/object/sign/blog-images/a.png?token=t"
        );
        assert_eq!(
            backend.absolute_signed_url("https://cdn.example/a.png"),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"message":"new row violates row-level security"}"#, StatusCode::FORBIDDEN),
            "new row violates row-level security"
        );
        assert_eq!(
            error_message(r#"{"error_description":"Invalid login credentials"}"#, StatusCode::BAD_REQUEST),
            "Invalid login credentials"
        );
        assert_eq!(error_message("", StatusCode::BAD_GATEWAY), "Bad Gateway");
        assert_eq!(error_message("plain failure", StatusCode::BAD_REQUEST), "plain failure");
    }

    #[test]
    fn test_stored_key() {
        assert_eq!(stored_key(Some("blog-images/x.png"), "blog-images", "x.png"), "x.png");
        assert_eq!(stored_key(Some("other/x.png"), "blog-images", "x.png"), "other/x.png");
        assert_eq!(stored_key(None, "blog-images", "x.png"), "x.png");
    }

    #[tokio::test]
    async fn test_session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let backend = backend(Some(path.clone()));

        assert!(backend.load_session().await.unwrap().is_none());

        let session = Session {
            user_id: "user-1".to_string(),
            email: Some("admin@example.com".to_string()),
            access_token: "token".to_string(),
        };
        backend.store_session(&session).await.unwrap();
        assert_eq!(backend.load_session().await.unwrap(), Some(session));

        backend.forget_session().await;
        assert!(!path.exists());
        // Forgetting twice is harmless
        backend.forget_session().await;
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let backend = backend(Some(path));
        assert!(backend.load_session().await.unwrap().is_none());
    }
}
