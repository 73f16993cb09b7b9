//! Hosted backend collaborators
//!
//! Everything that talks to the backend-as-a-service goes through the two
//! traits here: [`PostGateway`] for the posts table and image storage, and
//! [`SessionProvider`] for sign-in. [`rest::RestBackend`] implements both
//! over HTTP; [`Offline`] stands in when no endpoint is configured.

mod offline;
pub mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

pub use offline::Offline;
pub use rest::RestBackend;

/// Failure talking to the hosted backend
///
/// Always distinct from an empty or "not found" result.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend is not configured")]
    NotConfigured,

    #[error("invalid backend configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected backend response: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A row of the posts table, as returned by the backend
///
/// Every column is optional; normalization decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostRow {
    #[serde(deserialize_with = "id_as_string")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<String>,
    /// Legacy name for `created_at`
    pub date: Option<String>,
}

/// Identifiers arrive as text (uuid) or, in older tables, as integers
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) if !s.trim().is_empty() => Some(s),
        Some(RawId::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Columns written when a post is created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPostRow {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub user_id: String,
    pub created_at: String,
}

/// An authenticated session with the hosted auth service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Posts table and image storage
#[async_trait]
pub trait PostGateway: Send + Sync {
    /// All rows, ordered by `order_by`
    async fn list_posts(
        &self,
        order_by: &str,
        descending: bool,
    ) -> Result<Vec<PostRow>, GatewayError>;

    /// At most one row whose `field` equals `value`
    async fn get_post_by_exact_match(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<PostRow>, GatewayError>;

    /// At most one row with the given identifier
    async fn get_post_by_id(&self, id: &str) -> Result<Option<PostRow>, GatewayError> {
        self.get_post_by_exact_match("id", id).await
    }

    /// Insert a row, returning the inserted rows
    async fn create_post(
        &self,
        session: &Session,
        row: &NewPostRow,
    ) -> Result<Vec<PostRow>, GatewayError>;

    /// Temporary URL for an object in the image bucket
    async fn create_signed_url(
        &self,
        storage_key: &str,
        ttl_seconds: u64,
    ) -> Result<String, GatewayError>;

    /// Store an object, returning its key
    async fn upload_object(
        &self,
        session: &Session,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, GatewayError>;
}

/// Hosted sign-in
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The session the provider currently holds, if it is still valid
    async fn current_session(&self) -> Result<Option<Session>, GatewayError>;

    /// Password sign-in
    async fn create_session(&self, email: &str, password: &str)
        -> Result<Session, GatewayError>;

    /// Sign out
    async fn destroy_session(&self, session: &Session) -> Result<(), GatewayError>;
}
