//! Creating posts in the hosted backend

use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::auth::{AuthError, AuthGuard};
use crate::config::SiteConfig;
use crate::content::Post;
use crate::gateway::{GatewayError, NewPostRow, PostGateway};
use crate::source::RemoteSource;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("a post is already being published for this account")]
    InFlight,

    #[error("image upload failed: {0}")]
    Upload(#[source] GatewayError),

    #[error("post could not be saved: {0}")]
    Persist(String),
}

/// An image attached to a new post
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub title: String,
    pub content: String,
    pub image: Option<ImageUpload>,
}

impl PublishRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    fn validate(&self) -> Result<(), PublishError> {
        if self.title.trim().is_empty() {
            return Err(PublishError::Validation("title is required".to_string()));
        }
        if let Some(image) = &self.image {
            if image.bytes.is_empty() {
                return Err(PublishError::Validation(format!(
                    "image {} is empty",
                    image.file_name
                )));
            }
        }
        Ok(())
    }
}

/// Object key for an uploaded image: a fresh UUID plus the file's extension
pub fn storage_key_for(file_name: &str) -> String {
    let id = uuid::Uuid::new_v4();
    match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
    {
        Some(ext) => format!("{}.{}", id, ext.to_ascii_lowercase()),
        None => id.to_string(),
    }
}

/// Writes new posts on behalf of the signed-in user
pub struct Publisher {
    gateway: Arc<dyn PostGateway>,
    guard: Arc<AuthGuard>,
    remote: RemoteSource,
    bucket: String,
    in_flight: Mutex<HashSet<String>>,
}

/// Held while a publish runs; frees the user's slot when dropped
struct InFlight<'a> {
    users: &'a Mutex<HashSet<String>>,
    user_id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

impl Publisher {
    pub fn new(gateway: Arc<dyn PostGateway>, guard: Arc<AuthGuard>, config: &SiteConfig) -> Self {
        Self {
            remote: RemoteSource::new(
                gateway.clone(),
                &config.author,
                config.backend.signed_url_ttl,
            ),
            gateway,
            guard,
            bucket: config.backend.image_bucket.clone(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn begin(&self, user_id: &str) -> Result<InFlight<'_>, PublishError> {
        let mut users = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !users.insert(user_id.to_string()) {
            return Err(PublishError::InFlight);
        }
        Ok(InFlight {
            users: &self.in_flight,
            user_id: user_id.to_string(),
        })
    }

    /// Upload the image (if any), then insert the post row
    pub async fn publish(&self, request: PublishRequest) -> Result<Post, PublishError> {
        let session = self.guard.require_session().await?;
        request.validate()?;
        let _slot = self.begin(&session.user_id)?;

        let image_key = match request.image {
            Some(image) => {
                let key = storage_key_for(&image.file_name);
                tracing::info!("Uploading {} as {}", image.file_name, key);
                let stored = self
                    .gateway
                    .upload_object(
                        &session,
                        &self.bucket,
                        &key,
                        image.bytes,
                        image.content_type.as_deref(),
                    )
                    .await
                    .map_err(PublishError::Upload)?;
                Some(stored)
            }
            None => None,
        };

        let row = NewPostRow {
            title: request.title.trim().to_string(),
            content: request.content,
            image_url: image_key,
            user_id: session.user_id.clone(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let created = self
            .gateway
            .create_post(&session, &row)
            .await
            .map_err(|e| PublishError::Persist(e.to_string()))?;

        let Some(first) = created.into_iter().next() else {
            return Err(PublishError::Persist(
                "backend returned no rows".to_string(),
            ));
        };

        let post = self.remote.finish(first).await.ok_or_else(|| {
            PublishError::Persist("backend returned a row without an id".to_string())
        })?;

        tracing::info!("Published post {} ({})", post.id, post.title);
        Ok(post)
    }
}
