use async_trait::async_trait;
use std::sync::Arc;

use super::{FetchError, KeyScheme, PostSource};
use crate::content::store::EXCERPT_CHARS;
use crate::content::{dedup_tags, ImageRef, MarkdownRenderer, Origin, Post};
use crate::gateway::{PostGateway, PostRow};
use crate::helpers::parse_timestamp;

/// Posts stored in the hosted backend
#[derive(Clone)]
pub struct RemoteSource {
    gateway: Arc<dyn PostGateway>,
    default_author: String,
    signed_url_ttl: u64,
}

impl RemoteSource {
    pub fn new(gateway: Arc<dyn PostGateway>, default_author: &str, signed_url_ttl: u64) -> Self {
        Self {
            gateway,
            default_author: default_author.to_string(),
            signed_url_ttl,
        }
    }

    /// Normalize a row and sign its image
    pub async fn finish(&self, row: PostRow) -> Option<Post> {
        let mut post = normalize_row(row, &self.default_author)?;
        self.sign_image(&mut post).await;
        Some(post)
    }

    /// Swap a storage key for a signed URL
    ///
    /// A signing failure drops the image instead of failing the post.
    async fn sign_image(&self, post: &mut Post) {
        let Some(key) = post
            .featured_image
            .as_ref()
            .and_then(ImageRef::storage_key)
            .map(str::to_string)
        else {
            return;
        };

        match self.gateway.create_signed_url(&key, self.signed_url_ttl).await {
            Ok(url) => post.featured_image = Some(ImageRef::Direct(url)),
            Err(e) => {
                tracing::warn!("Could not sign image {} for post {}: {}", key, post.id, e);
                post.featured_image = None;
            }
        }
    }
}

/// Turn a backend row into a [`Post`]
///
/// Rows without an identifier are unusable and yield `None`.
pub fn normalize_row(row: PostRow, default_author: &str) -> Option<Post> {
    let Some(id) = row.id else {
        tracing::debug!("Dropping post row without an id");
        return None;
    };

    let content = row.content.unwrap_or_default();
    let title = row
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let published_raw = row.created_at.or(row.date);
    let published_at = published_raw.as_deref().and_then(parse_timestamp);
    if published_at.is_none() {
        tracing::warn!("Post {} has no valid created_at; it will sort last", id);
    }

    let mut post = Post::new(id, Origin::Remote, title);
    post.excerpt = row
        .excerpt
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| MarkdownRenderer::plain_excerpt(&content, EXCERPT_CHARS));
    post.content = content;
    post.author = row
        .author
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| default_author.to_string());
    post.tags = dedup_tags(row.tags.unwrap_or_default());
    post.published_at = published_at;
    post.featured_image = row.image_url.as_deref().and_then(ImageRef::parse);

    Some(post)
}

#[async_trait]
impl PostSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote posts"
    }

    fn origin(&self) -> Origin {
        Origin::Remote
    }

    fn scheme(&self) -> KeyScheme {
        KeyScheme::Uuid
    }

    async fn list(&self) -> Result<Vec<Post>, FetchError> {
        let rows = self
            .gateway
            .list_posts("created_at", true)
            .await
            .map_err(|e| FetchError::new(self.name(), e))?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(post) = self.finish(row).await {
                posts.push(post);
            }
        }

        tracing::debug!("Fetched {} remote posts", posts.len());
        Ok(posts)
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<Post>, FetchError> {
        let row = self
            .gateway
            .get_post_by_id(key)
            .await
            .map_err(|e| FetchError::new(self.name(), e))?;

        match row {
            Some(row) => Ok(self.finish(row).await),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{row, FakeGateway};
    use chrono::Datelike;

    const ID: &str = "123e4567-e89b-42d3-a456-426614174000";

    #[test]
    fn test_normalize_row() {
        let mut r = row(ID, "2025-03-01", "R");
        r.content = Some("Hello **world**".to_string());
        r.tags = Some(vec!["fp".to_string(), "fp".to_string()]);

        let post = normalize_row(r, "Lambda Blog").unwrap();
        assert_eq!(post.origin, Origin::Remote);
        assert_eq!(post.excerpt, "Hello world");
        assert_eq!(post.author, "Lambda Blog");
        assert_eq!(post.tags, vec!["fp"]);
        let date = post.published_at.unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 3, 1));
    }

    #[test]
    fn test_normalize_prefers_created_at_over_date() {
        let mut r = row(ID, "2025-03-01", "R");
        r.date = Some("2020-01-01".to_string());
        let post = normalize_row(r, "").unwrap();
        assert_eq!(post.published_at.unwrap().year(), 2025);

        let mut r = row(ID, "", "R");
        r.created_at = None;
        r.date = Some("2020-01-01".to_string());
        let post = normalize_row(r, "").unwrap();
        assert_eq!(post.published_at.unwrap().year(), 2020);
    }

    #[test]
    fn test_normalize_drops_rows_without_id() {
        let mut r = row(ID, "2025-03-01", "R");
        r.id = None;
        assert!(normalize_row(r, "").is_none());
    }

    #[tokio::test]
    async fn test_list_signs_storage_keys_only() {
        let gateway = Arc::new(FakeGateway::default());
        let mut stored = row(ID, "2025-03-01", "Stored");
        stored.image_url = Some("cover.png".to_string());
        let mut direct = row("223e4567-e89b-42d3-a456-426614174000", "2025-02-01", "Direct");
        direct.image_url = Some("https://cdn.example/d.png".to_string());
        gateway.set_rows(vec![stored, direct]);

        let source = RemoteSource::new(gateway.clone(), "Lambda Blog", 3600);
        let posts = source.list().await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(
            posts[0].image_url(),
            Some("https://signed.example/cover.png?ttl=3600")
        );
        assert_eq!(posts[1].image_url(), Some("https://cdn.example/d.png"));
        assert_eq!(gateway.count("sign"), 1);
    }

    #[tokio::test]
    async fn test_signing_failure_keeps_post() {
        let gateway = Arc::new(FakeGateway::default());
        let mut r = row(ID, "2025-03-01", "Broken image");
        r.image_url = Some("missing.png".to_string());
        gateway.set_rows(vec![r]);
        gateway.fail_signing("missing.png");

        let source = RemoteSource::new(gateway.clone(), "Lambda Blog", 3600);
        let posts = source.list().await.unwrap();

        assert_eq!(posts.len(), 1);
        assert!(posts[0].featured_image.is_none());
    }

    #[tokio::test]
    async fn test_list_failure_is_fetch_error() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.fail_reads();

        let source = RemoteSource::new(gateway, "Lambda Blog", 3600);
        let err = source.list().await.unwrap_err();
        assert_eq!(err.source_name, "remote posts");
    }

    #[tokio::test]
    async fn test_get_by_key() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.set_rows(vec![row(ID, "2025-03-01", "R")]);
        let source = RemoteSource::new(gateway.clone(), "Lambda Blog", 3600);

        assert_eq!(source.get_by_key(ID).await.unwrap().unwrap().title, "R");
        assert!(source
            .get_by_key("223e4567-e89b-42d3-a456-426614174000")
            .await
            .unwrap()
            .is_none());
        assert_eq!(gateway.count("get"), 2);
    }
}
