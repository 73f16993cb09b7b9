//! Merged view over every post source
//!
//! [`PostService`] lists and resolves posts without knowing which kind of
//! source it is talking to; sources are consulted in precedence order.

mod archive;

use std::collections::HashSet;
use std::sync::Arc;

use crate::content::{Origin, Post};
use crate::source::{FetchError, PostSource};

pub use archive::{group_by_month, newest_first, Listing, MonthGroup, UNDATED_LABEL};

/// Aggregates and resolves posts across sources
#[derive(Clone)]
pub struct PostService {
    sources: Vec<Arc<dyn PostSource>>,
}

impl PostService {
    /// Sources are consulted in the given order
    pub fn new(sources: Vec<Arc<dyn PostSource>>) -> Self {
        Self { sources }
    }

    /// Every post from every source, deduplicated, newest first
    pub async fn all_posts(&self) -> Result<Vec<Post>, FetchError> {
        let mut seen: HashSet<(Origin, String)> = HashSet::new();
        let mut posts = Vec::new();

        for source in &self.sources {
            let origin = source.origin();
            for mut post in source.list().await? {
                if post.origin != origin {
                    tracing::warn!(
                        "Post {} from {} claims origin {:?}, treating it as {:?}",
                        post.id,
                        source.name(),
                        post.origin,
                        origin
                    );
                    post.origin = origin;
                }
                if !seen.insert((origin, post.id.clone())) {
                    tracing::warn!(
                        "Duplicate {:?} post {} in {}, keeping the first",
                        origin,
                        post.id,
                        source.name()
                    );
                    continue;
                }
                posts.push(post);
            }
        }

        posts.sort_by(newest_first);
        Ok(posts)
    }

    /// Month-grouped listing of every post
    pub async fn list_posts(&self) -> Result<Listing, FetchError> {
        let posts = self.all_posts().await?;
        tracing::debug!("Listing {} posts", posts.len());
        Ok(group_by_month(posts))
    }

    /// Find the post a route parameter names
    ///
    /// Returns `Ok(None)` when no source holds it. A source whose key scheme
    /// cannot admit `param` is never asked.
    pub async fn resolve(&self, param: &str) -> Result<Option<Post>, FetchError> {
        for source in &self.sources {
            if !source.scheme().admits(param) {
                tracing::debug!("{} cannot hold key {:?}, skipping", source.name(), param);
                continue;
            }

            if let Some(post) = source.get_by_key(param).await? {
                return Ok(Some(post));
            }
        }

        tracing::debug!("No post found for {:?}", param);
        Ok(None)
    }
}
