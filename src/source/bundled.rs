use async_trait::async_trait;
use std::sync::Arc;

use super::{FetchError, KeyScheme, PostSource};
use crate::content::{Origin, Post, StaticPostStore};

/// Posts compiled into the binary
#[derive(Debug, Clone)]
pub struct BundledSource {
    store: Arc<StaticPostStore>,
}

impl BundledSource {
    pub fn new(store: Arc<StaticPostStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PostSource for BundledSource {
    fn name(&self) -> &'static str {
        "bundled posts"
    }

    fn origin(&self) -> Origin {
        Origin::Static
    }

    fn scheme(&self) -> KeyScheme {
        KeyScheme::Slug
    }

    async fn list(&self) -> Result<Vec<Post>, FetchError> {
        Ok(self.store.posts().to_vec())
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<Post>, FetchError> {
        Ok(self.store.get_by_slug(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_and_lookup() {
        let store = StaticPostStore::new(vec![
            Post::new("a", Origin::Static, "A"),
            Post::new("b", Origin::Static, "B"),
        ]);
        let source = BundledSource::new(Arc::new(store));

        let posts = source.list().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "a");

        assert_eq!(source.get_by_key("b").await.unwrap().unwrap().title, "B");
        assert!(source.get_by_key("c").await.unwrap().is_none());
    }
}
