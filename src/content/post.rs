//! Unified post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ImageRef;

/// Where a post came from
///
/// Only used to pick the identifier scheme and routing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Bundled with the binary
    Static,
    /// Stored in the hosted backend
    Remote,
}

/// A blog post, regardless of source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Slug for static posts, backend identifier for remote posts
    pub id: String,

    pub origin: Origin,

    /// Post title
    pub title: String,

    /// Raw markdown content
    pub content: String,

    /// Short plain-text summary
    pub excerpt: String,

    pub author: String,

    /// Post tags, in display order
    pub tags: Vec<String>,

    /// Publication instant; `None` when the stored date could not be parsed
    pub published_at: Option<DateTime<Utc>>,

    /// Featured image, if any
    pub featured_image: Option<ImageRef>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(id: impl Into<String>, origin: Origin, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin,
            title: title.into(),
            content: String::new(),
            excerpt: String::new(),
            author: String::new(),
            tags: Vec::new(),
            published_at: None,
            featured_image: None,
        }
    }

    /// Key identifying this post within a merged collection
    pub fn key(&self) -> (Origin, &str) {
        (self.origin, self.id.as_str())
    }

    /// Path segment used in `/post/<route_key>`
    pub fn route_key(&self) -> &str {
        &self.id
    }

    /// Viewable image URL, once any storage key has been signed
    pub fn image_url(&self) -> Option<&str> {
        self.featured_image.as_ref().and_then(ImageRef::direct_url)
    }

    /// Number of tags shared with `tags`
    pub fn shared_tags(&self, tags: &[String]) -> usize {
        self.tags.iter().filter(|t| tags.contains(t)).count()
    }
}

/// Remove duplicate tags, keeping first occurrences in order
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_tags_keeps_order() {
        let tags = vec![
            "rust".to_string(),
            "fp".to_string(),
            " rust ".to_string(),
            "".to_string(),
            "monads".to_string(),
        ];
        assert_eq!(dedup_tags(tags), vec!["rust", "fp", "monads"]);
    }

    #[test]
    fn test_shared_tags() {
        let mut post = Post::new("a", Origin::Static, "A");
        post.tags = vec!["fp".to_string(), "haskell".to_string()];
        let other = vec!["haskell".to_string(), "rust".to_string(), "fp".to_string()];
        assert_eq!(post.shared_tags(&other), 2);
        assert_eq!(post.shared_tags(&[]), 0);
    }

    #[test]
    fn test_image_url_only_for_direct_refs() {
        let mut post = Post::new("a", Origin::Remote, "A");
        post.featured_image = Some(ImageRef::StorageKey("cover.png".to_string()));
        assert_eq!(post.image_url(), None);

        post.featured_image = Some(ImageRef::Direct("https://cdn.example/cover.png".to_string()));
        assert_eq!(post.image_url(), Some("https://cdn.example/cover.png"));
    }
}
