//! Static post store - posts bundled into the binary

use anyhow::{Context, Result};

use super::{dedup_tags, FrontMatter, ImageRef, MarkdownRenderer, Origin, Post};
use crate::helpers::parse_timestamp;

/// Length of excerpts derived from post bodies
pub const EXCERPT_CHARS: usize = 160;

/// Markdown sources compiled into the binary, in display order
const BUNDLED_POSTS: &[(&str, &str)] = &[
    (
        "category-theory.md",
        include_str!("../../posts/category-theory.md"),
    ),
    (
        "lambda-calculus.md",
        include_str!("../../posts/lambda-calculus.md"),
    ),
    (
        "functional-javascript.md",
        include_str!("../../posts/functional-javascript.md"),
    ),
    ("haskell.md", include_str!("../../posts/haskell.md")),
    ("clojure.md", include_str!("../../posts/clojure.md")),
];

/// Immutable, ordered collection of static posts
#[derive(Debug, Clone, Default)]
pub struct StaticPostStore {
    posts: Vec<Post>,
}

impl StaticPostStore {
    /// Create a store from already-built posts
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// Parse the posts bundled with the binary
    pub fn bundled(default_author: &str) -> Result<Self> {
        let posts = BUNDLED_POSTS
            .iter()
            .map(|(name, source)| {
                parse_post(name, source, default_author)
                    .with_context(|| format!("Failed to load bundled post {}", name))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Loaded {} bundled posts", posts.len());
        Ok(Self { posts })
    }

    /// All posts, in bundle order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Exact slug lookup
    pub fn get_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == slug)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Build a static post from a markdown document with front-matter
pub fn parse_post(name: &str, source: &str, default_author: &str) -> Result<Post> {
    let (fm, body) = FrontMatter::parse(source)?;

    let stem = name
        .rsplit('/')
        .next()
        .unwrap_or(name)
        .trim_end_matches(".md")
        .to_string();

    let title = fm.title.unwrap_or_else(|| stem.clone());

    // Explicit slug wins, then the title, then the file name
    let slug = fm
        .slug
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| {
            let from_title = slug::slugify(&title);
            if from_title.is_empty() {
                slug::slugify(&stem)
            } else {
                from_title
            }
        });

    let published_at = fm.date.as_deref().and_then(parse_timestamp);
    if published_at.is_none() {
        tracing::warn!("Post {} has no valid date; it will sort last", name);
    }

    let excerpt = fm
        .excerpt
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| MarkdownRenderer::plain_excerpt(body, EXCERPT_CHARS));

    let mut post = Post::new(slug, Origin::Static, title);
    post.content = body.to_string();
    post.excerpt = excerpt;
    post.author = fm
        .author
        .unwrap_or_else(|| default_author.to_string());
    post.tags = dedup_tags(fm.tags);
    post.published_at = published_at;
    post.featured_image = match fm.featured_image.as_deref().and_then(ImageRef::parse) {
        // Nothing signs keys for bundled posts, so only direct URLs are usable
        Some(ImageRef::StorageKey(key)) => {
            tracing::warn!(
                "Post {} has featured image {:?}, which is not a URL; ignoring it",
                name,
                key
            );
            None
        }
        image => image,
    };

    Ok(post)
}
