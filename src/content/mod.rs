//! Content module - posts, front-matter, markdown and the static store

mod frontmatter;
mod image;
mod markdown;
mod post;
pub mod store;

pub use frontmatter::FrontMatter;
pub use image::ImageRef;
pub use markdown::MarkdownRenderer;
pub use post::{dedup_tags, Origin, Post};
pub use store::StaticPostStore;
