//! Publish a markdown file as a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::authoring::{ImageUpload, PublishRequest};
use crate::helpers::post_url;
use crate::Blog;

/// Publish `content_file`, optionally with a featured image
pub async fn run(blog: &Blog, title: &str, content_file: &Path, image: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(content_file)
        .with_context(|| format!("Failed to read {:?}", content_file))?;

    let mut request = PublishRequest::new(title, content);
    if let Some(path) = image {
        request = request.with_image(read_image(path)?);
    }

    let post = blog.publisher.publish(request).await?;
    println!("Published {}", post.title);
    println!("URL: {}", post_url(&blog.config, &post));
    Ok(())
}

fn read_image(path: &Path) -> Result<ImageUpload> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read image {:?}", path))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ImageUpload {
        content_type: content_type_for(&file_name).map(str::to_string),
        file_name,
        bytes,
    })
}

/// MIME type of common image extensions
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}
