//! Print a single post

use anyhow::Result;

use crate::helpers::{full_date, post_url, related_posts};
use crate::Blog;

/// Show the post a slug or identifier names
pub async fn run(blog: &Blog, key: &str, html: bool) -> Result<()> {
    let Some(post) = blog.posts.resolve(key).await? else {
        anyhow::bail!("No post found for {}", key);
    };

    println!("{}", post.title);
    if let Some(date) = &post.published_at {
        println!("{} by {}", full_date(date), post.author);
    }
    if !post.tags.is_empty() {
        println!("Tags: {}", post.tags.join(", "));
    }
    if let Some(image) = post.image_url() {
        println!("Image: {}", image);
    }
    println!("URL: {}", post_url(&blog.config, &post));
    println!();

    if html {
        println!("{}", blog.renderer().render(&post.content));
    } else {
        println!("{}", post.content);
    }

    match blog.posts.all_posts().await {
        Ok(all) => {
            let related = related_posts(&post, &all, blog.config.related_posts);
            if !related.is_empty() {
                println!();
                println!("Related:");
                for other in related {
                    println!("  {} [{}]", other.title, other.id);
                }
            }
        }
        Err(e) => tracing::warn!("Related posts unavailable: {}", e),
    }

    Ok(())
}
