//! List blog content

use anyhow::Result;
use std::collections::HashMap;

use crate::posts::Listing;
use crate::Blog;

/// List posts or tags
pub async fn run(blog: &Blog, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            let listing = blog.posts.list_posts().await?;
            print!("{}", format_listing(&listing));
        }
        "tag" | "tags" => {
            let posts = blog.posts.all_posts().await?;
            let mut tags: HashMap<String, usize> = HashMap::new();
            for post in &posts {
                for tag in &post.tags {
                    *tags.entry(tag.clone()).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}

/// Month headings followed by one line per post
pub fn format_listing(listing: &Listing) -> String {
    let groups = listing.groups();
    if groups.is_empty() {
        return "No posts yet.\n".to_string();
    }

    let total: usize = groups.iter().map(|g| g.posts.len()).sum();
    let mut out = format!("Posts ({}):\n", total);
    for group in groups {
        out.push_str(&format!("{}\n", group.label));
        for post in &group.posts {
            let date = post
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "----------".to_string());
            out.push_str(&format!("  {} - {} [{}]\n", date, post.title, post.id));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Origin, Post};
    use crate::helpers::parse_timestamp;
    use crate::posts::group_by_month;

    #[test]
    fn test_format_listing() {
        let mut a = Post::new("a", Origin::Static, "A");
        a.published_at = parse_timestamp("2025-02-20");
        let b = Post::new("b", Origin::Static, "B");

        let out = format_listing(&group_by_month(vec![b, a]));
        assert_eq!(
            out,
            "Posts (2):\nFebruary 2025\n  2025-02-20 - A [a]\nUndated\n  ---------- - B [b]\n"
        );
    }

    #[test]
    fn test_format_empty_listing() {
        assert_eq!(format_listing(&Listing::Empty), "No posts yet.\n");
    }
}
