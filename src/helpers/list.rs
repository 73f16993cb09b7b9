//! List helpers for the post sidebar

use serde::Serialize;

use super::date::short_date;
use super::url::post_path;
use crate::config::SiteConfig;
use crate::content::Post;
use crate::posts::newest_first;

/// Posts to suggest next to `current`
///
/// Posts sharing the most tags come first; free slots are filled with the
/// most recent posts not already chosen.
pub fn related_posts<'a>(current: &Post, all: &'a [Post], limit: usize) -> Vec<&'a Post> {
    let mut others: Vec<&Post> = all.iter().filter(|p| p.key() != current.key()).collect();
    others.sort_by(|a, b| newest_first(a, b));

    let mut scored: Vec<(usize, &Post)> = others
        .iter()
        .map(|p| (p.shared_tags(&current.tags), *p))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut related: Vec<&Post> = scored.into_iter().map(|(_, p)| p).take(limit).collect();

    for post in others {
        if related.len() >= limit {
            break;
        }
        if !related.iter().any(|r| r.key() == post.key()) {
            related.push(post);
        }
    }

    related
}

/// One line of the "all posts" sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub title: String,
    pub path: String,
    pub date: Option<String>,
    /// The post being viewed
    pub current: bool,
}

/// Every post, in the order given, marking the one being viewed
pub fn sidebar(config: &SiteConfig, current: Option<&Post>, posts: &[Post]) -> Vec<SidebarEntry> {
    posts
        .iter()
        .map(|post| SidebarEntry {
            title: post.title.clone(),
            path: post_path(config, post),
            date: post.published_at.as_ref().map(short_date),
            current: current.is_some_and(|c| c.key() == post.key()),
        })
        .collect()
}
