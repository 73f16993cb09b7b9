//! JSON view models returned by the HTTP routes

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{MarkdownRenderer, Post};
use crate::helpers::{
    date_iso, full_date, month_label, post_path, related_posts, share_links, sidebar, ShareLinks,
    SidebarEntry,
};
use crate::posts::{Listing, MonthGroup};

#[derive(Debug, Serialize)]
pub struct SiteView {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub language: String,
}

impl SiteView {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
        }
    }
}

/// A post as shown in lists
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub tags: Vec<String>,
    pub path: String,
    /// Like "March 1, 2025"
    pub date: Option<String>,
    /// `YYYY-MM-DD`, for `<time datetime>`
    pub datetime: Option<String>,
    pub image: Option<String>,
}

impl PostSummary {
    pub fn new(config: &SiteConfig, post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            tags: post.tags.clone(),
            path: post_path(config, post),
            date: post.published_at.as_ref().map(full_date),
            datetime: post.published_at.as_ref().map(date_iso),
            image: post.image_url().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub label: String,
    pub posts: Vec<PostSummary>,
}

impl GroupView {
    fn new(config: &SiteConfig, group: &MonthGroup) -> Self {
        Self {
            label: group.label.clone(),
            posts: group
                .posts
                .iter()
                .map(|p| PostSummary::new(config, p))
                .collect(),
        }
    }
}

/// Body of `GET /`
#[derive(Debug, Serialize)]
pub struct IndexView {
    pub site: SiteView,
    /// `grouped` or `empty`
    pub state: &'static str,
    pub groups: Vec<GroupView>,
}

impl IndexView {
    pub fn new(config: &SiteConfig, listing: &Listing) -> Self {
        Self {
            site: SiteView::new(config),
            state: if listing.is_empty() { "empty" } else { "grouped" },
            groups: listing
                .groups()
                .iter()
                .map(|g| GroupView::new(config, g))
                .collect(),
        }
    }
}

/// Body of `GET /post/:param`
#[derive(Debug, Serialize)]
pub struct PostView {
    pub site: SiteView,
    #[serde(flatten)]
    pub summary: PostSummary,
    pub month: Option<String>,
    /// Rendered markdown
    pub html: String,
    pub share: ShareLinks,
    pub related: Vec<PostSummary>,
    pub sidebar: Vec<SidebarEntry>,
}

impl PostView {
    /// `all` is every post in listing order, used for the sidebar lists
    pub fn new(
        config: &SiteConfig,
        renderer: &MarkdownRenderer,
        post: &Post,
        all: &[Post],
    ) -> Self {
        Self {
            site: SiteView::new(config),
            summary: PostSummary::new(config, post),
            month: post.published_at.as_ref().map(month_label),
            html: renderer.render(&post.content),
            share: share_links(config, post),
            related: related_posts(post, all, config.related_posts)
                .into_iter()
                .map(|p| PostSummary::new(config, p))
                .collect(),
            sidebar: sidebar(config, Some(post), all),
        }
    }
}

/// Body of `GET /login`
#[derive(Debug, Serialize)]
pub struct AuthView {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub email: Option<String>,
}

/// Body of `GET /admin`
#[derive(Debug, Serialize)]
pub struct AdminView {
    pub site: SiteView,
    pub user_id: String,
    pub email: Option<String>,
    /// Where the authoring form posts to
    pub action: String,
    /// Multipart fields the form sends
    pub fields: [&'static str; 3],
}
