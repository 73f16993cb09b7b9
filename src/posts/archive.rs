//! Month-grouped archive of posts

use chrono::Datelike;
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;

use crate::content::Post;
use crate::helpers::month_label;

/// Heading of the group holding posts without a usable date
pub const UNDATED_LABEL: &str = "Undated";

/// Posts published in one calendar month
#[derive(Debug, Clone, Serialize)]
pub struct MonthGroup {
    /// Display heading, like "March 2025"
    pub label: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub posts: Vec<Post>,
}

/// Result of listing every source
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "groups", rename_all = "lowercase")]
pub enum Listing {
    /// No source holds any post
    Empty,
    /// Newest month first
    Grouped(Vec<MonthGroup>),
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        matches!(self, Listing::Empty)
    }

    pub fn groups(&self) -> &[MonthGroup] {
        match self {
            Listing::Empty => &[],
            Listing::Grouped(groups) => groups,
        }
    }

    /// Posts in listing order
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.groups().iter().flat_map(|g| g.posts.iter())
    }
}

/// Newest first; undated posts after every dated one
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort posts and split them into month groups
pub fn group_by_month(mut posts: Vec<Post>) -> Listing {
    if posts.is_empty() {
        return Listing::Empty;
    }

    // Stable, so equal dates keep source order
    posts.sort_by(newest_first);

    let mut groups: IndexMap<Option<(i32, u32)>, MonthGroup> = IndexMap::new();
    for post in posts {
        let key = post.published_at.map(|d| (d.year(), d.month()));
        let group = groups.entry(key).or_insert_with(|| MonthGroup {
            label: post
                .published_at
                .as_ref()
                .map(month_label)
                .unwrap_or_else(|| UNDATED_LABEL.to_string()),
            year: key.map(|(y, _)| y),
            month: key.map(|(_, m)| m),
            posts: Vec::new(),
        });
        group.posts.push(post);
    }

    Listing::Grouped(groups.into_values().collect())
}
