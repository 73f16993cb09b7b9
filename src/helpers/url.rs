//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::Post;

/// Characters a URI component may carry unescaped
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/a") // -> "/blog/post/a"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Encode one URI component
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Site path of a post page
pub fn post_path(config: &SiteConfig, post: &Post) -> String {
    url_for(config, &format!("post/{}", encode_component(post.route_key())))
}

/// Absolute URL of a post page
pub fn post_url(config: &SiteConfig, post: &Post) -> String {
    full_url_for(config, &format!("post/{}", encode_component(post.route_key())))
}

/// Links for sharing a post on social sites
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub twitter: String,
    pub linkedin: String,
}

pub fn share_links(config: &SiteConfig, post: &Post) -> ShareLinks {
    let url = encode_component(&post_url(config, post));
    let title = encode_component(&post.title);

    ShareLinks {
        twitter: format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            title, url
        ),
        linkedin: format!(
            "https://www.linkedin.com/shareArticle?mini=true&url={}&title={}",
            url, title
        ),
    }
}
