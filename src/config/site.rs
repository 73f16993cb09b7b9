//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `backend.endpoint`
pub const ENDPOINT_ENV: &str = "LAMBDA_BLOG_ENDPOINT";
/// Environment variable overriding `backend.api_key`
pub const API_KEY_ENV: &str = "LAMBDA_BLOG_API_KEY";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Sidebar
    pub related_posts: usize,

    /// Where the signed-in session is kept between runs
    pub session_file: PathBuf,

    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Lambda Blog".to_string(),
            subtitle: "Exploring the elegance of functional programming through theory and practice."
                .to_string(),
            author: "Lambda Blog".to_string(),
            language: "en".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            related_posts: 3,

            session_file: PathBuf::from(".lambda-blog/session.json"),

            highlight: HighlightConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `LAMBDA_BLOG_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(API_KEY_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, api_key: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Backend endpoint overridden from environment");
            self.backend.endpoint = endpoint;
        }
        if let Some(api_key) = api_key.filter(|v| !v.trim().is_empty()) {
            self.backend.api_key = api_key;
        }
    }
}

/// Hosted backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the hosted project, e.g. `https://abc.supabase.co`
    pub endpoint: String,
    /// Public (anon) API key sent with every request
    pub api_key: String,
    pub posts_table: String,
    pub image_bucket: String,
    /// Validity of signed image URLs, in seconds
    pub signed_url_ttl: u64,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            posts_table: "posts".to_string(),
            image_bucket: "blog-images".to_string(),
            signed_url_ttl: 3600,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// Whether a backend endpoint has been set
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Lambda Blog");
        assert_eq!(config.related_posts, 3);
        assert_eq!(config.backend.image_bucket, "blog-images");
        assert_eq!(config.backend.signed_url_ttl, 3600);
        assert!(!config.backend.is_configured());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
related_posts: 5
backend:
  endpoint: https://example.supabase.co
  api_key: anon
highlight:
  line_number: true
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.related_posts, 5);
        assert!(config.backend.is_configured());
        assert_eq!(config.backend.posts_table, "posts");
        assert!(config.highlight.line_number);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "title: From Disk\nsession_file: state/session.json\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "From Disk");
        assert_eq!(config.session_file, PathBuf::from("state/session.json"));
    }

    #[test]
    fn test_env_overrides_skip_blank_values() {
        let mut config = SiteConfig::default();
        config.apply_overrides(Some("https://env.example".to_string()), Some("  ".to_string()));
        assert_eq!(config.backend.endpoint, "https://env.example");
        assert!(config.backend.api_key.is_empty());
    }
}
