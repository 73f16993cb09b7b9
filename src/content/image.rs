//! Featured image references

use serde::{Deserialize, Serialize};

/// A featured image, either viewable as-is or waiting to be signed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageRef {
    /// Absolute URL that can be displayed directly
    Direct(String),
    /// Object key in the image bucket; needs a signed URL before display
    StorageKey(String),
}

impl ImageRef {
    /// Classify a stored image reference
    ///
    /// Blank values mean "no image".
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(Self::Direct(value.to_string()))
        } else {
            Some(Self::StorageKey(value.trim_start_matches('/').to_string()))
        }
    }

    pub fn direct_url(&self) -> Option<&str> {
        match self {
            Self::Direct(url) => Some(url),
            Self::StorageKey(_) => None,
        }
    }

    pub fn storage_key(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::StorageKey(key) => Some(key),
        }
    }
}
