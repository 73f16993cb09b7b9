//! Post sources
//!
//! Static and remote posts sit behind one [`PostSource`] capability. Each
//! source declares the [`KeyScheme`] its identifiers follow, so callers can
//! skip a source that could never own a given key without asking it.

mod bundled;
mod remote;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::content::{Origin, Post};
use crate::gateway::GatewayError;

pub use bundled::BundledSource;
pub use remote::RemoteSource;

lazy_static! {
    /// RFC 4122 version 4 UUID in its 36-character textual form
    static ref UUID_V4: Regex = Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$"
    )
    .expect("UUID pattern is valid");
}

/// A source could not be queried
///
/// Distinct from "not found": the caller could not check at all.
#[derive(Debug, Error)]
#[error("could not fetch posts from {source_name}: {cause}")]
pub struct FetchError {
    pub source_name: &'static str,
    #[source]
    pub cause: GatewayError,
}

impl FetchError {
    pub fn new(source_name: &'static str, cause: GatewayError) -> Self {
        Self { source_name, cause }
    }
}

/// Shape of the identifiers a source hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// Human-readable slug; any non-empty string may match
    Slug,
    /// Backend-assigned UUID v4
    Uuid,
}

impl KeyScheme {
    /// Whether `key` could possibly name a post under this scheme
    pub fn admits(&self, key: &str) -> bool {
        match self {
            KeyScheme::Slug => !key.is_empty(),
            KeyScheme::Uuid => is_uuid_v4(key),
        }
    }
}

/// Check the textual UUID v4 format
pub fn is_uuid_v4(value: &str) -> bool {
    UUID_V4.is_match(value)
}

/// Somewhere posts can be listed and looked up
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    fn origin(&self) -> Origin;

    fn scheme(&self) -> KeyScheme;

    /// Every post this source holds, normalized
    async fn list(&self) -> Result<Vec<Post>, FetchError>;

    /// Exact lookup by identifier
    async fn get_by_key(&self, key: &str) -> Result<Option<Post>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_v4_format() {
        assert!(is_uuid_v4("123e4567-e89b-42d3-a456-426614174000"));
        assert!(is_uuid_v4("123E4567-E89B-42D3-A456-426614174000"));
        assert!(is_uuid_v4(&uuid::Uuid::new_v4().to_string()));
    }

    #[test]
    fn test_uuid_v4_rejects_other_shapes() {
        // version 1
        assert!(!is_uuid_v4("123e4567-e89b-12d3-a456-426614174000"));
        // variant nibble outside 8..b
        assert!(!is_uuid_v4("123e4567-e89b-42d3-c456-426614174000"));
        // no hyphens
        assert!(!is_uuid_v4("123e4567e89b42d3a456426614174000"));
        // trailing garbage
        assert!(!is_uuid_v4("123e4567-e89b-42d3-a456-426614174000x"));
        assert!(!is_uuid_v4("not-a-uuid"));
        assert!(!is_uuid_v4(""));
    }

    #[test]
    fn test_key_scheme_admits() {
        assert!(KeyScheme::Slug.admits("not-a-uuid"));
        assert!(!KeyScheme::Slug.admits(""));
        assert!(!KeyScheme::Uuid.admits("not-a-uuid"));
        assert!(KeyScheme::Uuid.admits("123e4567-e89b-42d3-a456-426614174000"));
    }
}
