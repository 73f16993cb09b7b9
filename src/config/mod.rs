//! Configuration module

mod site;

pub use site::BackendConfig;
pub use site::HighlightConfig;
pub use site::SiteConfig;
pub use site::{API_KEY_ENV, ENDPOINT_ENV};
