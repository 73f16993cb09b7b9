//! lambda-blog: a functional-programming blog served from bundled and hosted posts
//!
//! Posts come from markdown bundled into the binary and from a hosted
//! backend (posts table, image storage, password sign-in). The server lists
//! them by month, renders single posts with syntax highlighting, and lets a
//! signed-in author publish new posts.

pub mod auth;
pub mod authoring;
pub mod commands;
pub mod config;
pub mod content;
pub mod gateway;
pub mod helpers;
pub mod posts;
pub mod server;
pub mod source;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use auth::AuthGuard;
use authoring::Publisher;
use config::SiteConfig;
use content::{MarkdownRenderer, StaticPostStore};
use gateway::{Offline, PostGateway, RestBackend, SessionProvider};
use posts::PostService;
use source::{BundledSource, PostSource, RemoteSource};

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Every post source, bundled first
    pub posts: PostService,
    pub guard: Arc<AuthGuard>,
    pub publisher: Arc<Publisher>,
}

impl Blog {
    /// Create a blog from a directory holding an optional `_config.yml`
    pub async fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            SiteConfig::load(&config_path)?
        } else {
            SiteConfig::default()
        };
        config.apply_env();

        let (gateway, sessions): (Arc<dyn PostGateway>, Arc<dyn SessionProvider>) =
            if config.backend.is_configured() {
                let session_file = base_dir.join(&config.session_file);
                let backend = Arc::new(RestBackend::new(&config.backend, Some(session_file))?);
                tracing::debug!("Using backend at {}", config.backend.endpoint);
                (backend.clone(), backend)
            } else {
                tracing::info!("No backend endpoint configured, running offline");
                (Arc::new(Offline), Arc::new(Offline))
            };

        Self::with_backend(config, base_dir, gateway, sessions).await
    }

    /// Assemble the blog around explicit backend collaborators
    pub async fn with_backend(
        config: SiteConfig,
        base_dir: PathBuf,
        gateway: Arc<dyn PostGateway>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self> {
        let store = Arc::new(StaticPostStore::bundled(&config.author)?);

        let mut sources: Vec<Arc<dyn PostSource>> = vec![Arc::new(BundledSource::new(store))];
        if config.backend.is_configured() {
            sources.push(Arc::new(RemoteSource::new(
                gateway.clone(),
                &config.author,
                config.backend.signed_url_ttl,
            )));
        }

        let guard = Arc::new(AuthGuard::start(sessions).await);
        let publisher = Arc::new(Publisher::new(gateway, guard.clone(), &config));

        Ok(Self {
            posts: PostService::new(sources),
            config,
            base_dir,
            guard,
            publisher,
        })
    }

    /// Markdown renderer using the configured highlighting
    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_options(
            &self.config.highlight.theme,
            self.config.highlight.line_number,
        )
    }
}
