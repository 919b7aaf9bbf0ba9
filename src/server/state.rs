//! Application state shared across handlers.

use crate::catalog::Catalog;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::library::TrustedRoot;
use crate::media;
use std::sync::Arc;

/// Shared application state. Immutable once built.
#[derive(Clone)]
pub struct AppState {
    /// Feed assembly over the served directory.
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Canonicalize the configured root and prepare the media type table.
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let root = TrustedRoot::new(&config.library.root)?;
        media::init();

        tracing::info!(
            root = %root.path().display(),
            policy = ?config.library.policy(),
            "Library ready"
        );

        let catalog = Catalog::new(
            root,
            config.library.policy(),
            config.server.title.clone(),
            clock,
        );

        Ok(Self {
            catalog: Arc::new(catalog),
        })
    }

    /// Whether responses carry no-cache headers.
    pub fn no_cache(&self) -> bool {
        self.catalog.policy().no_cache
    }
}
