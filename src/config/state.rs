// Application state module
// Shared, read-only state built once at startup

use std::path::Path;

use super::types::Config;
use crate::page::PageStore;
use crate::render::Renderer;

/// Application state
///
/// Shared by every connection behind an `Arc`; nothing in it is mutated after
/// startup.
pub struct AppState {
    pub config: Config,
    pub store: PageStore,
    pub renderer: Renderer,
}

impl AppState {
    pub const fn new(config: Config, store: PageStore, renderer: Renderer) -> Self {
        Self {
            config,
            store,
            renderer,
        }
    }

    /// Build state from configuration: load templates and open the page store
    pub fn from_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let renderer = Renderer::load(Path::new(&config.templates.dir))?;
        let store = PageStore::open(&config.storage.data_dir, &config.storage.extension)?;
        Ok(Self::new(config, store, renderer))
    }
}
