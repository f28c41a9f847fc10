//! Planner configuration

use crate::catalog::InMemoryCatalog;
use crate::error::Result;
use crate::registry::{default_loader_registry, Capabilities, FactoryRegistry, LoaderKind};
use std::path::{Path, PathBuf};

/// Configuration for a planning session
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Host capabilities, e.g. whether UDFs may run on a GPU
    pub capabilities: Capabilities,
    /// JSON catalog to start from
    pub catalog_path: Option<PathBuf>,
    /// Loaders available to LOAD DATA
    pub loader_registry: FactoryRegistry<LoaderKind>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            catalog_path: None,
            loader_registry: default_loader_registry(),
        }
    }
}

impl PlannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_catalog_path(mut self, path: impl AsRef<Path>) -> Self {
        self.catalog_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_loader_registry(mut self, registry: FactoryRegistry<LoaderKind>) -> Self {
        self.loader_registry = registry;
        self
    }

    /// Load the configured catalog file, or start empty
    pub fn load_catalog(&self) -> Result<InMemoryCatalog> {
        match &self.catalog_path {
            Some(path) => InMemoryCatalog::from_path(path),
            None => Ok(InMemoryCatalog::new()),
        }
    }
}
