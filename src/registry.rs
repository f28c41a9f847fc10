//! Named factories and host capabilities

use crate::error::{QueryError, Result};
use std::collections::HashMap;
use std::fmt;

/// Name to constructor registry; lookups ignore case
#[derive(Clone)]
pub struct FactoryRegistry<T> {
    factories: HashMap<String, fn() -> T>,
}

impl<T> Default for FactoryRegistry<T> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<T> fmt::Debug for FactoryRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl<T> FactoryRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, returning the factory it replaced
    pub fn register(&mut self, name: &str, factory: fn() -> T) -> Option<fn() -> T> {
        self.factories.insert(name.to_lowercase(), factory)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    pub fn create(&self, name: &str) -> Result<T> {
        self.factories
            .get(&name.to_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| QueryError::InvalidArgument(format!("Unknown name: {}", name)))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Data source driver used to execute a LOAD DATA plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderKind {
    pub name: &'static str,
    /// Reads frames out of a video container
    pub decodes_video: bool,
}

fn video_loader() -> LoaderKind {
    LoaderKind {
        name: "video",
        decodes_video: true,
    }
}

fn csv_loader() -> LoaderKind {
    LoaderKind {
        name: "csv",
        decodes_video: false,
    }
}

/// Registry holding the `video` and `csv` loaders
pub fn default_loader_registry() -> FactoryRegistry<LoaderKind> {
    let mut registry = FactoryRegistry::new();
    registry.register("video", video_loader);
    registry.register("csv", csv_loader);
    registry
}

/// What the host can do, supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub gpu_available: bool,
}

impl Capabilities {
    pub fn with_gpu(mut self, gpu_available: bool) -> Self {
        self.gpu_available = gpu_available;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_loaders() {
        let registry = default_loader_registry();
        assert_eq!(registry.names(), vec!["csv", "video"]);
        assert!(registry.create("VIDEO").unwrap().decodes_video);
        assert!(!registry.create("csv").unwrap().decodes_video);
    }

    #[test]
    fn test_unknown_name() {
        let registry = default_loader_registry();
        let err = registry.create("parquet").unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry: FactoryRegistry<u32> = FactoryRegistry::new();
        assert!(registry.register("answer", || 41).is_none());
        assert!(registry.register("Answer", || 42).is_some());
        assert_eq!(registry.create("answer").unwrap(), 42);
        assert!(registry.contains("ANSWER"));
    }

    #[test]
    fn test_capabilities_default_off() {
        assert!(!Capabilities::default().gpu_available);
        assert!(Capabilities::default().with_gpu(true).gpu_available);
    }
}
