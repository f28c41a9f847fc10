//! In-memory catalog

use super::{Catalog, Column, Dataset, DatasetDescriptor};
use crate::error::{QueryError, Result};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// On-disk layout accepted by [`InMemoryCatalog::from_json`]
#[derive(Debug, Deserialize)]
struct CatalogFile {
    datasets: Vec<DatasetDescriptor>,
}

/// Simple in-memory catalog, safe for concurrent use
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    /// Keyed by lower-cased dataset name
    datasets: RwLock<HashMap<String, Dataset>>,
    next_dataset_id: AtomicU64,
    next_column_id: AtomicU64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a JSON document of the form `{"datasets": [...]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let catalog = Self::new();
        for descriptor in file.datasets {
            catalog.create_dataset(descriptor)?;
        }
        Ok(catalog)
    }

    /// Load a JSON catalog file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Register a plain table with the given columns
    pub fn register_dataset(&self, name: &str, columns: Vec<Column>) -> Result<Dataset> {
        self.create_dataset(DatasetDescriptor::new(name, columns))
    }

    pub fn len(&self) -> usize {
        self.datasets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.read().is_empty()
    }

    /// Assign dataset and column ids and ordinal positions. A missing file
    /// url falls back to the dataset name.
    fn materialize(&self, descriptor: DatasetDescriptor) -> Dataset {
        let id = self.next_dataset_id.fetch_add(1, Ordering::Relaxed) + 1;
        let columns = descriptor
            .columns
            .into_iter()
            .enumerate()
            .map(|(index, mut column)| {
                column.id = self.next_column_id.fetch_add(1, Ordering::Relaxed) + 1;
                column.index = index;
                column.dataset_id = Some(id);
                column
            })
            .collect();

        let file_url = if descriptor.file_url.is_empty() {
            descriptor.name.clone()
        } else {
            descriptor.file_url
        };

        Dataset {
            id,
            name: descriptor.name,
            file_url,
            identifier_column: descriptor.identifier_column,
            is_video: descriptor.is_video,
            columns,
        }
    }

    fn insert_locked(
        &self,
        datasets: &mut HashMap<String, Dataset>,
        descriptor: DatasetDescriptor,
    ) -> Dataset {
        let key = descriptor.name.to_lowercase();
        let dataset = self.materialize(descriptor);
        info!(dataset = %dataset.name, id = dataset.id, "created dataset");
        datasets.insert(key, dataset.clone());
        dataset
    }
}

impl Catalog for InMemoryCatalog {
    fn get_dataset(&self, name: &str) -> Option<Dataset> {
        self.datasets.read().get(&name.to_lowercase()).cloned()
    }

    fn create_dataset(&self, descriptor: DatasetDescriptor) -> Result<Dataset> {
        if descriptor.name.is_empty() {
            return Err(QueryError::CatalogCreation(
                "dataset name must not be empty".to_string(),
            ));
        }

        let mut datasets = self.datasets.write();
        if datasets.contains_key(&descriptor.name.to_lowercase()) {
            return Err(QueryError::CatalogCreation(format!(
                "dataset already exists: {}",
                descriptor.name
            )));
        }
        Ok(self.insert_locked(&mut datasets, descriptor))
    }

    fn get_or_create_dataset(&self, descriptor: DatasetDescriptor) -> Result<Dataset> {
        if descriptor.name.is_empty() {
            return Err(QueryError::CatalogCreation(
                "dataset name must not be empty".to_string(),
            ));
        }

        // Lookup and creation happen under one write lock so racing loads
        // of the same new table create a single dataset.
        let mut datasets = self.datasets.write();
        if let Some(existing) = datasets.get(&descriptor.name.to_lowercase()) {
            return Ok(existing.clone());
        }
        Ok(self.insert_locked(&mut datasets, descriptor))
    }

    fn dataset_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .datasets
            .read()
            .values()
            .map(|d| d.name.clone())
            .collect();
        names.sort();
        names
    }
}
