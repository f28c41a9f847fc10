//! Catalog module
//!
//! Dataset and column metadata, and the storage seam the binder resolves names against

mod memory;
mod models;

pub use memory::*;
pub use models::*;

use crate::error::Result;

/// System of record for dataset metadata
pub trait Catalog: Send + Sync {
    /// Look up a dataset by name (case-insensitive)
    fn get_dataset(&self, name: &str) -> Option<Dataset>;

    /// Materialize a new dataset; fails if the name is taken
    fn create_dataset(&self, descriptor: DatasetDescriptor) -> Result<Dataset>;

    /// Return the existing dataset or create it from `descriptor`.
    ///
    /// Implementations shared between threads should make the miss-then-create
    /// sequence atomic; this default is not.
    fn get_or_create_dataset(&self, descriptor: DatasetDescriptor) -> Result<Dataset> {
        match self.get_dataset(&descriptor.name) {
            Some(dataset) => Ok(dataset),
            None => self.create_dataset(descriptor),
        }
    }

    /// Names of all datasets, sorted
    fn dataset_names(&self) -> Vec<String>;
}
