//! Name resolution scope for the table a statement reads

use crate::catalog::{Column, Dataset};
use crate::error::{QueryError, Result};
use std::collections::HashMap;
use tracing::warn;

/// Lower-cased column name to catalog column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: HashMap<String, Column>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from columns; on a name collision the later column wins
    pub fn from_columns<'a>(columns: impl IntoIterator<Item = &'a Column>) -> Self {
        let mut map = Self::new();
        for column in columns {
            map.insert(column.clone());
        }
        map
    }

    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self::from_columns(&dataset.columns)
    }

    /// Insert a column, returning the one it replaced
    pub fn insert(&mut self, column: Column) -> Option<Column> {
        let key = column.name.to_lowercase();
        let previous = self.columns.insert(key, column);
        if let Some(prev) = &previous {
            warn!(column = %prev.name, "duplicate column name, keeping the later column");
        }
        previous
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(&name.to_lowercase())
    }

    pub fn resolve(&self, name: &str) -> Result<Column> {
        self.get(name)
            .cloned()
            .ok_or_else(|| QueryError::ColumnNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Columns sorted by their ordinal position in the dataset
    pub fn columns_in_order(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.values().collect();
        columns.sort_by_key(|c| c.index);
        columns
    }
}
