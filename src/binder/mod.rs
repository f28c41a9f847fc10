//! Binder module
//!
//! Resolves statement fragments against the catalog: table names to
//! datasets, identifiers to columns, column declarations to catalog records.

mod expr;

pub use expr::ExprBinder;

use crate::catalog::{Catalog, Column, ColumnType, Dataset, DatasetDescriptor, NdArrayType, UdfIo};
use crate::error::{QueryError, Result};
use crate::parser::{ColumnDefinition, SelectItem, SqlExpr, TableInfo};
use crate::planner::{ColumnMap, Expr};
use std::collections::HashSet;
use tracing::{debug, info};

/// Binding operations the statement converter depends on
pub trait PlanBinder {
    /// Look up the dataset a table reference names; `None` if it does not exist
    fn bind_dataset(&self, table_info: &TableInfo) -> Result<Option<Dataset>>;

    fn bind_predicate_expr(&self, expr: &SqlExpr, column_map: &ColumnMap) -> Result<Expr>;

    fn bind_columns_expr(
        &self,
        target_list: &[SelectItem],
        column_map: &ColumnMap,
    ) -> Result<Vec<Expr>>;

    /// Bind VALUES rows; identifiers are not allowed
    fn bind_value_exprs(&self, rows: &[Vec<SqlExpr>]) -> Result<Vec<Vec<Expr>>>;

    fn column_definition_to_udf_io(
        &self,
        columns: &[ColumnDefinition],
        is_input: bool,
    ) -> Result<Vec<UdfIo>>;

    fn column_definition_to_columns(&self, columns: &[ColumnDefinition]) -> Result<Vec<Column>>;

    /// Register a new video table `table_name` with the standard video columns
    fn create_video_metadata(&self, table_name: &str) -> Result<Dataset>;
}

/// Name of the frame id column of a video table
pub const VIDEO_ID_COLUMN: &str = "id";
/// Name of the frame data column of a video table
pub const VIDEO_DATA_COLUMN: &str = "data";

/// Columns every video table is created with
pub fn video_columns() -> Vec<Column> {
    vec![
        Column::new(VIDEO_ID_COLUMN, ColumnType::Integer).with_nullable(false),
        Column::new(VIDEO_DATA_COLUMN, ColumnType::NdArray)
            .with_array_type(NdArrayType::UInt8)
            .with_dimensions(vec![None, None, None]),
    ]
}

/// [`PlanBinder`] backed by a [`Catalog`]
pub struct CatalogBinder<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> CatalogBinder<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }
}

fn validate_definition(def: &ColumnDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(QueryError::Bind("Column name must not be empty".to_string()));
    }
    match (def.col_type, def.array_type) {
        (ColumnType::NdArray, None) => Err(QueryError::Bind(format!(
            "NDARRAY column {} needs an element type",
            def.name
        ))),
        (ColumnType::NdArray, Some(_)) => Ok(()),
        (_, Some(_)) => Err(QueryError::Bind(format!(
            "Column {} is not an NDARRAY but has an element type",
            def.name
        ))),
        (_, None) if !def.dimensions.is_empty() => Err(QueryError::Bind(format!(
            "Column {} is not an NDARRAY but has dimensions",
            def.name
        ))),
        _ => Ok(()),
    }
}

impl<'a> PlanBinder for CatalogBinder<'a> {
    fn bind_dataset(&self, table_info: &TableInfo) -> Result<Option<Dataset>> {
        let dataset = self.catalog.get_dataset(&table_info.table_name);
        debug!(table = %table_info, found = dataset.is_some(), "bind dataset");
        Ok(dataset)
    }

    fn bind_predicate_expr(&self, expr: &SqlExpr, column_map: &ColumnMap) -> Result<Expr> {
        let predicate = ExprBinder::new(column_map).bind_expr(expr)?;
        // UDF results and NULL have no static type and pass through
        match predicate.data_type() {
            Some(data_type) if data_type != ColumnType::Boolean => Err(QueryError::Bind(format!(
                "WHERE predicate {} is {}, not BOOLEAN",
                predicate, data_type
            ))),
            _ => Ok(predicate),
        }
    }

    fn bind_columns_expr(
        &self,
        target_list: &[SelectItem],
        column_map: &ColumnMap,
    ) -> Result<Vec<Expr>> {
        ExprBinder::new(column_map).bind_select_items(target_list)
    }

    fn bind_value_exprs(&self, rows: &[Vec<SqlExpr>]) -> Result<Vec<Vec<Expr>>> {
        let binder = ExprBinder::constants();
        rows.iter()
            .map(|row| row.iter().map(|e| binder.bind_expr(e)).collect::<Result<Vec<_>>>())
            .collect()
    }

    fn column_definition_to_udf_io(
        &self,
        columns: &[ColumnDefinition],
        is_input: bool,
    ) -> Result<Vec<UdfIo>> {
        columns
            .iter()
            .map(|def| {
                validate_definition(def)?;
                Ok(UdfIo {
                    name: def.name.clone(),
                    col_type: def.col_type,
                    array_type: def.array_type,
                    dimensions: def.dimensions.clone(),
                    is_input,
                })
            })
            .collect()
    }

    fn column_definition_to_columns(&self, columns: &[ColumnDefinition]) -> Result<Vec<Column>> {
        let mut seen = HashSet::new();
        columns
            .iter()
            .enumerate()
            .map(|(index, def)| {
                validate_definition(def)?;
                if !seen.insert(def.name.to_lowercase()) {
                    return Err(QueryError::Bind(format!(
                        "Duplicate column name: {}",
                        def.name
                    )));
                }
                let mut column = Column::new(def.name.clone(), def.col_type)
                    .with_dimensions(def.dimensions.clone())
                    .with_nullable(def.nullable)
                    .with_index(index);
                column.array_type = def.array_type;
                Ok(column)
            })
            .collect()
    }

    fn create_video_metadata(&self, table_name: &str) -> Result<Dataset> {
        let descriptor = DatasetDescriptor::new(table_name, video_columns()).with_video(true);
        let dataset = self
            .catalog
            .get_or_create_dataset(descriptor)
            .map_err(|e| match e {
                QueryError::CatalogCreation(_) => e,
                other => QueryError::CatalogCreation(other.to_string()),
            })?;
        info!(table = %table_name, dataset_id = dataset.id, "created video metadata");
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[test]
    fn test_bind_dataset() {
        let catalog = InMemoryCatalog::new();
        catalog
            .create_dataset(DatasetDescriptor::new("MyVideo", video_columns()))
            .unwrap();
        let binder = CatalogBinder::new(&catalog);

        let found = binder.bind_dataset(&TableInfo::new("myvideo")).unwrap();
        assert_eq!(found.map(|d| d.name), Some("MyVideo".to_string()));
        assert!(binder.bind_dataset(&TableInfo::new("other")).unwrap().is_none());
    }

    #[test]
    fn test_predicate_must_be_boolean() {
        let map = ColumnMap::from_columns(&video_columns());
        let catalog = InMemoryCatalog::new();
        let binder = CatalogBinder::new(&catalog);
        let predicate = |sql: &str| match crate::parser::parse_sql(sql).unwrap() {
            crate::parser::Statement::Select(select) => select.where_clause.unwrap(),
            other => panic!("expected SELECT, got {:?}", other),
        };

        let err = binder
            .bind_predicate_expr(&predicate("SELECT id FROM t WHERE id + 1"), &map)
            .unwrap_err();
        assert!(matches!(err, QueryError::Bind(msg) if msg.contains("INTEGER")));

        assert!(binder
            .bind_predicate_expr(&predicate("SELECT id FROM t WHERE id BETWEEN 1 AND 3"), &map)
            .is_ok());
        assert!(binder
            .bind_predicate_expr(&predicate("SELECT id FROM t WHERE IsCar(data)"), &map)
            .is_ok());
    }

    #[test]
    fn test_create_video_metadata() {
        let catalog = InMemoryCatalog::new();
        let binder = CatalogBinder::new(&catalog);

        let dataset = binder.create_video_metadata("Traffic").unwrap();
        assert!(dataset.is_video);
        assert_eq!(dataset.file_url, "Traffic");
        assert_eq!(dataset.identifier_column, VIDEO_ID_COLUMN);
        assert_eq!(dataset.column_names(), vec!["id", "data"]);
        assert_eq!(dataset.columns[1].array_type, Some(NdArrayType::UInt8));
        assert_eq!(dataset.columns[1].dimensions, vec![None, None, None]);
        assert!(catalog.get_dataset("traffic").is_some());
    }

    #[test]
    fn test_udf_io_flags() {
        let catalog = InMemoryCatalog::new();
        let binder = CatalogBinder::new(&catalog);
        let defs = vec![
            ColumnDefinition::ndarray("frame", NdArrayType::UInt8, vec![None, None, Some(3)]),
            ColumnDefinition::new("score", ColumnType::Float),
        ];

        let inputs = binder.column_definition_to_udf_io(&defs, true).unwrap();
        let outputs = binder.column_definition_to_udf_io(&defs, false).unwrap();
        assert!(inputs.iter().all(|io| io.is_input));
        assert!(outputs.iter().all(|io| !io.is_input));
        assert_eq!(inputs[0].to_string(), "frame NDARRAY UINT8(ANYDIM, ANYDIM, 3)");
    }

    #[test]
    fn test_columns_from_definitions() {
        let catalog = InMemoryCatalog::new();
        let binder = CatalogBinder::new(&catalog);
        let defs = vec![
            ColumnDefinition::new("id", ColumnType::Integer).with_nullable(false),
            ColumnDefinition::new("label", ColumnType::Text),
        ];

        let columns = binder.column_definition_to_columns(&defs).unwrap();
        assert_eq!(columns[1].index, 1);
        assert!(!columns[0].is_nullable);
        assert!(columns[1].is_nullable);
    }

    #[test]
    fn test_duplicate_column_definitions() {
        let catalog = InMemoryCatalog::new();
        let binder = CatalogBinder::new(&catalog);
        let defs = vec![
            ColumnDefinition::new("label", ColumnType::Text),
            ColumnDefinition::new("LABEL", ColumnType::Integer),
        ];

        let err = binder.column_definition_to_columns(&defs).unwrap_err();
        assert!(matches!(err, QueryError::Bind(_)));
    }

    #[test]
    fn test_ndarray_requires_element_type() {
        let catalog = InMemoryCatalog::new();
        let binder = CatalogBinder::new(&catalog);
        let defs = vec![ColumnDefinition::new("frame", ColumnType::NdArray)];

        assert!(binder.column_definition_to_udf_io(&defs, true).is_err());
    }
}
