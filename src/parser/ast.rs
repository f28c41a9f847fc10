//! Statement types produced by the front end
//!
//! Expressions stay as sqlparser AST until the binder resolves them.

use crate::catalog::{ColumnType, NdArrayType};
use std::fmt;
use std::path::PathBuf;

pub use sqlparser::ast::{Expr as SqlExpr, Ident, ObjectName, SelectItem};

/// Identifies a table by name, optionally qualified
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableInfo {
    pub table_name: String,
    pub schema_name: Option<String>,
    pub database_name: Option<String>,
}

impl TableInfo {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            schema_name: None,
            database_name: None,
        }
    }

    /// `db.schema.table`, `schema.table` or `table`
    pub fn from_object_name(name: &ObjectName) -> Self {
        let mut parts = name.0.iter().rev().map(|i| i.value.clone());
        Self {
            table_name: parts.next().unwrap_or_default(),
            schema_name: parts.next(),
            database_name: parts.next(),
        }
    }
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(db) = &self.database_name {
            write!(f, "{}.", db)?;
        }
        if let Some(schema) = &self.schema_name {
            write!(f, "{}.", schema)?;
        }
        write!(f, "{}", self.table_name)
    }
}

/// A table reference as written in a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub table_info: TableInfo,
}

impl TableRef {
    pub fn new(table_info: TableInfo) -> Self {
        Self { table_info }
    }

    pub fn named(table_name: impl Into<String>) -> Self {
        Self::new(TableInfo::new(table_name))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_info)
    }
}

/// Column declaration in CREATE TABLE and CREATE UDF
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub col_type: ColumnType,
    pub array_type: Option<NdArrayType>,
    pub dimensions: Vec<Option<usize>>,
    pub nullable: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            array_type: None,
            dimensions: vec![],
            nullable: true,
        }
    }

    pub fn ndarray(
        name: impl Into<String>,
        array_type: NdArrayType,
        dimensions: Vec<Option<usize>>,
    ) -> Self {
        Self {
            array_type: Some(array_type),
            dimensions,
            ..Self::new(name, ColumnType::NdArray)
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// SELECT; every clause is optional
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub from_table: Option<TableRef>,
    /// Empty when no projection was given
    pub target_list: Vec<SelectItem>,
    pub where_clause: Option<SqlExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUdfStatement {
    pub name: String,
    pub if_not_exists: bool,
    pub inputs: Vec<ColumnDefinition>,
    pub outputs: Vec<ColumnDefinition>,
    /// Implementation file, relative to the UDF directory
    pub impl_path: PathBuf,
    /// e.g. `Classification`, `ObjectDetection`
    pub udf_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: TableRef,
    /// Empty means all columns in table order
    pub column_list: Vec<String>,
    pub value_list: Vec<Vec<SqlExpr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub table_ref: TableRef,
    pub if_not_exists: bool,
    pub column_list: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadDataStatement {
    pub table: TableRef,
    pub path: PathBuf,
}

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    CreateUdf(CreateUdfStatement),
    Insert(InsertStatement),
    CreateTable(CreateTableStatement),
    LoadData(LoadDataStatement),
    /// Valid SQL with no plan conversion, kept as its SQL text
    Unsupported(String),
}

impl Statement {
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "SELECT",
            Statement::CreateUdf(_) => "CREATE UDF",
            Statement::Insert(_) => "INSERT",
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::LoadData(_) => "LOAD DATA",
            Statement::Unsupported(_) => "UNSUPPORTED",
        }
    }
}
