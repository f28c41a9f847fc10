//! Catalog metadata records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Text,
    NdArray,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Float => write!(f, "FLOAT"),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::NdArray => write!(f, "NDARRAY"),
        }
    }
}

/// Element type of an NDARRAY column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NdArrayType {
    Int8,
    UInt8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Unicode,
    Bool,
    Decimal,
}

impl NdArrayType {
    /// Parse an element type name as written in DDL (`UINT8`, `FLOAT32`, `STR`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INT8" => Some(NdArrayType::Int8),
            "UINT8" => Some(NdArrayType::UInt8),
            "INT16" => Some(NdArrayType::Int16),
            "INT32" => Some(NdArrayType::Int32),
            "INT64" => Some(NdArrayType::Int64),
            "FLOAT32" => Some(NdArrayType::Float32),
            "FLOAT64" => Some(NdArrayType::Float64),
            "UNICODE" | "STR" => Some(NdArrayType::Unicode),
            "BOOL" => Some(NdArrayType::Bool),
            "DECIMAL" => Some(NdArrayType::Decimal),
            _ => None,
        }
    }
}

impl fmt::Display for NdArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NdArrayType::Int8 => write!(f, "INT8"),
            NdArrayType::UInt8 => write!(f, "UINT8"),
            NdArrayType::Int16 => write!(f, "INT16"),
            NdArrayType::Int32 => write!(f, "INT32"),
            NdArrayType::Int64 => write!(f, "INT64"),
            NdArrayType::Float32 => write!(f, "FLOAT32"),
            NdArrayType::Float64 => write!(f, "FLOAT64"),
            NdArrayType::Unicode => write!(f, "UNICODE"),
            NdArrayType::Bool => write!(f, "BOOL"),
            NdArrayType::Decimal => write!(f, "DECIMAL"),
        }
    }
}

/// Writes a type the way it is declared, e.g. `NDARRAY UINT8(ANYDIM, ANYDIM, 3)`
pub(crate) fn fmt_type(
    f: &mut fmt::Formatter<'_>,
    col_type: ColumnType,
    array_type: Option<NdArrayType>,
    dimensions: &[Option<usize>],
) -> fmt::Result {
    write!(f, "{}", col_type)?;
    if let Some(array_type) = array_type {
        write!(f, " {}", array_type)?;
    }
    if !dimensions.is_empty() {
        let dims: Vec<String> = dimensions
            .iter()
            .map(|d| match d {
                Some(n) => n.to_string(),
                None => "ANYDIM".to_string(),
            })
            .collect();
        write!(f, "({})", dims.join(", "))?;
    }
    Ok(())
}

/// A column of a catalog dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub col_type: ColumnType,
    #[serde(default)]
    pub array_type: Option<NdArrayType>,
    /// Array dimensions, `None` for an unbounded dimension
    #[serde(default)]
    pub dimensions: Vec<Option<usize>>,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    /// Ordinal position within the owning dataset
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub dataset_id: Option<u64>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            id: 0,
            name: name.into(),
            col_type,
            array_type: None,
            dimensions: vec![],
            is_nullable: true,
            index: 0,
            dataset_id: None,
        }
    }

    pub fn with_array_type(mut self, array_type: NdArrayType) -> Self {
        self.array_type = Some(array_type);
        self
    }

    pub fn with_dimensions(mut self, dimensions: Vec<Option<usize>>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.name)?;
        fmt_type(f, self.col_type, self.array_type, &self.dimensions)
    }
}

/// Catalog-resident description of a table or video source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: u64,
    pub name: String,
    pub file_url: String,
    pub identifier_column: String,
    pub is_video: bool,
    pub columns: Vec<Column>,
}

impl Dataset {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Everything needed to materialize a new dataset; ids are assigned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default = "default_identifier_column")]
    pub identifier_column: String,
    #[serde(default)]
    pub is_video: bool,
    pub columns: Vec<Column>,
}

fn default_identifier_column() -> String {
    "id".to_string()
}

impl DatasetDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let name = name.into();
        Self {
            file_url: name.clone(),
            name,
            identifier_column: default_identifier_column(),
            is_video: false,
            columns,
        }
    }

    pub fn with_video(mut self, is_video: bool) -> Self {
        self.is_video = is_video;
        self
    }
}

/// UDF input or output descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdfIo {
    pub name: String,
    pub col_type: ColumnType,
    pub array_type: Option<NdArrayType>,
    pub dimensions: Vec<Option<usize>>,
    pub is_input: bool,
}

impl fmt::Display for UdfIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.name)?;
        fmt_type(f, self.col_type, self.array_type, &self.dimensions)
    }
}
