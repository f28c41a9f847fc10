//! Logical plan types
//!
//! A plan is a tree of operators. Children are appended in order and never
//! reordered; the root of a SELECT plan is the outermost operator.

use crate::catalog::{Column, Dataset, UdfIo};
use crate::parser::TableRef;
use crate::planner::Expr;
use std::fmt;
use std::path::{Path, PathBuf};

/// Operator kind of a plan node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorType {
    Get,
    Filter,
    Project,
    Insert,
    CreateTable,
    CreateUdf,
    LoadData,
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorType::Get => write!(f, "Get"),
            OperatorType::Filter => write!(f, "Filter"),
            OperatorType::Project => write!(f, "Project"),
            OperatorType::Insert => write!(f, "Insert"),
            OperatorType::CreateTable => write!(f, "CreateTable"),
            OperatorType::CreateUdf => write!(f, "CreateUdf"),
            OperatorType::LoadData => write!(f, "LoadData"),
        }
    }
}

/// Operator-specific payload of a plan node
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalOperator {
    /// Read a dataset
    Get(GetNode),
    /// WHERE clause
    Filter(FilterNode),
    /// SELECT list
    Project(ProjectNode),
    Insert(InsertNode),
    CreateTable(CreateTableNode),
    CreateUdf(CreateUdfNode),
    LoadData(LoadDataNode),
}

impl LogicalOperator {
    pub fn operator_type(&self) -> OperatorType {
        match self {
            LogicalOperator::Get(_) => OperatorType::Get,
            LogicalOperator::Filter(_) => OperatorType::Filter,
            LogicalOperator::Project(_) => OperatorType::Project,
            LogicalOperator::Insert(_) => OperatorType::Insert,
            LogicalOperator::CreateTable(_) => OperatorType::CreateTable,
            LogicalOperator::CreateUdf(_) => OperatorType::CreateUdf,
            LogicalOperator::LoadData(_) => OperatorType::LoadData,
        }
    }
}

/// Logical plan node
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalPlan {
    operator: LogicalOperator,
    children: Vec<LogicalPlan>,
}

impl LogicalPlan {
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            operator,
            children: vec![],
        }
    }

    pub fn get(node: GetNode) -> Self {
        Self::new(LogicalOperator::Get(node))
    }

    pub fn filter(node: FilterNode) -> Self {
        Self::new(LogicalOperator::Filter(node))
    }

    pub fn project(node: ProjectNode) -> Self {
        Self::new(LogicalOperator::Project(node))
    }

    pub fn operator(&self) -> &LogicalOperator {
        &self.operator
    }

    pub fn operator_type(&self) -> OperatorType {
        self.operator.operator_type()
    }

    /// Get child plans, in insertion order
    pub fn children(&self) -> &[LogicalPlan] {
        &self.children
    }

    pub fn append_child(&mut self, child: LogicalPlan) {
        self.children.push(child);
    }

    pub fn with_child(mut self, child: LogicalPlan) -> Self {
        self.append_child(child);
        self
    }

    /// Whether any Filter or Project in the tree calls a function
    pub fn invokes_function(&self) -> bool {
        let here = match &self.operator {
            LogicalOperator::Filter(node) => node.predicate.contains_function(),
            LogicalOperator::Project(node) => {
                node.target_list.iter().any(|e| e.contains_function())
            }
            _ => false,
        };
        here || self.children.iter().any(|c| c.invokes_function())
    }

    /// Operator types from the root down the first-child chain
    pub fn operator_chain(&self) -> Vec<OperatorType> {
        let mut chain = vec![self.operator_type()];
        let mut node = self;
        while let Some(child) = node.children.first() {
            chain.push(child.operator_type());
            node = child;
        }
        chain
    }
}

/// Read the rows of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct GetNode {
    pub table_ref: TableRef,
    pub dataset: Dataset,
}

impl GetNode {
    pub fn new(table_ref: TableRef, dataset: Dataset) -> Self {
        Self { table_ref, dataset }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    pub predicate: Expr,
}

impl FilterNode {
    pub fn new(predicate: Expr) -> Self {
        Self { predicate }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectNode {
    pub target_list: Vec<Expr>,
}

impl ProjectNode {
    pub fn new(target_list: Vec<Expr>) -> Self {
        Self { target_list }
    }

    pub fn output_names(&self) -> Vec<String> {
        self.target_list.iter().map(|e| e.output_name()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertNode {
    pub table_ref: TableRef,
    pub dataset_id: u64,
    pub column_list: Vec<Column>,
    /// One entry per row, each aligned with `column_list`
    pub value_list: Vec<Vec<Expr>>,
}

impl InsertNode {
    pub fn new(
        table_ref: TableRef,
        dataset_id: u64,
        column_list: Vec<Column>,
        value_list: Vec<Vec<Expr>>,
    ) -> Self {
        Self {
            table_ref,
            dataset_id,
            column_list,
            value_list,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableNode {
    pub table_ref: TableRef,
    pub column_list: Vec<Column>,
    pub if_not_exists: bool,
}

impl CreateTableNode {
    pub fn new(table_ref: TableRef, column_list: Vec<Column>, if_not_exists: bool) -> Self {
        Self {
            table_ref,
            column_list,
            if_not_exists,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUdfNode {
    pub name: String,
    pub if_not_exists: bool,
    pub inputs: Vec<UdfIo>,
    pub outputs: Vec<UdfIo>,
    pub impl_path: PathBuf,
    pub udf_type: Option<String>,
}

impl CreateUdfNode {
    pub fn new(
        name: impl Into<String>,
        if_not_exists: bool,
        inputs: Vec<UdfIo>,
        outputs: Vec<UdfIo>,
        impl_path: impl Into<PathBuf>,
        udf_type: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            if_not_exists,
            inputs,
            outputs,
            impl_path: impl_path.into(),
            udf_type,
        }
    }
}

/// Load a file into a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDataNode {
    pub dataset: Dataset,
    pub path: PathBuf,
}

impl LoadDataNode {
    pub fn new(dataset: Dataset, path: impl Into<PathBuf>) -> Self {
        Self {
            dataset,
            path: path.into(),
        }
    }

    /// Name of the loader that reads `path`: `csv` for `.csv` files, `video` otherwise
    pub fn loader_name(&self) -> &'static str {
        loader_for_path(&self.path)
    }
}

fn loader_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => "csv",
        _ => "video",
    }
}

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indent(f, 0)
    }
}

impl LogicalPlan {
    fn fmt_indent(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);

        match &self.operator {
            LogicalOperator::Get(node) => {
                writeln!(
                    f,
                    "{}Get: {} [{}]",
                    prefix,
                    node.table_ref,
                    node.dataset.column_names().join(", ")
                )?;
            }
            LogicalOperator::Filter(node) => {
                writeln!(f, "{}Filter: {}", prefix, node.predicate)?;
            }
            LogicalOperator::Project(node) => {
                writeln!(f, "{}Project: [{}]", prefix, join_display(&node.target_list))?;
            }
            LogicalOperator::Insert(node) => {
                let columns: Vec<&str> = node.column_list.iter().map(|c| c.name.as_str()).collect();
                writeln!(
                    f,
                    "{}Insert: {} ({}) {} rows",
                    prefix,
                    node.table_ref,
                    columns.join(", "),
                    node.value_list.len()
                )?;
            }
            LogicalOperator::CreateTable(node) => {
                let if_not_exists = if node.if_not_exists { " IF NOT EXISTS" } else { "" };
                writeln!(
                    f,
                    "{}CreateTable{}: {} ({})",
                    prefix,
                    if_not_exists,
                    node.table_ref,
                    join_display(&node.column_list)
                )?;
            }
            LogicalOperator::CreateUdf(node) => {
                let if_not_exists = if node.if_not_exists { " IF NOT EXISTS" } else { "" };
                writeln!(
                    f,
                    "{}CreateUdf{}: {} input=({}) output=({}) impl={}",
                    prefix,
                    if_not_exists,
                    node.name,
                    join_display(&node.inputs),
                    join_display(&node.outputs),
                    node.impl_path.display()
                )?;
                if let Some(udf_type) = &node.udf_type {
                    writeln!(f, "{}  type: {}", prefix, udf_type)?;
                }
            }
            LogicalOperator::LoadData(node) => {
                writeln!(
                    f,
                    "{}LoadData: {} <- {} ({})",
                    prefix,
                    node.dataset,
                    node.path.display(),
                    node.loader_name()
                )?;
            }
        }

        for child in &self.children {
            child.fmt_indent(f, indent + 1)?;
        }
        Ok(())
    }
}
