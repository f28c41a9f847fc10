//! Statement to logical plan conversion
//!
//! One converter handles one statement. SELECT plans are built bottom-up:
//! each clause wraps the current root in a new node, giving
//! `Filter -> Project -> Get` for a full query.

use crate::binder::PlanBinder;
use crate::catalog::Dataset;
use crate::error::{QueryError, Result};
use crate::parser::{
    CreateTableStatement, CreateUdfStatement, InsertStatement, LoadDataStatement, SelectItem,
    SelectStatement, SqlExpr, Statement, TableRef,
};
use crate::planner::{
    ColumnMap, CreateTableNode, CreateUdfNode, FilterNode, GetNode, InsertNode, LoadDataNode,
    LogicalOperator, LogicalPlan, ProjectNode,
};
use tracing::debug;

pub struct StatementToPlanConvertor<'a> {
    binder: &'a dyn PlanBinder,
    current_plan: Option<LogicalPlan>,
    current_column_map: ColumnMap,
}

impl<'a> StatementToPlanConvertor<'a> {
    pub fn new(binder: &'a dyn PlanBinder) -> Self {
        Self {
            binder,
            current_plan: None,
            current_column_map: ColumnMap::new(),
        }
    }

    /// Root of the plan built so far
    pub fn current_plan(&self) -> Option<&LogicalPlan> {
        self.current_plan.as_ref()
    }

    pub fn column_map(&self) -> &ColumnMap {
        &self.current_column_map
    }

    pub fn into_plan(self) -> Option<LogicalPlan> {
        self.current_plan
    }

    pub fn visit(&mut self, statement: &Statement) -> Result<()> {
        debug!(kind = statement.kind(), "visit statement");
        match statement {
            Statement::Select(select) => self.visit_select(select),
            Statement::CreateUdf(create_udf) => self.visit_create_udf(create_udf),
            Statement::Insert(insert) => self.visit_insert(insert),
            Statement::CreateTable(create) => self.visit_create(create),
            Statement::LoadData(load) => self.visit_load_data(load),
            Statement::Unsupported(sql) => Err(QueryError::UnsupportedStatement(sql.clone())),
        }
    }

    fn resolve_table(&self, table_ref: &TableRef) -> Result<Dataset> {
        self.binder
            .bind_dataset(&table_ref.table_info)?
            .ok_or_else(|| QueryError::TableNotFound(table_ref.table_info.table_name.clone()))
    }

    /// Bind the table and make a Get node the new root
    pub fn visit_table_ref(&mut self, table_ref: &TableRef) -> Result<()> {
        let dataset = self.resolve_table(table_ref)?;
        debug!(table = %table_ref, dataset_id = dataset.id, "bound table");

        let get = LogicalPlan::get(GetNode::new(table_ref.clone(), dataset.clone()));
        self.current_plan = Some(get);
        self.populate_column_map(&dataset);
        Ok(())
    }

    fn populate_column_map(&mut self, dataset: &Dataset) {
        self.current_column_map = ColumnMap::from_dataset(dataset);
    }

    /// Make `node` the root, with the previous root (if any) as its child
    fn push_root(&mut self, mut node: LogicalPlan) {
        if let Some(previous) = self.current_plan.take() {
            node.append_child(previous);
        }
        self.current_plan = Some(node);
    }

    pub fn visit_select_predicate(&mut self, predicate: &SqlExpr) -> Result<()> {
        let predicate = self
            .binder
            .bind_predicate_expr(predicate, &self.current_column_map)?;
        self.push_root(LogicalPlan::filter(FilterNode::new(predicate)));
        Ok(())
    }

    pub fn visit_projection(&mut self, target_list: &[SelectItem]) -> Result<()> {
        let target_list = self
            .binder
            .bind_columns_expr(target_list, &self.current_column_map)?;
        self.push_root(LogicalPlan::project(ProjectNode::new(target_list)));
        Ok(())
    }

    pub fn visit_select(&mut self, statement: &SelectStatement) -> Result<()> {
        if let Some(table) = &statement.from_table {
            self.visit_table_ref(table)?;
        }

        if !statement.target_list.is_empty() {
            self.visit_projection(&statement.target_list)?;
        }

        if let Some(predicate) = &statement.where_clause {
            self.visit_select_predicate(predicate)?;
        }

        Ok(())
    }

    pub fn visit_create_udf(&mut self, statement: &CreateUdfStatement) -> Result<()> {
        let inputs = self
            .binder
            .column_definition_to_udf_io(&statement.inputs, true)?;
        let outputs = self
            .binder
            .column_definition_to_udf_io(&statement.outputs, false)?;

        let node = CreateUdfNode::new(
            statement.name.clone(),
            statement.if_not_exists,
            inputs,
            outputs,
            statement.impl_path.clone(),
            statement.udf_type.clone(),
        );
        self.current_plan = Some(LogicalPlan::new(LogicalOperator::CreateUdf(node)));
        Ok(())
    }

    /// Loading into an unknown table creates it as a video table
    pub fn visit_load_data(&mut self, statement: &LoadDataStatement) -> Result<()> {
        let table_info = &statement.table.table_info;
        let dataset = match self.binder.bind_dataset(table_info)? {
            Some(dataset) => dataset,
            None => {
                debug!(table = %table_info, "table not found, creating video metadata");
                self.binder.create_video_metadata(&table_info.table_name)?
            }
        };

        let node = LoadDataNode::new(dataset, statement.path.clone());
        self.current_plan = Some(LogicalPlan::new(LogicalOperator::LoadData(node)));
        Ok(())
    }

    pub fn visit_insert(&mut self, statement: &InsertStatement) -> Result<()> {
        let dataset = self.resolve_table(&statement.table)?;
        self.populate_column_map(&dataset);

        let columns = if statement.column_list.is_empty() {
            dataset.columns.clone()
        } else {
            statement
                .column_list
                .iter()
                .map(|name| self.current_column_map.resolve(name))
                .collect::<Result<Vec<_>>>()?
        };

        let values = self.binder.bind_value_exprs(&statement.value_list)?;
        if let Some((row, values)) = values
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(QueryError::Bind(format!(
                "INSERT row {} has {} values but {} columns were targeted",
                row + 1,
                values.len(),
                columns.len()
            )));
        }

        let node = InsertNode::new(statement.table.clone(), dataset.id, columns, values);
        self.current_plan = Some(LogicalPlan::new(LogicalOperator::Insert(node)));
        Ok(())
    }

    pub fn visit_create(&mut self, statement: &CreateTableStatement) -> Result<()> {
        let columns = self
            .binder
            .column_definition_to_columns(&statement.column_list)?;

        let node = CreateTableNode::new(statement.table_ref.clone(), columns, statement.if_not_exists);
        self.current_plan = Some(LogicalPlan::new(LogicalOperator::CreateTable(node)));
        Ok(())
    }
}
