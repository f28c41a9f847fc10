//! Planning session - main entry point for turning SQL into plans

use crate::binder::CatalogBinder;
use crate::catalog::Catalog;
use crate::config::PlannerConfig;
use crate::error::{QueryError, Result};
use crate::parser::{self, Statement};
use crate::planner::{LogicalOperator, LogicalPlan, StatementToPlanConvertor};
use crate::registry::LoaderKind;
use std::time::{Duration, Instant};
use tracing::debug;

/// Planning metrics
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanMetrics {
    /// Time spent parsing
    pub parse_time: Duration,
    /// Time spent binding and building the plan
    pub plan_time: Duration,
}

/// A converted statement and what executing it needs
#[derive(Debug, Clone)]
pub struct PlannedStatement {
    pub plan: LogicalPlan,
    /// Loader for LOAD DATA plans
    pub loader: Option<LoaderKind>,
    pub use_gpu: bool,
    pub metrics: PlanMetrics,
}

/// Owns a catalog and plans statements against it
pub struct PlanningSession<C: Catalog> {
    catalog: C,
    config: PlannerConfig,
}

impl<C: Catalog> PlanningSession<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_config(catalog, PlannerConfig::default())
    }

    pub fn with_config(catalog: C, config: PlannerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Parse and plan a single statement
    pub fn plan_sql(&self, sql: &str) -> Result<PlannedStatement> {
        let start = Instant::now();
        let statement = parser::parse_sql(sql)?;
        let parse_time = start.elapsed();

        let mut planned = self.plan_statement(&statement)?;
        planned.metrics.parse_time = parse_time;
        Ok(planned)
    }

    pub fn plan_statement(&self, statement: &Statement) -> Result<PlannedStatement> {
        let start = Instant::now();
        let binder = CatalogBinder::new(&self.catalog);
        let mut convertor = StatementToPlanConvertor::new(&binder);
        convertor.visit(statement)?;

        let plan = convertor.into_plan().ok_or_else(|| {
            QueryError::Plan(format!("{} statement produced no plan", statement.kind()))
        })?;

        let loader = match plan.operator() {
            LogicalOperator::LoadData(node) => {
                Some(self.config.loader_registry.create(node.loader_name())?)
            }
            _ => None,
        };

        let metrics = PlanMetrics {
            parse_time: Duration::ZERO,
            plan_time: start.elapsed(),
        };
        debug!(root = %plan.operator_type(), plan_time = ?metrics.plan_time, "planned statement");

        // only UDF calls run on the device
        let use_gpu = self.config.capabilities.gpu_available && plan.invokes_function();

        Ok(PlannedStatement {
            plan,
            loader,
            use_gpu,
            metrics,
        })
    }
}
