//! Statement-to-logical-plan conversion for a video query compiler
//!
//! SQL text is parsed into a [`parser::Statement`], bound against a
//! [`catalog::Catalog`], and turned into a [`planner::LogicalPlan`] tree.

pub mod binder;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod planner;
pub mod registry;
pub mod session;

// Re-export main types
pub use binder::{CatalogBinder, PlanBinder};
pub use catalog::{Catalog, InMemoryCatalog};
pub use config::PlannerConfig;
pub use error::{QueryError, Result};
pub use planner::{LogicalPlan, StatementToPlanConvertor};
pub use session::{PlannedStatement, PlanningSession};
