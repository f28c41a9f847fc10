//! Query planner module
//!
//! Converts parsed statements to LogicalPlan

mod column_map;
mod convertor;
mod logical_expr;
mod logical_plan;

pub use column_map::*;
pub use convertor::*;
pub use logical_expr::*;
pub use logical_plan::*;
