//! Interactive REPL
//!
//! Provides:
//! - Tab completion for keywords, table names, and column names
//! - Syntax highlighting
//! - A statement loop that prints one plan per statement

mod helper;
mod repl;

pub use helper::ReplHelper;
pub use repl::Repl;
