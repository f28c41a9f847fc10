//! Interactive planning loop
//!
//! Statements are accumulated until a line ends with `;`, then planned and
//! printed. `\q` or Ctrl-D exits, `\d` lists datasets, `\h` prints help.
//! Planning errors are printed and the loop continues.

use super::ReplHelper;
use crate::catalog::Catalog;
use crate::error::{QueryError, Result};
use crate::parser::parse_sql_statements;
use crate::session::PlanningSession;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

const PRIMARY_PROMPT: &str = "vidql> ";
const CONTINUATION_PROMPT: &str = "    -> ";

const HELP: &str = "\
Enter statements terminated by ';'. Each statement is planned and its plan printed.
  \\d   list datasets
  \\h   show this help
  \\q   quit";

pub struct Repl<C: Catalog> {
    session: PlanningSession<C>,
    editor: Editor<ReplHelper, DefaultHistory>,
    helper: ReplHelper,
    sql_buffer: String,
}

impl<C: Catalog> Repl<C> {
    pub fn new(session: PlanningSession<C>) -> Result<Self> {
        let mut editor = Editor::<ReplHelper, DefaultHistory>::new()
            .map_err(|e| QueryError::Internal(format!("failed to initialize line editor: {}", e)))?;
        let helper = ReplHelper::new();
        editor.set_helper(Some(helper.clone()));

        let repl = Self {
            session,
            editor,
            helper,
            sql_buffer: String::new(),
        };
        repl.refresh_completions();
        Ok(repl)
    }

    pub fn run(&mut self) -> Result<()> {
        println!("vidql planner. Type \\h for help.");

        loop {
            let prompt = if self.sql_buffer.is_empty() {
                PRIMARY_PROMPT
            } else {
                CONTINUATION_PROMPT
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    self.sql_buffer.clear();
                    println!("^C");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    return Err(QueryError::Internal(format!("error reading input: {}", err)));
                }
            }
        }
        Ok(())
    }

    /// Returns false when the loop should stop
    fn handle_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return true;
        }

        if self.sql_buffer.is_empty() && trimmed.starts_with('\\') {
            self.editor.add_history_entry(trimmed).ok();
            return self.run_command(trimmed);
        }

        if !self.sql_buffer.is_empty() {
            self.sql_buffer.push('\n');
        }
        self.sql_buffer.push_str(trimmed);

        if trimmed.ends_with(';') {
            let sql = std::mem::take(&mut self.sql_buffer);
            self.editor.add_history_entry(sql.as_str()).ok();
            self.plan_and_print(&sql);
        }
        true
    }

    fn run_command(&self, command: &str) -> bool {
        match command {
            "\\q" => false,
            "\\h" => {
                println!("{}", HELP);
                true
            }
            "\\d" => {
                let catalog = self.session.catalog();
                for name in catalog.dataset_names() {
                    if let Some(dataset) = catalog.get_dataset(&name) {
                        let kind = if dataset.is_video { "video" } else { "table" };
                        println!("{} ({}): {}", dataset.name, kind, dataset.column_names().join(", "));
                    }
                }
                true
            }
            other => {
                eprintln!("Unknown command: {}", other);
                true
            }
        }
    }

    fn plan_and_print(&self, sql: &str) {
        let statements = match parse_sql_statements(sql) {
            Ok(statements) => statements,
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        };

        for statement in &statements {
            match self.session.plan_statement(statement) {
                Ok(planned) => {
                    print!("{}", planned.plan);
                    if let Some(loader) = &planned.loader {
                        println!("loader: {}", loader.name);
                    }
                    println!("planned in {:?}", planned.metrics.plan_time);
                }
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        self.refresh_completions();
    }

    /// LOAD DATA can create datasets, so completions follow the catalog
    fn refresh_completions(&self) {
        let catalog = self.session.catalog();
        self.helper.clear_tables();
        for name in catalog.dataset_names() {
            if let Some(dataset) = catalog.get_dataset(&name) {
                self.helper.register_table(&dataset.name, dataset.column_names());
            }
        }
    }
}
