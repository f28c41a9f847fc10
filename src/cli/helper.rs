//! REPL helper providing completion and highlighting

use parking_lot::RwLock;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Keywords for completion and highlighting
pub const KEYWORDS: &[&str] = &[
    // Queries
    "SELECT",
    "FROM",
    "WHERE",
    "AS",
    "AND",
    "OR",
    "NOT",
    "IN",
    "BETWEEN",
    "LIKE",
    "IS",
    "NULL",
    "TRUE",
    "FALSE",
    // DML
    "INSERT",
    "INTO",
    "VALUES",
    "LOAD",
    "DATA",
    "INFILE",
    // DDL
    "CREATE",
    "TABLE",
    "UDF",
    "IF",
    "EXISTS",
    "INPUT",
    "OUTPUT",
    "TYPE",
    "IMPL",
    // Column types
    "BOOLEAN",
    "INTEGER",
    "FLOAT",
    "TEXT",
    "NDARRAY",
    "ANYDIM",
];

/// NDARRAY element types
const ARRAY_TYPES: &[&str] = &[
    "INT8", "UINT8", "INT16", "INT32", "INT64", "FLOAT32", "FLOAT64", "UNICODE", "STR", "BOOL",
    "DECIMAL",
];

/// Backslash commands understood by the REPL
pub const REPL_COMMANDS: &[&str] = &["\\q", "\\d", "\\h"];

/// Completion state shared between the editor and the REPL loop
#[derive(Clone, Default)]
pub struct ReplHelper {
    /// Lower-cased table name -> column names
    tables: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl ReplHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table for completion, replacing any earlier entry
    pub fn register_table(&self, name: &str, columns: Vec<String>) {
        self.tables.write().insert(name.to_lowercase(), columns);
    }

    pub fn clear_tables(&self) {
        self.tables.write().clear();
    }

    fn get_completions(&self, word: &str, line: &str) -> Vec<Pair> {
        let word_lower = word.to_lowercase();
        let line_lower = line.to_lowercase();
        let mut completions = Vec::new();

        if line.trim_start().starts_with('\\') {
            for cmd in REPL_COMMANDS {
                if cmd.starts_with(&word_lower) {
                    completions.push(Pair {
                        display: cmd.to_string(),
                        replacement: cmd.to_string(),
                    });
                }
            }
            return completions;
        }

        // Keep the case the user started typing in
        let use_uppercase = word
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(true);
        for &kw in KEYWORDS.iter().chain(ARRAY_TYPES) {
            if kw.to_lowercase().starts_with(&word_lower) {
                let replacement = if use_uppercase {
                    kw.to_string()
                } else {
                    kw.to_lowercase()
                };
                completions.push(Pair {
                    display: kw.to_string(),
                    replacement,
                });
            }
        }

        let tables = self.tables.read();

        let after_table_keyword = ["from", "into", "table"].iter().any(|kw| {
            line_lower
                .rfind(kw)
                .map(|pos| line_lower[pos + kw.len()..].split_whitespace().count() <= 1)
                .unwrap_or(false)
        });
        if after_table_keyword || word_lower.is_empty() {
            for table in tables.keys() {
                if table.starts_with(&word_lower) {
                    completions.push(Pair {
                        display: table.clone(),
                        replacement: table.clone(),
                    });
                }
            }
        }

        for table in extract_tables(&line_lower) {
            if let Some(columns) = tables.get(&table) {
                for col in columns {
                    let col_lower = col.to_lowercase();
                    if col_lower.starts_with(&word_lower)
                        && !completions
                            .iter()
                            .any(|p| p.replacement.to_lowercase() == col_lower)
                    {
                        completions.push(Pair {
                            display: col.clone(),
                            replacement: col.clone(),
                        });
                    }
                }
            }
        }

        completions
    }

    fn is_keyword(word: &str) -> bool {
        KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(word))
    }

    fn is_array_type(word: &str) -> bool {
        ARRAY_TYPES.iter().any(|t| t.eq_ignore_ascii_case(word))
    }
}

/// Table names following FROM or INTO
fn extract_tables(query: &str) -> Vec<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    words
        .windows(2)
        .filter(|pair| pair[0] == "from" || pair[0] == "into")
        .map(|pair| {
            pair[1]
                .trim_end_matches([',', ';'])
                .split('(')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];
        let word_start = line_to_cursor
            .rfind(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
            .map(|i| i + 1)
            .unwrap_or(0);

        let word = &line[word_start..pos];
        Ok((word_start, self.get_completions(word, line_to_cursor)))
    }
}

const RESET: &str = "\x1b[0m";

impl ReplHelper {
    /// ANSI color for a bare word, if it gets one
    fn word_color(&self, word: &str) -> Option<&'static str> {
        if Self::is_keyword(word) {
            Some("\x1b[1;34m")
        } else if Self::is_array_type(word) {
            Some("\x1b[33m")
        } else if self.tables.read().contains_key(&word.to_lowercase()) {
            Some("\x1b[36m")
        } else {
            None
        }
    }
}

/// Byte length of the prefix of `rest` whose chars after the first satisfy `pred`
fn span_while(rest: &str, pred: impl Fn(char) -> bool) -> usize {
    rest.char_indices()
        .skip(1)
        .find(|&(_, c)| !pred(c))
        .map_or(rest.len(), |(i, _)| i)
}

/// Byte length of the token starting at `rest`
fn token_len(rest: &str) -> usize {
    let first = match rest.chars().next() {
        Some(c) => c,
        None => return 0,
    };
    if first == '\'' {
        // unterminated strings run to the end of the line
        rest[1..].find('\'').map_or(rest.len(), |i| i + 2)
    } else if first.is_ascii_digit() {
        span_while(rest, |c| c.is_ascii_digit() || c == '.')
    } else if first.is_alphabetic() || first == '_' {
        span_while(rest, |c| c.is_alphanumeric() || c == '_')
    } else {
        first.len_utf8()
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.trim().is_empty() {
            return Cow::Borrowed(line);
        }
        if line.trim_start().starts_with('\\') {
            return Cow::Owned(format!("\x1b[36m{}{}", line, RESET));
        }

        let mut out = String::with_capacity(line.len() * 2);
        let mut offset = 0;
        while offset < line.len() {
            let rest = &line[offset..];
            let token = &rest[..token_len(rest)];
            let color = match token.chars().next() {
                Some('\'') => Some("\x1b[32m"),
                Some(c) if c.is_ascii_digit() => Some("\x1b[35m"),
                Some(c) if c.is_alphabetic() || c == '_' => self.word_color(token),
                _ => None,
            };
            match color {
                Some(color) => {
                    out.push_str(color);
                    out.push_str(token);
                    out.push_str(RESET);
                }
                None => out.push_str(token),
            }
            offset += token.len();
        }
        Cow::Owned(out)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(format!("\x1b[1;36m{}{}", prompt, RESET))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_detection() {
        assert!(ReplHelper::is_keyword("LOAD"));
        assert!(ReplHelper::is_keyword("ndarray"));
        assert!(!ReplHelper::is_keyword("MyVideo"));
        assert!(ReplHelper::is_array_type("uint8"));
    }

    #[test]
    fn test_keyword_completions() {
        let helper = ReplHelper::new();

        let completions = helper.get_completions("INF", "LOAD DATA INF");
        assert!(completions.iter().any(|p| p.replacement == "INFILE"));

        let completions = helper.get_completions("nda", "create table t (frame nda");
        assert!(completions.iter().any(|p| p.replacement == "ndarray"));
    }

    #[test]
    fn test_table_completions() {
        let helper = ReplHelper::new();
        helper.register_table("MyVideo", vec![]);
        helper.register_table("labels", vec![]);

        let completions = helper.get_completions("my", "SELECT id FROM my");
        assert!(completions.iter().any(|p| p.replacement == "myvideo"));

        let completions = helper.get_completions("l", "LOAD DATA INFILE 'x.csv' INTO l");
        assert!(completions.iter().any(|p| p.replacement == "labels"));
    }

    #[test]
    fn test_column_completions() {
        let helper = ReplHelper::new();
        helper.register_table("myvideo", vec!["id".to_string(), "data".to_string()]);

        let completions = helper.get_completions("da", "SELECT da FROM MyVideo");
        assert!(completions.iter().any(|p| p.replacement == "data"));
    }

    #[test]
    fn test_command_completions() {
        let helper = ReplHelper::new();
        let completions = helper.get_completions("\\", "\\");
        assert_eq!(completions.len(), REPL_COMMANDS.len());
    }

    #[test]
    fn test_highlighting() {
        let helper = ReplHelper::new();
        let highlighted = helper.highlight("LOAD DATA INFILE 'a.mp4' INTO MyVideo", 0);

        assert!(highlighted.contains("\x1b[1;34m"));
        assert!(highlighted.contains("\x1b[32m"));
        assert!(highlighted.contains("MyVideo"));
    }

    #[test]
    fn test_highlighting_known_tables() {
        let helper = ReplHelper::new();
        helper.register_table("MyVideo", vec!["id".to_string()]);
        let highlighted = helper.highlight("SELECT id FROM MyVideo WHERE id > 2.5", 0);

        assert!(highlighted.contains("\x1b[36mMyVideo\x1b[0m"));
        assert!(highlighted.contains("\x1b[35m2.5\x1b[0m"));
        assert!(highlighted.contains(" id "));
    }

    #[test]
    fn test_clear_tables() {
        let helper = ReplHelper::new();
        helper.register_table("MyVideo", vec!["id".to_string()]);
        helper.clear_tables();
        assert!(helper.tables.read().is_empty());
    }

    #[test]
    fn test_extract_tables() {
        assert_eq!(
            extract_tables("insert into myvideo(id) values (1)"),
            vec!["myvideo".to_string()]
        );
        assert_eq!(extract_tables("select id from t1;"), vec!["t1".to_string()]);
    }
}
