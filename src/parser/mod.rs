//! SQL Parser module
//!
//! Wraps sqlparser-rs and lowers its AST into [`Statement`]. The video
//! specific statements (CREATE UDF, CREATE TABLE with NDARRAY columns,
//! LOAD DATA) are read directly off the token stream.

mod ast;
mod ddl;

pub use ast::*;

use crate::error::{QueryError, Result};
use sqlparser::ast as sql;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

/// Parse a single SQL statement
pub fn parse_sql(sql: &str) -> Result<Statement> {
    let mut statements = parse_sql_statements(sql)?;

    if statements.is_empty() {
        return Err(QueryError::Parse("Empty SQL statement".to_string()));
    }

    if statements.len() > 1 {
        return Err(QueryError::Parse(
            "Multiple statements not supported".to_string(),
        ));
    }

    Ok(statements.remove(0))
}

/// Parse a `;` separated list of statements
pub fn parse_sql_statements(sql: &str) -> Result<Vec<Statement>> {
    let dialect = GenericDialect {};
    let mut parser = Parser::new(&dialect).try_with_sql(sql)?;
    let mut statements = Vec::new();

    loop {
        while parser.consume_token(&Token::SemiColon) {}
        if parser.peek_token().token == Token::EOF {
            break;
        }

        let statement = if ddl::is_video_statement(&parser) {
            ddl::parse_video_statement(&mut parser)?
        } else {
            lower_statement(parser.parse_statement()?)?
        };
        statements.push(statement);

        if parser.peek_token().token != Token::EOF && !parser.consume_token(&Token::SemiColon) {
            return Err(QueryError::Parse(format!(
                "Expected end of statement, found: {}",
                parser.peek_token().token
            )));
        }
    }

    Ok(statements)
}

fn lower_statement(statement: sql::Statement) -> Result<Statement> {
    match statement {
        sql::Statement::Query(query) => lower_query(*query),
        sql::Statement::Insert(insert) => lower_insert(insert),
        other => Ok(Statement::Unsupported(other.to_string())),
    }
}

fn lower_query(query: sql::Query) -> Result<Statement> {
    if query.with.is_some() {
        return Err(QueryError::NotImplemented("WITH clause".to_string()));
    }
    if query.order_by.is_some() {
        return Err(QueryError::NotImplemented("ORDER BY".to_string()));
    }
    if query.limit.is_some() || query.offset.is_some() {
        return Err(QueryError::NotImplemented("LIMIT/OFFSET".to_string()));
    }

    match *query.body {
        sql::SetExpr::Select(select) => lower_select(*select),
        sql::SetExpr::Query(inner) => lower_query(*inner),
        other => Err(QueryError::NotImplemented(format!(
            "Query body: {}",
            other
        ))),
    }
}

fn lower_select(select: sql::Select) -> Result<Statement> {
    if select.distinct.is_some() {
        return Err(QueryError::NotImplemented("DISTINCT".to_string()));
    }
    if select.having.is_some() {
        return Err(QueryError::NotImplemented("HAVING".to_string()));
    }

    let mut from = select.from;
    if from.len() > 1 {
        return Err(QueryError::NotImplemented(
            "Multiple tables in FROM".to_string(),
        ));
    }
    let from_table = match from.pop() {
        Some(table) => Some(lower_table_with_joins(table)?),
        None => None,
    };

    Ok(Statement::Select(SelectStatement {
        from_table,
        target_list: select.projection,
        where_clause: select.selection,
    }))
}

fn lower_table_with_joins(table: sql::TableWithJoins) -> Result<TableRef> {
    if !table.joins.is_empty() {
        return Err(QueryError::NotImplemented("JOIN".to_string()));
    }

    match table.relation {
        sql::TableFactor::Table { name, alias, .. } => {
            if alias.is_some() {
                return Err(QueryError::NotImplemented("Table aliases".to_string()));
            }
            Ok(TableRef::new(TableInfo::from_object_name(&name)))
        }
        other => Err(QueryError::NotImplemented(format!(
            "Table factor: {}",
            other
        ))),
    }
}

fn lower_insert(insert: sql::Insert) -> Result<Statement> {
    let table = TableRef::new(TableInfo::from_object_name(&insert.table_name));
    let column_list = insert.columns.into_iter().map(|c| c.value).collect();

    let source = insert
        .source
        .ok_or_else(|| QueryError::Parse("INSERT without VALUES".to_string()))?;
    let value_list = match *source.body {
        sql::SetExpr::Values(values) => values.rows,
        _ => {
            return Err(QueryError::NotImplemented(
                "INSERT ... SELECT".to_string(),
            ))
        }
    };

    Ok(Statement::Insert(InsertStatement {
        table,
        column_list,
        value_list,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_select() {
        let stmt = parse_sql("SELECT id, data FROM MyVideo").unwrap();
        match stmt {
            Statement::Select(select) => {
                assert_eq!(
                    select.from_table.map(|t| t.table_info.table_name),
                    Some("MyVideo".to_string())
                );
                assert_eq!(select.target_list.len(), 2);
                assert!(select.where_clause.is_none());
            }
            other => panic!("expected SELECT, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_select_with_where() {
        let stmt = parse_sql("SELECT id FROM MyVideo WHERE id > 10").unwrap();
        assert!(matches!(
            stmt,
            Statement::Select(SelectStatement {
                where_clause: Some(_),
                ..
            })
        ));
    }

    #[test]
    fn test_parse_select_without_from() {
        let stmt = parse_sql("SELECT 1").unwrap();
        assert!(matches!(
            stmt,
            Statement::Select(SelectStatement {
                from_table: None,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_join_not_implemented() {
        let err = parse_sql("SELECT a.x FROM a JOIN b ON a.id = b.id").unwrap_err();
        assert!(matches!(err, QueryError::NotImplemented(_)));
    }

    #[test]
    fn test_parse_insert() {
        let stmt = parse_sql("INSERT INTO MyVideo (id, label) VALUES (1, 'car'), (2, 'bus')").unwrap();
        match stmt {
            Statement::Insert(insert) => {
                assert_eq!(insert.table.table_info.table_name, "MyVideo");
                assert_eq!(insert.column_list, vec!["id", "label"]);
                assert_eq!(insert.value_list.len(), 2);
            }
            other => panic!("expected INSERT, got {:?}", other),
        }
    }

    #[test]
    fn test_other_statements_unsupported() {
        let stmt = parse_sql("DROP TABLE MyVideo").unwrap();
        assert!(matches!(stmt, Statement::Unsupported(_)));
    }

    #[test]
    fn test_multiple_statements() {
        let stmts =
            parse_sql_statements("LOAD DATA INFILE 'a.mp4' INTO MyVideo; SELECT id FROM MyVideo;")
                .unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].kind(), "LOAD DATA");
        assert_eq!(stmts[1].kind(), "SELECT");

        assert!(parse_sql("SELECT 1; SELECT 2").is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(parse_sql("SELEC a FROM b").is_err());
        assert!(parse_sql("   ").is_err());
    }
}
