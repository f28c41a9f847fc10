//! Token-level reader for video DDL
//!
//! ```text
//! CREATE TABLE [IF NOT EXISTS] name (col type, ...)
//! CREATE UDF [IF NOT EXISTS] name INPUT (col type, ...) OUTPUT (col type, ...)
//!     [TYPE udf_type] IMPL 'path'
//! LOAD DATA INFILE 'path' INTO [TABLE] name
//! ```
//!
//! Column types: BOOLEAN, INTEGER, FLOAT, TEXT[(n)] and
//! NDARRAY elem_type(dim, ...) where a dimension is a number or ANYDIM.

use super::ast::*;
use crate::catalog::{ColumnType, NdArrayType};
use crate::error::{QueryError, Result};
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;
use std::path::PathBuf;

fn peek_word(parser: &Parser<'_>, n: usize) -> Option<String> {
    match parser.peek_nth_token(n).token {
        Token::Word(w) => Some(w.value.to_ascii_uppercase()),
        _ => None,
    }
}

/// Consume `word` if it is next
fn parse_word(parser: &mut Parser<'_>, word: &str) -> bool {
    if peek_word(parser, 0).as_deref() == Some(word) {
        parser.next_token();
        true
    } else {
        false
    }
}

fn expect_word(parser: &mut Parser<'_>, word: &str) -> Result<()> {
    if parse_word(parser, word) {
        Ok(())
    } else {
        Err(QueryError::Parse(format!(
            "Expected {}, found: {}",
            word,
            parser.peek_token().token
        )))
    }
}

fn parse_identifier(parser: &mut Parser<'_>) -> Result<String> {
    match parser.next_token().token {
        Token::Word(w) => Ok(w.value),
        other => Err(QueryError::Parse(format!(
            "Expected identifier, found: {}",
            other
        ))),
    }
}

fn parse_table_ref(parser: &mut Parser<'_>) -> Result<TableRef> {
    let name = parser.parse_object_name(false)?;
    Ok(TableRef::new(TableInfo::from_object_name(&name)))
}

fn parse_if_not_exists(parser: &mut Parser<'_>) -> bool {
    parser.parse_keywords(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS])
}

/// True when the next tokens start a statement this module reads
pub(super) fn is_video_statement(parser: &Parser<'_>) -> bool {
    let first = peek_word(parser, 0);
    let second = peek_word(parser, 1);
    matches!(
        (first.as_deref(), second.as_deref()),
        (Some("CREATE"), Some("UDF")) | (Some("CREATE"), Some("TABLE")) | (Some("LOAD"), Some("DATA"))
    )
}

pub(super) fn parse_video_statement(parser: &mut Parser<'_>) -> Result<Statement> {
    if parse_word(parser, "LOAD") {
        expect_word(parser, "DATA")?;
        return parse_load_data(parser);
    }

    expect_word(parser, "CREATE")?;
    if parse_word(parser, "UDF") {
        parse_create_udf(parser)
    } else {
        expect_word(parser, "TABLE")?;
        parse_create_table(parser)
    }
}

fn parse_load_data(parser: &mut Parser<'_>) -> Result<Statement> {
    expect_word(parser, "INFILE")?;
    let path = parser.parse_literal_string()?;
    expect_word(parser, "INTO")?;
    parse_word(parser, "TABLE");
    let table = parse_table_ref(parser)?;

    Ok(Statement::LoadData(LoadDataStatement {
        table,
        path: PathBuf::from(path),
    }))
}

fn parse_create_table(parser: &mut Parser<'_>) -> Result<Statement> {
    let if_not_exists = parse_if_not_exists(parser);
    let table_ref = parse_table_ref(parser)?;
    let column_list = parse_column_definitions(parser)?;

    Ok(Statement::CreateTable(CreateTableStatement {
        table_ref,
        if_not_exists,
        column_list,
    }))
}

fn parse_create_udf(parser: &mut Parser<'_>) -> Result<Statement> {
    let if_not_exists = parse_if_not_exists(parser);
    let name = parse_identifier(parser)?;

    expect_word(parser, "INPUT")?;
    let inputs = parse_column_definitions(parser)?;
    expect_word(parser, "OUTPUT")?;
    let outputs = parse_column_definitions(parser)?;

    let udf_type = if parse_word(parser, "TYPE") {
        Some(parse_identifier(parser)?)
    } else {
        None
    };

    expect_word(parser, "IMPL")?;
    let impl_path = parser.parse_literal_string()?;

    Ok(Statement::CreateUdf(CreateUdfStatement {
        name,
        if_not_exists,
        inputs,
        outputs,
        impl_path: PathBuf::from(impl_path),
        udf_type,
    }))
}

fn parse_column_definitions(parser: &mut Parser<'_>) -> Result<Vec<ColumnDefinition>> {
    parser.expect_token(&Token::LParen)?;
    let mut definitions = Vec::new();
    loop {
        definitions.push(parse_column_definition(parser)?);
        if !parser.consume_token(&Token::Comma) {
            break;
        }
    }
    parser.expect_token(&Token::RParen)?;
    Ok(definitions)
}

fn parse_column_definition(parser: &mut Parser<'_>) -> Result<ColumnDefinition> {
    let name = parse_identifier(parser)?;
    let type_name = parse_identifier(parser)?.to_ascii_uppercase();

    let definition = match type_name.as_str() {
        "BOOLEAN" | "BOOL" => ColumnDefinition::new(name, ColumnType::Boolean),
        "INTEGER" | "INT" | "BIGINT" | "SMALLINT" => ColumnDefinition::new(name, ColumnType::Integer),
        "FLOAT" | "REAL" | "DOUBLE" => {
            skip_type_modifiers(parser)?;
            ColumnDefinition::new(name, ColumnType::Float)
        }
        "TEXT" | "VARCHAR" | "CHAR" => {
            skip_type_modifiers(parser)?;
            ColumnDefinition::new(name, ColumnType::Text)
        }
        "NDARRAY" => {
            let elem = parse_identifier(parser)?;
            let array_type = NdArrayType::from_name(&elem).ok_or_else(|| {
                QueryError::Parse(format!("Unknown NDARRAY element type: {}", elem))
            })?;
            let dimensions = if parser.consume_token(&Token::LParen) {
                parse_dimensions(parser)?
            } else {
                vec![]
            };
            ColumnDefinition::ndarray(name, array_type, dimensions)
        }
        other => {
            return Err(QueryError::Parse(format!("Unknown column type: {}", other)));
        }
    };

    Ok(parse_nullability(parser, definition))
}

fn parse_nullability(parser: &mut Parser<'_>, definition: ColumnDefinition) -> ColumnDefinition {
    if parser.parse_keywords(&[Keyword::NOT, Keyword::NULL]) {
        definition.with_nullable(false)
    } else if parser.parse_keyword(Keyword::NULL) {
        definition.with_nullable(true)
    } else {
        definition
    }
}

/// Skip `(n)` / `(p, s)` after a scalar type
fn skip_type_modifiers(parser: &mut Parser<'_>) -> Result<()> {
    if !parser.consume_token(&Token::LParen) {
        return Ok(());
    }
    loop {
        match parser.next_token().token {
            Token::RParen => return Ok(()),
            Token::Number(_, _) | Token::Comma => {}
            other => {
                return Err(QueryError::Parse(format!(
                    "Expected type modifier, found: {}",
                    other
                )))
            }
        }
    }
}

/// Dimension list after the opening paren
fn parse_dimensions(parser: &mut Parser<'_>) -> Result<Vec<Option<usize>>> {
    let mut dims = Vec::new();
    loop {
        let dim = match parser.next_token().token {
            Token::Number(n, _) => Some(n.parse::<usize>().map_err(|_| {
                QueryError::Parse(format!("Invalid array dimension: {}", n))
            })?),
            Token::Word(w) if w.value.eq_ignore_ascii_case("ANYDIM") => None,
            other => {
                return Err(QueryError::Parse(format!(
                    "Expected array dimension, found: {}",
                    other
                )))
            }
        };
        dims.push(dim);

        if !parser.consume_token(&Token::Comma) {
            break;
        }
    }
    parser.expect_token(&Token::RParen)?;
    Ok(dims)
}
