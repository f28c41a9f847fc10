//! Expression binding against a column map

use crate::error::{QueryError, Result};
use crate::planner::{BinaryOp, ColumnMap, Expr, ScalarValue, UnaryOp};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use sqlparser::ast::{self, Expr as SqlExpr, SelectItem};
use std::str::FromStr;

/// Resolves identifiers through a column map. With no column map every
/// identifier is an error, which is how VALUES rows are bound.
pub struct ExprBinder<'a> {
    column_map: Option<&'a ColumnMap>,
}

impl<'a> ExprBinder<'a> {
    pub fn new(column_map: &'a ColumnMap) -> Self {
        Self {
            column_map: Some(column_map),
        }
    }

    /// Binder for constant expressions
    pub fn constants() -> Self {
        Self { column_map: None }
    }

    fn resolve_column(&self, name: &str) -> Result<Expr> {
        match self.column_map {
            Some(map) => map.resolve(name).map(Expr::Column),
            None => Err(QueryError::ColumnNotFound(name.to_string())),
        }
    }

    /// Bind a SELECT list. `*` expands to every column in table order.
    pub fn bind_select_items(&self, items: &[SelectItem]) -> Result<Vec<Expr>> {
        let mut exprs = Vec::with_capacity(items.len());
        for item in items {
            match item {
                SelectItem::UnnamedExpr(expr) => exprs.push(self.bind_expr(expr)?),
                SelectItem::ExprWithAlias { expr, alias } => {
                    exprs.push(self.bind_expr(expr)?.alias(alias.value.clone()))
                }
                SelectItem::Wildcard(_) => {
                    // an empty map means no relation was bound
                    let map = self
                        .column_map
                        .filter(|map| !map.is_empty())
                        .ok_or_else(|| {
                            QueryError::Bind("SELECT * requires a FROM clause".to_string())
                        })?;
                    exprs.extend(
                        map.columns_in_order()
                            .into_iter()
                            .map(|c| Expr::Column(c.clone())),
                    );
                }
                SelectItem::QualifiedWildcard(name, _) => {
                    return Err(QueryError::NotImplemented(format!(
                        "Qualified wildcard: {}.*",
                        name
                    )))
                }
            }
        }
        Ok(exprs)
    }

    pub fn bind_expr(&self, expr: &SqlExpr) -> Result<Expr> {
        match expr {
            SqlExpr::Identifier(ident) => self.resolve_column(&ident.value),
            SqlExpr::CompoundIdentifier(idents) => match idents.last() {
                Some(column) if idents.len() <= 3 => self.resolve_column(&column.value),
                _ => Err(QueryError::Bind(format!(
                    "Unsupported compound identifier: {}",
                    expr
                ))),
            },
            SqlExpr::Value(value) => bind_value(value),
            SqlExpr::BinaryOp { left, op, right } => {
                let left_expr = self.bind_expr(left)?;
                let right_expr = self.bind_expr(right)?;
                Ok(left_expr.binary(convert_binary_op(op)?, right_expr))
            }
            SqlExpr::UnaryOp { op, expr } => {
                let bound_expr = self.bind_expr(expr)?;
                let unary_op = match op {
                    ast::UnaryOperator::Not => UnaryOp::Not,
                    ast::UnaryOperator::Minus => UnaryOp::Negate,
                    ast::UnaryOperator::Plus => return Ok(bound_expr),
                    _ => {
                        return Err(QueryError::NotImplemented(format!(
                            "Unary operator not supported: {:?}",
                            op
                        )))
                    }
                };
                Ok(Expr::unary(unary_op, bound_expr))
            }
            SqlExpr::IsNull(expr) => Ok(Expr::unary(UnaryOp::IsNull, self.bind_expr(expr)?)),
            SqlExpr::IsNotNull(expr) => {
                Ok(Expr::unary(UnaryOp::IsNotNull, self.bind_expr(expr)?))
            }
            SqlExpr::Nested(inner) => self.bind_expr(inner),
            SqlExpr::Between {
                expr,
                negated,
                low,
                high,
                ..
            } => Ok(Expr::Between {
                expr: Box::new(self.bind_expr(expr)?),
                low: Box::new(self.bind_expr(low)?),
                high: Box::new(self.bind_expr(high)?),
                negated: *negated,
            }),
            SqlExpr::InList {
                expr,
                list,
                negated,
                ..
            } => {
                let bound_list: Result<Vec<Expr>> =
                    list.iter().map(|e| self.bind_expr(e)).collect();
                Ok(Expr::InList {
                    expr: Box::new(self.bind_expr(expr)?),
                    list: bound_list?,
                    negated: *negated,
                })
            }
            SqlExpr::Like {
                negated,
                expr,
                pattern,
                ..
            } => {
                let op = if *negated {
                    BinaryOp::NotLike
                } else {
                    BinaryOp::Like
                };
                Ok(self.bind_expr(expr)?.binary(op, self.bind_expr(pattern)?))
            }
            SqlExpr::Function(func) => self.bind_function(func),
            _ => Err(QueryError::NotImplemented(format!(
                "Expression not supported: {}",
                expr
            ))),
        }
    }

    fn bind_function(&self, func: &ast::Function) -> Result<Expr> {
        let args: Vec<&ast::FunctionArg> = match &func.args {
            ast::FunctionArguments::None => vec![],
            ast::FunctionArguments::Subquery(_) => {
                return Err(QueryError::NotImplemented(
                    "Subquery function arguments".into(),
                ));
            }
            ast::FunctionArguments::List(arg_list) => arg_list.args.iter().collect(),
        };

        let bound_args = args
            .into_iter()
            .map(|arg| match arg {
                ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Expr(e)) => self.bind_expr(e),
                other => Err(QueryError::NotImplemented(format!(
                    "Function argument not supported: {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Expr::function(func.name.to_string(), bound_args))
    }
}

fn bind_value(value: &ast::Value) -> Result<Expr> {
    match value {
        ast::Value::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                return Ok(Expr::Literal(ScalarValue::Int64(i)));
            }
            if let Ok(d) = Decimal::from_str(n) {
                return Ok(Expr::Literal(ScalarValue::Decimal(d)));
            }
            if let Ok(f) = n.parse::<f64>() {
                return Ok(Expr::Literal(ScalarValue::Float64(OrderedFloat(f))));
            }
            Err(QueryError::Parse(format!("Cannot parse number: {}", n)))
        }
        ast::Value::SingleQuotedString(s) | ast::Value::DoubleQuotedString(s) => {
            Ok(Expr::Literal(ScalarValue::Utf8(s.clone())))
        }
        ast::Value::Boolean(b) => Ok(Expr::Literal(ScalarValue::Boolean(*b))),
        ast::Value::Null => Ok(Expr::Literal(ScalarValue::Null)),
        _ => Err(QueryError::NotImplemented(format!(
            "Value type not supported: {:?}",
            value
        ))),
    }
}

fn convert_binary_op(op: &ast::BinaryOperator) -> Result<BinaryOp> {
    match op {
        ast::BinaryOperator::Plus => Ok(BinaryOp::Add),
        ast::BinaryOperator::Minus => Ok(BinaryOp::Subtract),
        ast::BinaryOperator::Multiply => Ok(BinaryOp::Multiply),
        ast::BinaryOperator::Divide => Ok(BinaryOp::Divide),
        ast::BinaryOperator::Modulo => Ok(BinaryOp::Modulo),
        ast::BinaryOperator::Eq => Ok(BinaryOp::Eq),
        ast::BinaryOperator::NotEq => Ok(BinaryOp::NotEq),
        ast::BinaryOperator::Lt => Ok(BinaryOp::Lt),
        ast::BinaryOperator::LtEq => Ok(BinaryOp::LtEq),
        ast::BinaryOperator::Gt => Ok(BinaryOp::Gt),
        ast::BinaryOperator::GtEq => Ok(BinaryOp::GtEq),
        ast::BinaryOperator::And => Ok(BinaryOp::And),
        ast::BinaryOperator::Or => Ok(BinaryOp::Or),
        ast::BinaryOperator::StringConcat => Ok(BinaryOp::StringConcat),
        _ => Err(QueryError::NotImplemented(format!(
            "Binary operator not supported: {:?}",
            op
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, ColumnType};
    use crate::parser::{parse_sql, Statement};

    fn column_map() -> ColumnMap {
        ColumnMap::from_columns(&[
            Column::new("id", ColumnType::Integer),
            Column::new("data", ColumnType::NdArray).with_index(1),
            Column::new("label", ColumnType::Text).with_index(2),
        ])
    }

    fn select_parts(sql: &str) -> (Vec<SelectItem>, Option<SqlExpr>) {
        match parse_sql(sql).unwrap() {
            Statement::Select(select) => (select.target_list, select.where_clause),
            other => panic!("expected SELECT, got {:?}", other),
        }
    }

    #[test]
    fn test_bind_predicate() {
        let map = column_map();
        let (_, predicate) = select_parts("SELECT id FROM t WHERE (ID > 2 AND label LIKE 'car%')");
        let expr = ExprBinder::new(&map).bind_expr(&predicate.unwrap()).unwrap();

        assert_eq!(expr.to_string(), "((id > 2) AND (label LIKE 'car%'))");
    }

    #[test]
    fn test_bind_wildcard_in_table_order() {
        let map = column_map();
        let (items, _) = select_parts("SELECT * FROM t");
        let exprs = ExprBinder::new(&map).bind_select_items(&items).unwrap();

        let names: Vec<String> = exprs.iter().map(|e| e.output_name()).collect();
        assert_eq!(names, vec!["id", "data", "label"]);
    }

    #[test]
    fn test_bind_udf_call_with_alias() {
        let map = column_map();
        let (items, _) = select_parts("SELECT id, FastRCNNObjectDetector(data) AS labels FROM t");
        let exprs = ExprBinder::new(&map).bind_select_items(&items).unwrap();

        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[1].to_string(), "FASTRCNNOBJECTDETECTOR(data) AS labels");
    }

    #[test]
    fn test_unknown_column() {
        let map = column_map();
        let (items, _) = select_parts("SELECT missing FROM t");
        let err = ExprBinder::new(&map).bind_select_items(&items).unwrap_err();
        assert!(matches!(err, QueryError::ColumnNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_qualified_column_uses_last_part() {
        let map = column_map();
        let (items, _) = select_parts("SELECT t.label FROM t");
        let exprs = ExprBinder::new(&map).bind_select_items(&items).unwrap();
        assert_eq!(exprs[0].output_name(), "label");
    }

    #[test]
    fn test_constant_binder_rejects_identifiers() {
        let (_, predicate) = select_parts("SELECT 1 WHERE id = 1");
        let err = ExprBinder::constants()
            .bind_expr(&predicate.unwrap())
            .unwrap_err();
        assert!(matches!(err, QueryError::ColumnNotFound(_)));
    }

    #[test]
    fn test_number_literals() {
        let (items, _) = select_parts("SELECT 7, 2.50, -1");
        let exprs = ExprBinder::constants().bind_select_items(&items).unwrap();

        assert_eq!(exprs[0], Expr::Literal(ScalarValue::Int64(7)));
        assert!(matches!(exprs[1], Expr::Literal(ScalarValue::Decimal(_))));
        assert_eq!(exprs[2].to_string(), "(- 1)");
    }
}
