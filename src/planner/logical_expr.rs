//! Logical expression types

use crate::catalog::{Column, ColumnType};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use std::fmt;

/// Scalar value for literals
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(OrderedFloat<f64>),
    Decimal(Decimal),
    Utf8(String),
}

impl ScalarValue {
    pub fn data_type(&self) -> Option<ColumnType> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Boolean(_) => Some(ColumnType::Boolean),
            ScalarValue::Int64(_) => Some(ColumnType::Integer),
            ScalarValue::Float64(_) | ScalarValue::Decimal(_) => Some(ColumnType::Float),
            ScalarValue::Utf8(_) => Some(ColumnType::Text),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Boolean(v) => write!(f, "{}", v),
            ScalarValue::Int64(v) => write!(f, "{}", v),
            ScalarValue::Float64(v) => write!(f, "{}", v),
            ScalarValue::Decimal(v) => write!(f, "{}", v),
            ScalarValue::Utf8(v) => write!(f, "'{}'", v),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // Logical
    And,
    Or,
    // String
    Like,
    NotLike,
    StringConcat,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::Like
                | BinaryOp::NotLike
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Subtract => write!(f, "-"),
            BinaryOp::Multiply => write!(f, "*"),
            BinaryOp::Divide => write!(f, "/"),
            BinaryOp::Modulo => write!(f, "%"),
            BinaryOp::Eq => write!(f, "="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::LtEq => write!(f, "<="),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::GtEq => write!(f, ">="),
            BinaryOp::And => write!(f, "AND"),
            BinaryOp::Or => write!(f, "OR"),
            BinaryOp::Like => write!(f, "LIKE"),
            BinaryOp::NotLike => write!(f, "NOT LIKE"),
            BinaryOp::StringConcat => write!(f, "||"),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "NOT"),
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::IsNull => write!(f, "IS NULL"),
            UnaryOp::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// Bound expression; column references carry their catalog column
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference
    Column(Column),

    /// Literal value
    Literal(ScalarValue),

    /// Binary operation
    BinaryExpr {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Unary operation
    UnaryExpr {
        op: UnaryOp,
        expr: Box<Expr>,
    },

    /// Function call, UDFs included. Name is upper-cased.
    Function {
        name: String,
        args: Vec<Expr>,
    },

    /// IN expression
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// BETWEEN expression
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// Alias
    Alias {
        expr: Box<Expr>,
        name: String,
    },
}

impl Expr {
    /// Create a column reference
    pub fn column(column: Column) -> Self {
        Expr::Column(column)
    }

    /// Create a literal
    pub fn literal(value: ScalarValue) -> Self {
        Expr::Literal(value)
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into().to_uppercase(),
            args,
        }
    }

    /// Create an alias
    pub fn alias(self, name: impl Into<String>) -> Self {
        Expr::Alias {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    pub fn binary(self, op: BinaryOp, other: Expr) -> Self {
        Expr::BinaryExpr {
            left: Box::new(self),
            op,
            right: Box::new(other),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::UnaryExpr {
            op,
            expr: Box::new(expr),
        }
    }

    /// Binary operation helpers
    pub fn eq(self, other: Expr) -> Self {
        self.binary(BinaryOp::Eq, other)
    }

    pub fn gt(self, other: Expr) -> Self {
        self.binary(BinaryOp::Gt, other)
    }

    pub fn lt(self, other: Expr) -> Self {
        self.binary(BinaryOp::Lt, other)
    }

    pub fn and(self, other: Expr) -> Self {
        self.binary(BinaryOp::And, other)
    }

    pub fn or(self, other: Expr) -> Self {
        self.binary(BinaryOp::Or, other)
    }

    /// Get the output name for this expression
    pub fn output_name(&self) -> String {
        match self {
            Expr::Column(col) => col.name.clone(),
            Expr::Alias { name, .. } => name.clone(),
            Expr::Function { name, .. } => name.clone(),
            other => other.to_string(),
        }
    }

    /// Result type when it can be known before execution.
    /// UDF results are only known at run time.
    pub fn data_type(&self) -> Option<ColumnType> {
        match self {
            Expr::Column(col) => Some(col.col_type),
            Expr::Literal(v) => v.data_type(),
            Expr::BinaryExpr { left, op, right } => match op {
                BinaryOp::And | BinaryOp::Or => Some(ColumnType::Boolean),
                op if op.is_comparison() => Some(ColumnType::Boolean),
                BinaryOp::StringConcat => Some(ColumnType::Text),
                _ => match (left.data_type(), right.data_type()) {
                    (Some(ColumnType::Float), _) | (_, Some(ColumnType::Float)) => {
                        Some(ColumnType::Float)
                    }
                    (Some(ColumnType::Integer), Some(ColumnType::Integer)) => {
                        Some(ColumnType::Integer)
                    }
                    _ => None,
                },
            },
            Expr::UnaryExpr { op, expr } => match op {
                UnaryOp::Negate => expr.data_type(),
                _ => Some(ColumnType::Boolean),
            },
            Expr::Function { .. } => None,
            Expr::InList { .. } | Expr::Between { .. } => Some(ColumnType::Boolean),
            Expr::Alias { expr, .. } => expr.data_type(),
        }
    }

    /// Whether this expression calls a function anywhere
    pub fn contains_function(&self) -> bool {
        match self {
            Expr::Function { .. } => true,
            Expr::Column(_) | Expr::Literal(_) => false,
            Expr::BinaryExpr { left, right, .. } => {
                left.contains_function() || right.contains_function()
            }
            Expr::UnaryExpr { expr, .. } | Expr::Alias { expr, .. } => expr.contains_function(),
            Expr::InList { expr, list, .. } => {
                expr.contains_function() || list.iter().any(|e| e.contains_function())
            }
            Expr::Between {
                expr, low, high, ..
            } => expr.contains_function() || low.contains_function() || high.contains_function(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(col) => write!(f, "{}", col.name),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::BinaryExpr { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::UnaryExpr { op, expr } => match op {
                UnaryOp::IsNull | UnaryOp::IsNotNull => write!(f, "({} {})", expr, op),
                _ => write!(f, "({} {})", op, expr),
            },
            Expr::Function { name, args } => {
                let args_str: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, args_str.join(", "))
            }
            Expr::InList { expr, list, negated } => {
                let not_str = if *negated { "NOT " } else { "" };
                let list_str: Vec<String> = list.iter().map(|e| e.to_string()).collect();
                write!(f, "{} {}IN ({})", expr, not_str, list_str.join(", "))
            }
            Expr::Between { expr, low, high, negated } => {
                let not_str = if *negated { "NOT " } else { "" };
                write!(f, "{} {}BETWEEN {} AND {}", expr, not_str, low, high)
            }
            Expr::Alias { expr, name } => write!(f, "{} AS {}", expr, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> Expr {
        Expr::column(Column::new("id", ColumnType::Integer))
    }

    #[test]
    fn test_expr_builders() {
        let expr = id().eq(Expr::literal(ScalarValue::Int64(10)));
        assert!(matches!(expr, Expr::BinaryExpr { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn test_expr_display() {
        let expr = id()
            .gt(Expr::literal(ScalarValue::Int64(2)))
            .and(Expr::unary(UnaryOp::IsNotNull, id()));
        assert_eq!(expr.to_string(), "((id > 2) AND (id IS NOT NULL))");

        let call = Expr::function("fastrcnn", vec![id()]).alias("labels");
        assert_eq!(call.to_string(), "FASTRCNN(id) AS labels");
        assert_eq!(call.output_name(), "labels");
    }

    #[test]
    fn test_data_type() {
        assert_eq!(id().data_type(), Some(ColumnType::Integer));
        assert_eq!(
            id().lt(Expr::literal(ScalarValue::Int64(3))).data_type(),
            Some(ColumnType::Boolean)
        );
        assert_eq!(
            id()
                .binary(BinaryOp::Add, Expr::literal(ScalarValue::Float64(OrderedFloat(1.5))))
                .data_type(),
            Some(ColumnType::Float)
        );
        assert_eq!(Expr::function("udf", vec![]).data_type(), None);
    }

    #[test]
    fn test_function_detection() {
        let call = Expr::function("ObjectDetector", vec![id()]);
        assert!(call.clone().eq(Expr::literal(ScalarValue::Null)).contains_function());
        assert!(!id().contains_function());
    }
}
