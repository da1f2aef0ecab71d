//! Aggregate functions.

use super::Expr;
use crate::error::{Error, Result};
use crate::value::ValueType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// `COUNT(*)` — counts rows, including those whose columns are all null.
pub fn count_all() -> Expr {
    Expr::Aggregate {
        kind: AggregateKind::Count,
        expr: None,
        ty: ValueType::Int,
    }
}

/// `COUNT(expr)` — counts non-null values of any type.
pub fn count(expr: Expr) -> Expr {
    Expr::Aggregate {
        kind: AggregateKind::Count,
        expr: Some(Box::new(expr)),
        ty: ValueType::Int,
    }
}

fn numeric_aggregate(kind: AggregateKind, expr: Expr, ty: ValueType) -> Result<Expr> {
    if !expr.ty().is_numeric() {
        return Err(Error::TypeMismatch(format!(
            "{kind:?} requires a numeric expression, got {}",
            expr.ty()
        )));
    }
    Ok(Expr::Aggregate {
        kind,
        expr: Some(Box::new(expr)),
        ty,
    })
}

/// `SUM(expr)` over a numeric expression; keeps the operand's type.
pub fn sum(expr: Expr) -> Result<Expr> {
    let ty = expr.ty();
    numeric_aggregate(AggregateKind::Sum, expr, ty)
}

/// `AVG(expr)` over a numeric expression; always Float.
pub fn avg(expr: Expr) -> Result<Expr> {
    numeric_aggregate(AggregateKind::Avg, expr, ValueType::Float)
}

fn extremum(kind: AggregateKind, expr: Expr) -> Result<Expr> {
    if !expr.ty().is_orderable() {
        return Err(Error::TypeMismatch(format!(
            "{kind:?} requires an orderable expression, got {}",
            expr.ty()
        )));
    }
    let ty = expr.ty();
    Ok(Expr::Aggregate {
        kind,
        expr: Some(Box::new(expr)),
        ty,
    })
}

/// `MIN(expr)` over an orderable expression.
pub fn min(expr: Expr) -> Result<Expr> {
    extremum(AggregateKind::Min, expr)
}

/// `MAX(expr)` over an orderable expression.
pub fn max(expr: Expr) -> Result<Expr> {
    extremum(AggregateKind::Max, expr)
}
