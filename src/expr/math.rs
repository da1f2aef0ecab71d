//! Arithmetic operators over numeric expressions.

use super::{ArithOp, Expr, IntoExpr};
use crate::error::{Error, Result};
use crate::value::ValueType;

fn arithmetic(op: ArithOp, left: Expr, right: Expr) -> Result<Expr> {
    let (lt, rt) = (left.ty(), right.ty());
    if !lt.is_numeric() || !rt.is_numeric() {
        return Err(Error::TypeMismatch(format!(
            "arithmetic requires numeric operands, got {lt} and {rt}"
        )));
    }
    let ty = if lt == ValueType::Float || rt == ValueType::Float {
        ValueType::Float
    } else {
        ValueType::Int
    };
    Ok(Expr::Arith {
        op,
        left: Box::new(left),
        right: Box::new(right),
        ty,
    })
}

impl Expr {
    pub fn add(self, rhs: impl IntoExpr) -> Result<Expr> {
        arithmetic(ArithOp::Add, self, rhs.into_expr())
    }

    pub fn sub(self, rhs: impl IntoExpr) -> Result<Expr> {
        arithmetic(ArithOp::Sub, self, rhs.into_expr())
    }

    pub fn mul(self, rhs: impl IntoExpr) -> Result<Expr> {
        arithmetic(ArithOp::Mul, self, rhs.into_expr())
    }

    pub fn div(self, rhs: impl IntoExpr) -> Result<Expr> {
        arithmetic(ArithOp::Div, self, rhs.into_expr())
    }
}
