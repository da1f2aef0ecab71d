//! String operators.
//!
//! Concatenation is Text-only; mixing in a numeric expression requires the
//! explicit [`Expr::to_text`] conversion. There is no silent coercion
//! between numeric and text expressions.

use super::{Expr, IntoExpr};
use crate::error::{Error, Result};
use crate::value::ValueType;

impl Expr {
    /// String concatenation. Flattens chained concats into one node so the
    /// generated text stays minimal.
    pub fn concat(self, rhs: impl IntoExpr) -> Result<Expr> {
        let rhs = rhs.into_expr();
        for part in [&self, &rhs] {
            if part.ty() != ValueType::Text {
                return Err(Error::TypeMismatch(format!(
                    "concat requires Text operands, got {}; convert explicitly with to_text()",
                    part.ty()
                )));
            }
        }
        let mut parts = match self {
            Expr::Concat { parts } => parts,
            other => vec![other],
        };
        parts.push(rhs);
        Ok(Expr::Concat { parts })
    }

    /// Explicit conversion of a numeric expression to Text. Text expressions
    /// pass through unchanged.
    pub fn to_text(self) -> Result<Expr> {
        match self.ty() {
            ValueType::Text => Ok(self),
            ty if ty.is_numeric() => Ok(Expr::Cast {
                expr: Box::new(self),
                to: ValueType::Text,
            }),
            ty => Err(Error::TypeMismatch(format!(
                "to_text is not defined for {ty}"
            ))),
        }
    }
}
