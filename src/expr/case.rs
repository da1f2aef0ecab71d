//! Searched CASE expressions.
//!
//! Branches evaluate in declaration order; the first matching condition
//! wins. The default is mandatory: a CASE can only be finished with
//! [`CaseBuilder::otherwise`], never with an implicit null fallback.

use super::{Expr, IntoExpr};
use crate::error::{Error, Result};
use crate::value::ValueType;

/// Start building a searched CASE expression.
pub fn case() -> CaseBuilder {
    CaseBuilder {
        branches: Vec::new(),
        ty: None,
    }
}

/// Accumulates WHEN branches and the unified result type.
#[derive(Debug, Clone)]
pub struct CaseBuilder {
    branches: Vec<(Expr, Expr)>,
    ty: Option<ValueType>,
}

fn unify(current: ValueType, next: ValueType) -> Result<ValueType> {
    if current == next {
        Ok(current)
    } else if current.is_numeric() && next.is_numeric() {
        Ok(ValueType::Float)
    } else {
        Err(Error::TypeMismatch(format!(
            "CASE branch result {next} is incompatible with {current}"
        )))
    }
}

impl CaseBuilder {
    /// Add a WHEN branch. The first branch establishes the result type;
    /// later branches must be compatible with it.
    pub fn when(mut self, condition: Expr, result: impl IntoExpr) -> Result<Self> {
        condition.expect_predicate("CASE WHEN")?;
        let result = result.into_expr();
        self.ty = Some(match self.ty {
            None => result.ty(),
            Some(current) => unify(current, result.ty())?,
        });
        self.branches.push((condition, result));
        Ok(self)
    }

    /// Finish with the mandatory default branch.
    pub fn otherwise(self, default: impl IntoExpr) -> Result<Expr> {
        let Some(ty) = self.ty else {
            return Err(Error::Configuration(
                "CASE requires at least one WHEN branch".into(),
            ));
        };
        let default = default.into_expr();
        let ty = unify(ty, default.ty())?;
        Ok(Expr::Case {
            branches: self.branches,
            default: Box::new(default),
            ty,
        })
    }
}
