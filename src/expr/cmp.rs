//! Comparison, range, membership, null, and pattern conditions.

use super::{CmpOp, Expr, IntoExpr, LogicalOp, lit};
use crate::builder::select::Query;
use crate::error::{Error, Result};
use crate::value::ValueType;

fn comparison(op: CmpOp, left: Expr, right: Expr) -> Result<Expr> {
    let (lt, rt) = (left.ty(), right.ty());
    if !lt.comparable_with(rt) {
        return Err(Error::TypeMismatch(format!(
            "cannot compare {lt} with {rt}"
        )));
    }
    let ordering = matches!(op, CmpOp::Gt | CmpOp::Ge | CmpOp::Lt | CmpOp::Le);
    if ordering && !lt.is_orderable() {
        return Err(Error::TypeMismatch(format!(
            "ordering comparison is not defined for {lt}"
        )));
    }
    Ok(Expr::Cmp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

impl Expr {
    /// Equality condition (`=`)
    pub fn eq(self, rhs: impl IntoExpr) -> Result<Expr> {
        comparison(CmpOp::Eq, self, rhs.into_expr())
    }

    /// Not-equal condition (`<>`)
    pub fn ne(self, rhs: impl IntoExpr) -> Result<Expr> {
        comparison(CmpOp::Ne, self, rhs.into_expr())
    }

    /// Greater-than condition (`>`)
    pub fn gt(self, rhs: impl IntoExpr) -> Result<Expr> {
        comparison(CmpOp::Gt, self, rhs.into_expr())
    }

    /// Greater-or-equal condition (`>=`)
    pub fn ge(self, rhs: impl IntoExpr) -> Result<Expr> {
        comparison(CmpOp::Ge, self, rhs.into_expr())
    }

    /// Less-than condition (`<`)
    pub fn lt(self, rhs: impl IntoExpr) -> Result<Expr> {
        comparison(CmpOp::Lt, self, rhs.into_expr())
    }

    /// Less-or-equal condition (`<=`)
    pub fn le(self, rhs: impl IntoExpr) -> Result<Expr> {
        comparison(CmpOp::Le, self, rhs.into_expr())
    }

    /// Range condition: `low <= self <= high`
    pub fn between(self, low: impl IntoExpr, high: impl IntoExpr) -> Result<Expr> {
        let (low, high) = (low.into_expr(), high.into_expr());
        if !self.ty().is_orderable() {
            return Err(Error::TypeMismatch(format!(
                "range is not defined for {}",
                self.ty()
            )));
        }
        for bound in [&low, &high] {
            if !self.ty().comparable_with(bound.ty()) {
                return Err(Error::TypeMismatch(format!(
                    "range bound {} is not comparable with {}",
                    bound.ty(),
                    self.ty()
                )));
            }
        }
        Ok(Expr::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
        })
    }

    /// Membership in a fixed value list. An empty list renders as a
    /// never-matching membership rather than malformed query text.
    pub fn in_list<I>(self, items: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        let items: Vec<Expr> = items.into_iter().map(IntoExpr::into_expr).collect();
        for item in &items {
            if !self.ty().comparable_with(item.ty()) {
                return Err(Error::TypeMismatch(format!(
                    "membership item {} is not comparable with {}",
                    item.ty(),
                    self.ty()
                )));
            }
        }
        Ok(Expr::InList {
            expr: Box::new(self),
            items,
        })
    }

    /// Negated membership in a fixed value list.
    pub fn not_in_list<I>(self, items: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        let inner = self.in_list(items)?;
        Ok(Expr::Logical {
            op: LogicalOp::Not,
            children: vec![inner],
        })
    }

    /// Membership in the result of a single-column subquery.
    pub fn in_query(self, query: Query) -> Result<Expr> {
        let spec = query.into_spec()?;
        let scalar_ty = spec.scalar_type()?;
        if !self.ty().comparable_with(scalar_ty) {
            return Err(Error::TypeMismatch(format!(
                "subquery column {scalar_ty} is not comparable with {}",
                self.ty()
            )));
        }
        Ok(Expr::InSubquery {
            expr: Box::new(self),
            query: Box::new(spec),
        })
    }

    /// `IS NULL` condition
    pub fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    /// `IS NOT NULL` condition
    pub fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    /// Pattern condition (`LIKE`). Both sides must be Text.
    pub fn like(self, pattern: impl IntoExpr) -> Result<Expr> {
        let pattern = pattern.into_expr();
        if self.ty() != ValueType::Text || pattern.ty() != ValueType::Text {
            return Err(Error::TypeMismatch(format!(
                "LIKE requires Text operands, got {} and {}",
                self.ty(),
                pattern.ty()
            )));
        }
        Ok(Expr::Like {
            expr: Box::new(self),
            pattern: Box::new(pattern),
        })
    }

    /// Prefix-match condition
    pub fn starts_with(self, prefix: &str) -> Result<Expr> {
        self.like(lit(format!("{prefix}%")))
    }

    /// Substring-match condition
    pub fn contains(self, needle: &str) -> Result<Expr> {
        self.like(lit(format!("%{needle}%")))
    }
}
