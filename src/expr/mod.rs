//! Typed expression model.
//!
//! Expressions are immutable trees over a closed set of node kinds. Every
//! combining constructor type-checks its operands and fails with
//! [`Error::TypeMismatch`](crate::Error::TypeMismatch) at construction time,
//! before anything reaches the store. Translation to query text lives in
//! [`crate::sql::compile`] and matches these kinds exhaustively.

mod agg;
mod case;
mod cmp;
mod logical;
mod math;
mod string;

pub use agg::{AggregateKind, avg, count, count_all, max, min, sum};
pub use case::{CaseBuilder, case};
pub use logical::compose;

use crate::builder::select::QuerySpec;
use crate::error::{Error, Result};
use crate::value::{Value, ValueType};

/// A typed reference to an entity field, rooted at a query alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub(crate) alias: String,
    pub(crate) field: String,
    pub(crate) ty: ValueType,
}

impl Path {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// The expression node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Path(Path),
    Literal(Value),
    Cmp {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        children: Vec<Expr>,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    InList {
        expr: Box<Expr>,
        items: Vec<Expr>,
    },
    InSubquery {
        expr: Box<Expr>,
        query: Box<QuerySpec>,
    },
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
        ty: ValueType,
    },
    Concat {
        parts: Vec<Expr>,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
    },
    Cast {
        expr: Box<Expr>,
        to: ValueType,
    },
    Case {
        branches: Vec<(Expr, Expr)>,
        default: Box<Expr>,
        ty: ValueType,
    },
    Aggregate {
        kind: AggregateKind,
        // None only for COUNT(*)
        expr: Option<Box<Expr>>,
        ty: ValueType,
    },
    Subquery {
        query: Box<QuerySpec>,
        ty: ValueType,
    },
    Aliased {
        expr: Box<Expr>,
        alias: String,
    },
}

impl Expr {
    /// The inferred value type of this expression.
    pub fn ty(&self) -> ValueType {
        match self {
            Expr::Path(path) => path.ty,
            // Literals are never Null by construction, see `lit`
            Expr::Literal(value) => value.value_type().unwrap_or(ValueType::Text),
            Expr::Cmp { .. }
            | Expr::Logical { .. }
            | Expr::Between { .. }
            | Expr::InList { .. }
            | Expr::InSubquery { .. }
            | Expr::IsNull { .. }
            | Expr::Like { .. } => ValueType::Bool,
            Expr::Arith { ty, .. }
            | Expr::Case { ty, .. }
            | Expr::Aggregate { ty, .. }
            | Expr::Subquery { ty, .. } => *ty,
            Expr::Concat { .. } => ValueType::Text,
            Expr::Cast { to, .. } => *to,
            Expr::Aliased { expr, .. } => expr.ty(),
        }
    }

    /// The output label this expression carries: its declared alias, or the
    /// field name for a bare path. Used for field-strategy projection and
    /// label-addressed tuple access.
    pub fn label(&self) -> Option<&str> {
        match self {
            Expr::Aliased { alias, .. } => Some(alias),
            Expr::Path(path) => Some(&path.field),
            _ => None,
        }
    }

    /// Rename this expression for output. The alias is retained through
    /// projection and row access.
    pub fn alias(self, alias: impl Into<String>) -> Expr {
        Expr::Aliased {
            expr: Box::new(self),
            alias: alias.into(),
        }
    }

    /// Whether this expression is a boolean predicate.
    pub(crate) fn expect_predicate(&self, context: &str) -> Result<()> {
        if self.ty() == ValueType::Bool {
            Ok(())
        } else {
            Err(Error::TypeMismatch(format!(
                "{context} requires a Bool expression, got {}",
                self.ty()
            )))
        }
    }
}

/// A literal expression.
///
/// Accepts anything convertible into [`Value`]; there is deliberately no
/// conversion from unit/absent values, so literals are never Null.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// Conversion into an expression, so comparison operands can be given as
/// plain Rust values.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for i64 {
    fn into_expr(self) -> Expr {
        lit(self)
    }
}

impl IntoExpr for i32 {
    fn into_expr(self) -> Expr {
        lit(self)
    }
}

impl IntoExpr for f64 {
    fn into_expr(self) -> Expr {
        lit(self)
    }
}

impl IntoExpr for &str {
    fn into_expr(self) -> Expr {
        lit(self)
    }
}

impl IntoExpr for String {
    fn into_expr(self) -> Expr {
        lit(self)
    }
}

impl IntoExpr for bool {
    fn into_expr(self) -> Expr {
        lit(self)
    }
}
