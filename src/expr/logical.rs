//! Logical connectives and the dynamic predicate composer.

use super::{Expr, LogicalOp};
use crate::error::Result;

impl Expr {
    /// Conjunction. Both operands must be predicates; user nesting is
    /// preserved in generated query text.
    pub fn and(self, rhs: Expr) -> Result<Expr> {
        self.expect_predicate("AND")?;
        rhs.expect_predicate("AND")?;
        Ok(Expr::Logical {
            op: LogicalOp::And,
            children: vec![self, rhs],
        })
    }

    /// Disjunction
    pub fn or(self, rhs: Expr) -> Result<Expr> {
        self.expect_predicate("OR")?;
        rhs.expect_predicate("OR")?;
        Ok(Expr::Logical {
            op: LogicalOp::Or,
            children: vec![self, rhs],
        })
    }

    /// Negation
    pub fn not(self) -> Result<Expr> {
        self.expect_predicate("NOT")?;
        Ok(Expr::Logical {
            op: LogicalOp::Not,
            children: vec![self],
        })
    }
}

/// Compose a variable set of optional conditions into one AND predicate.
///
/// Absent conditions are omitted entirely; they never appear as a trivial
/// true/false/null node in the output tree. Returns:
///
/// - `None` when every input is absent ("no predicate", which callers must
///   treat as match-all),
/// - the single expression unwrapped when exactly one input is present,
/// - otherwise an AND node over exactly the present conditions, in their
///   original order.
///
/// The composer never evaluates conditions against data.
pub fn compose(conditions: impl IntoIterator<Item = Option<Expr>>) -> Option<Expr> {
    let mut present: Vec<Expr> = conditions.into_iter().flatten().collect();
    match present.len() {
        0 => None,
        1 => Some(present.remove(0)),
        _ => Some(Expr::Logical {
            op: LogicalOp::And,
            children: present,
        }),
    }
}
