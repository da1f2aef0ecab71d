//! Bulk delete executor.
//!
//! Same cache-consistency contract as bulk update: the mutation bypasses
//! per-entity change tracking, and invalidating any in-process cache
//! afterward is the caller's responsibility.

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::schema::Source;
use crate::sql::compile;
use crate::store::Store;

/// Builder for a bulk delete against one entity.
#[derive(Debug)]
pub struct Delete {
    target: Source,
    predicate: Option<Expr>,
    err: Option<Error>,
}

impl Delete {
    pub fn from(target: &Source) -> Self {
        Self {
            target: target.clone(),
            predicate: None,
            err: None,
        }
    }

    fn fail(mut self, err: Error) -> Self {
        if self.err.is_none() {
            self.err = Some(err);
        }
        self
    }

    /// Optional row filter; absent means "all rows".
    pub fn filter(self, condition: Option<Expr>) -> Self {
        match condition {
            Some(condition) => self.filter_expr(condition),
            None => self,
        }
    }

    pub fn filter_expr(mut self, condition: Expr) -> Self {
        if let Err(err) = condition.expect_predicate("WHERE") {
            return self.fail(err);
        }
        self.predicate = match self.predicate.take() {
            None => Some(condition),
            Some(existing) => match existing.and(condition) {
                Ok(combined) => Some(combined),
                Err(err) => return self.fail(err),
            },
        };
        self
    }

    /// Execute in a single round trip and return the affected-row count.
    /// Matching zero rows is not an error.
    pub fn execute(self, store: &impl Store) -> Result<u64> {
        if let Some(err) = self.err {
            return Err(err);
        }
        let stmt = compile::delete_statement(&self.target, self.predicate.as_ref())?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "running bulk delete");
        store.run_mutation(&stmt)
    }
}
