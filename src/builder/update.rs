//! Bulk update executor.
//!
//! Updates a filtered set of rows in one round trip, bypassing any
//! per-entity change tracking the surrounding application keeps. Callers
//! must discard or refresh cached entity state for affected rows after the
//! call returns; see [`Store::invalidate_cache`] — the core never invokes
//! it on their behalf.

use crate::error::{Error, Result};
use crate::expr::{Expr, Path};
use crate::schema::Source;
use crate::sql::compile;
use crate::store::Store;

/// Builder for a bulk update against one entity.
#[derive(Debug)]
pub struct Update {
    target: Source,
    assignments: Vec<(Path, Expr)>,
    predicate: Option<Expr>,
    err: Option<Error>,
}

impl Update {
    pub fn entity(target: &Source) -> Self {
        Self {
            target: target.clone(),
            assignments: Vec::new(),
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

    /// Assign `value` to `path`. The value expression may reference the
    /// row's own current state (e.g. `age.mul(2)`); all assignments in one
    /// update are evaluated against the pre-mutation row.
    pub fn set(mut self, path: Expr, value: Expr) -> Self {
        let path = match path {
            Expr::Path(path) => path,
            other => {
                return self.fail(Error::Configuration(format!(
                    "update target must be a field path, got {other:?}"
                )));
            }
        };
        if path.alias() != self.target.alias() {
            let message = format!(
                "path {:?} does not belong to update target {:?}",
                path.field(),
                self.target.entity()
            );
            return self.fail(Error::Configuration(message));
        }
        if !path.ty().assignable_from(value.ty()) {
            return self.fail(Error::TypeMismatch(format!(
                "cannot assign {} to field {:?} of type {}",
                value.ty(),
                path.field(),
                path.ty()
            )));
        }
        self.assignments.push((path, value));
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
    /// Matching zero rows is not an error. An empty assignment list is
    /// rejected before submission.
    pub fn execute(self, store: &impl Store) -> Result<u64> {
        if let Some(err) = self.err {
            return Err(err);
        }
        if self.assignments.is_empty() {
            return Err(Error::Configuration(
                "update requires at least one assignment".into(),
            ));
        }
        let stmt =
            compile::update_statement(&self.target, &self.assignments, self.predicate.as_ref())?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "running bulk update");
        store.run_mutation(&stmt)
    }
}
