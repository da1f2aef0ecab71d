//! Select builder and fetch modes.
//!
//! Assembling a [`QuerySpec`] is pure; submitting it through one of the
//! `fetch_*` terminals is the only side-effecting step, and always goes
//! through an explicit [`Store`] handle. The builder records the first
//! construction error it sees and surfaces it at submission, so chained
//! construction stays fluent.

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::join::{JoinKind, JoinSpec};
use crate::row::Row;
use crate::schema::{RelationRef, Source};
use crate::sql::compile;
use crate::store::Store;
use crate::value::ValueType;

/// Sort direction for one ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Null placement for one ordering key. `Default` leaves placement to the
/// store; `First`/`Last` render explicitly and win regardless of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullPlacement {
    #[default]
    Default,
    First,
    Last,
}

/// One ordering key: expression, direction, and per-key null placement.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderKey {
    pub expr: Expr,
    pub direction: Direction,
    pub nulls: NullPlacement,
}

impl OrderKey {
    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullPlacement::First;
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullPlacement::Last;
        self
    }
}

impl Expr {
    /// Ascending ordering key over this expression.
    pub fn asc(self) -> OrderKey {
        OrderKey {
            expr: self,
            direction: Direction::Asc,
            nulls: NullPlacement::Default,
        }
    }

    /// Descending ordering key over this expression.
    pub fn desc(self) -> OrderKey {
        OrderKey {
            expr: self,
            direction: Direction::Desc,
            nulls: NullPlacement::Default,
        }
    }
}

/// A complete, immutable query description.
///
/// An empty selection means "select the whole root entity". Value object:
/// built by [`Query`], then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub(crate) selection: Vec<Expr>,
    pub(crate) sources: Vec<Source>,
    pub(crate) joins: Vec<JoinSpec>,
    pub(crate) predicate: Option<Expr>,
    pub(crate) group_by: Vec<Expr>,
    pub(crate) having: Option<Expr>,
    pub(crate) order_by: Vec<OrderKey>,
    pub(crate) offset: Option<u64>,
    pub(crate) limit: Option<u64>,
}

impl QuerySpec {
    fn new() -> Self {
        Self {
            selection: Vec::new(),
            sources: Vec::new(),
            joins: Vec::new(),
            predicate: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    pub fn selection(&self) -> &[Expr] {
        &self.selection
    }

    pub fn predicate(&self) -> Option<&Expr> {
        self.predicate.as_ref()
    }

    /// The value type of a single-column selection, for scalar subqueries.
    pub fn scalar_type(&self) -> Result<ValueType> {
        match self.selection.as_slice() {
            [only] => Ok(only.ty()),
            other => Err(Error::Configuration(format!(
                "scalar subquery requires exactly one selected column, found {}",
                other.len()
            ))),
        }
    }
}

/// Fluent query builder over an internal [`QuerySpec`].
#[derive(Debug)]
pub struct Query {
    spec: QuerySpec,
    err: Option<Error>,
}

impl Query {
    /// Start a query with an explicit selection list.
    pub fn select(columns: impl IntoIterator<Item = Expr>) -> Query {
        let mut spec = QuerySpec::new();
        spec.selection = columns.into_iter().collect();
        Query { spec, err: None }
    }

    /// Start a whole-entity query: every field of `source` is selected.
    pub fn from_entity(source: &Source) -> Query {
        let mut spec = QuerySpec::new();
        spec.sources.push(source.clone());
        Query { spec, err: None }
    }

    fn fail(mut self, err: Error) -> Self {
        if self.err.is_none() {
            self.err = Some(err);
        }
        self
    }

    /// Add a source entity. Multiple sources form a cartesian product,
    /// which an explicit predicate then restricts (theta-style filtering).
    pub fn from(mut self, source: &Source) -> Self {
        self.spec.sources.push(source.clone());
        self
    }

    fn relation_join(mut self, kind: JoinKind, rel: &RelationRef, target: &Source, eager: bool) -> Self {
        if rel.target_entity() != target.entity() {
            return self.fail(Error::Configuration(format!(
                "relation targets entity {:?} but join target is {:?}",
                rel.target_entity(),
                target.entity()
            )));
        }
        match rel.key_predicate(target) {
            Ok(on) => {
                self.spec.joins.push(JoinSpec {
                    kind,
                    target: target.clone(),
                    on: Some(on),
                    eager,
                });
                self
            }
            Err(err) => self.fail(err),
        }
    }

    /// Inner join along a declared relation; the on-predicate comes from
    /// the schema-declared relation key.
    pub fn inner_join(self, rel: &RelationRef, target: &Source) -> Self {
        self.relation_join(JoinKind::Inner, rel, target, false)
    }

    /// Left join along a declared relation.
    pub fn left_join(self, rel: &RelationRef, target: &Source) -> Self {
        self.relation_join(JoinKind::Left, rel, target, false)
    }

    /// Inner join along a declared relation, eagerly fetching the target's
    /// columns in the same round trip.
    pub fn eager_join(self, rel: &RelationRef, target: &Source) -> Self {
        self.relation_join(JoinKind::Inner, rel, target, true)
    }

    /// Left join along a declared relation, eagerly fetching the target.
    pub fn left_eager_join(self, rel: &RelationRef, target: &Source) -> Self {
        self.relation_join(JoinKind::Left, rel, target, true)
    }

    /// Join an unrelated entity on an arbitrary predicate. No schema
    /// relation needs to exist between the two entities.
    pub fn theta_join(mut self, target: &Source, on: Expr) -> Self {
        if let Err(err) = on.expect_predicate("JOIN ON") {
            return self.fail(err);
        }
        self.spec.joins.push(JoinSpec {
            kind: JoinKind::Inner,
            target: target.clone(),
            on: Some(on),
            eager: false,
        });
        self
    }

    /// Left join an unrelated entity on an arbitrary predicate.
    pub fn left_theta_join(mut self, target: &Source, on: Expr) -> Self {
        if let Err(err) = on.expect_predicate("JOIN ON") {
            return self.fail(err);
        }
        self.spec.joins.push(JoinSpec {
            kind: JoinKind::Left,
            target: target.clone(),
            on: Some(on),
            eager: false,
        });
        self
    }

    /// Cross join with no matching condition.
    pub fn cross_join(mut self, target: &Source) -> Self {
        self.spec.joins.push(JoinSpec {
            kind: JoinKind::Cross,
            target: target.clone(),
            on: None,
            eager: false,
        });
        self
    }

    /// Replace the most recent join's on-predicate with an explicit one.
    pub fn on(mut self, predicate: Expr) -> Self {
        if let Err(err) = predicate.expect_predicate("JOIN ON") {
            return self.fail(err);
        }
        match self.spec.joins.last_mut() {
            Some(join) => {
                join.on = Some(predicate);
                self
            }
            None => self.fail(Error::Configuration("on() requires a preceding join".into())),
        }
    }

    /// Add an optional condition. Absent conditions are omitted entirely;
    /// repeated calls AND together in call order, so a set of dynamic
    /// filters composes without any trivially-true placeholders.
    pub fn filter(self, condition: Option<Expr>) -> Self {
        match condition {
            Some(condition) => self.filter_expr(condition),
            None => self,
        }
    }

    /// Add a condition, AND-ed with any already present.
    pub fn filter_expr(mut self, condition: Expr) -> Self {
        if let Err(err) = condition.expect_predicate("WHERE") {
            return self.fail(err);
        }
        self.spec.predicate = match self.spec.predicate.take() {
            None => Some(condition),
            Some(existing) => match existing.and(condition) {
                Ok(combined) => Some(combined),
                Err(err) => return self.fail(err),
            },
        };
        self
    }

    /// Group rows by the given expressions.
    pub fn group_by(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        self.spec.group_by.extend(exprs);
        self
    }

    /// Restrict groups after grouping.
    pub fn having(mut self, condition: Expr) -> Self {
        if let Err(err) = condition.expect_predicate("HAVING") {
            return self.fail(err);
        }
        self.spec.having = Some(condition);
        self
    }

    /// Append an ordering key. Placement of absent sort keys is a property
    /// of each individual key, not of the whole ordering.
    pub fn order_by(mut self, key: OrderKey) -> Self {
        self.spec.order_by.push(key);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.spec.offset = Some(n);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.spec.limit = Some(n);
        self
    }

    /// The explicit selection list (empty for whole-entity queries).
    pub fn selection(&self) -> &[Expr] {
        &self.spec.selection
    }

    /// Finish construction, surfacing any deferred builder error.
    pub fn into_spec(self) -> Result<QuerySpec> {
        if let Some(err) = self.err {
            return Err(err);
        }
        if self.spec.sources.is_empty() {
            return Err(Error::Configuration("query has no source entity".into()));
        }
        Ok(self.spec)
    }

    pub(crate) fn spec_ref(&self) -> Result<&QuerySpec> {
        if let Some(err) = &self.err {
            return Err(err.duplicate());
        }
        if self.spec.sources.is_empty() {
            return Err(Error::Configuration("query has no source entity".into()));
        }
        Ok(&self.spec)
    }

    /// Turn this query into a scalar subquery expression. Requires exactly
    /// one typed selection column; usable in selection, comparison, and
    /// membership position, correlated or not.
    pub fn scalar(self) -> Result<Expr> {
        let spec = self.into_spec()?;
        let ty = spec.scalar_type()?;
        Ok(Expr::Subquery {
            query: Box::new(spec),
            ty,
        })
    }

    /// Fetch the complete ordered result sequence. An empty result is valid.
    pub fn fetch_all(&self, store: &impl Store) -> Result<Vec<Row>> {
        let spec = self.spec_ref()?;
        let stmt = compile::select_statement(spec)?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "running query");
        store.run_query(&stmt)
    }

    /// Fetch the first row, if any. Never fails on an empty result.
    pub fn fetch_first(&self, store: &impl Store) -> Result<Option<Row>> {
        let mut spec = self.spec_ref()?.clone();
        spec.limit = Some(1);
        let stmt = compile::select_statement(&spec)?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "running query");
        let mut rows = store.run_query(&stmt)?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    /// Fetch exactly one row: [`Error::NotFound`] on zero rows,
    /// [`Error::TooManyResults`] on more than one.
    pub fn fetch_one(&self, store: &impl Store) -> Result<Row> {
        let mut rows = self.fetch_all(store)?;
        match rows.len() {
            0 => Err(Error::NotFound),
            1 => Ok(rows.remove(0)),
            _ => Err(Error::TooManyResults),
        }
    }

    /// Run the count variant of this query: same predicate and joins, no
    /// ordering/offset/limit, selection replaced by a row-count aggregate.
    pub fn fetch_count(&self, store: &impl Store) -> Result<u64> {
        let spec = self.spec_ref()?;
        let stmt = compile::count_statement(spec)?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "running count query");
        store.run_count(&stmt)
    }
}
