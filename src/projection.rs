//! Projection materializer.
//!
//! Maps result rows into caller-defined shapes. The strategy is a closed
//! variant — constructor (positional) or field-by-field — resolved and
//! type-checked once when the projection is built against a query's
//! selection, never per row. The third strategy, tuple access, needs no
//! target type at all and is [`Row`] itself.

use crate::builder::select::Query;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::row::Row;
use crate::value::{Value, ValueType};
use std::marker::PhantomData;

/// A target shape rows can be materialized into: an ordered field list and
/// a positional constructor.
pub trait Shape: Sized {
    /// Diagnostic name of the shape.
    const NAME: &'static str;

    /// Target fields in declaration order.
    fn fields() -> &'static [(&'static str, ValueType)];

    /// Build one instance from values in declaration order. Uncovered
    /// fields arrive as [`Value::Null`].
    fn from_values(values: Vec<Value>) -> Result<Self>;
}

/// Maps one result row into an output value. Implemented by [`Projection`]
/// and by [`TupleMapper`]; pagination is generic over it.
pub trait RowMapper {
    type Output;

    fn map_row(&self, row: &Row) -> Result<Self::Output>;
}

/// The identity mapper: rows stay rows (tuple strategy).
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleMapper;

impl RowMapper for TupleMapper {
    type Output = Row;

    fn map_row(&self, row: &Row) -> Result<Row> {
        Ok(row.clone())
    }
}

#[derive(Debug, Clone)]
enum Strategy {
    /// Row values pass through positionally.
    Constructor,
    /// `target_index[i]` is the target field each selection column fills.
    Fields { target_index: Vec<usize> },
}

/// A validated projection from a query's selection into shape `T`.
#[derive(Debug, Clone)]
pub struct Projection<T: Shape> {
    strategy: Strategy,
    _marker: PhantomData<fn() -> T>,
}

fn selection_of(query: &Query) -> Result<&[Expr]> {
    let selection = query.selection();
    if selection.is_empty() {
        return Err(Error::Configuration(
            "projection requires an explicit selection list".into(),
        ));
    }
    Ok(selection)
}

impl<T: Shape> Projection<T> {
    /// Constructor strategy: selection columns are matched positionally
    /// against the target's field list. Arity or type mismatches are
    /// construction-time errors, never silent truncation.
    pub fn constructor(query: &Query) -> Result<Self> {
        let selection = selection_of(query)?;
        let fields = T::fields();
        if selection.len() != fields.len() {
            return Err(Error::ProjectionArity {
                expected: fields.len(),
                actual: selection.len(),
            });
        }
        for (expr, (name, target_ty)) in selection.iter().zip(fields) {
            if !target_ty.assignable_from(expr.ty()) {
                return Err(Error::ProjectionType(format!(
                    "column of type {} cannot initialize {}.{name}: {target_ty}",
                    expr.ty(),
                    T::NAME
                )));
            }
        }
        Ok(Self {
            strategy: Strategy::Constructor,
            _marker: PhantomData,
        })
    }

    /// Field strategy: every selection column's label must name a target
    /// field, case-sensitively. Unresolved or duplicate labels are
    /// configuration errors surfaced here, before any row is processed.
    pub fn fields(query: &Query) -> Result<Self> {
        let selection = selection_of(query)?;
        let fields = T::fields();
        let mut target_index = Vec::with_capacity(selection.len());
        let mut taken = vec![false; fields.len()];
        for (i, expr) in selection.iter().enumerate() {
            let label = expr.label().ok_or_else(|| {
                Error::Configuration(format!(
                    "selection column {i} carries no label; give it an alias matching a {} field",
                    T::NAME
                ))
            })?;
            let index = fields.iter().position(|(name, _)| *name == label).ok_or_else(|| {
                Error::Configuration(format!("{} has no field named {label:?}", T::NAME))
            })?;
            if taken[index] {
                return Err(Error::Configuration(format!(
                    "field {label:?} of {} is assigned twice",
                    T::NAME
                )));
            }
            taken[index] = true;
            let target_ty = fields[index].1;
            if !target_ty.assignable_from(expr.ty()) {
                return Err(Error::ProjectionType(format!(
                    "column of type {} cannot be assigned to {}.{label}: {target_ty}",
                    expr.ty(),
                    T::NAME
                )));
            }
            target_index.push(index);
        }
        Ok(Self {
            strategy: Strategy::Fields { target_index },
            _marker: PhantomData,
        })
    }

    /// Materialize one row.
    pub fn materialize(&self, row: &Row) -> Result<T> {
        match &self.strategy {
            Strategy::Constructor => {
                // Positions were validated against the explicit selection;
                // eager joins append their columns after it, so only the
                // prefix feeds the constructor.
                let arity = T::fields().len();
                if row.len() < arity {
                    return Err(Error::ProjectionArity {
                        expected: arity,
                        actual: row.len(),
                    });
                }
                T::from_values(row.values()[..arity].to_vec())
            }
            Strategy::Fields { target_index } => {
                let mut values = vec![Value::Null; T::fields().len()];
                for (i, target) in target_index.iter().enumerate() {
                    values[*target] = row.get(i)?.clone();
                }
                T::from_values(values)
            }
        }
    }

    /// Materialize a full result sequence, preserving order.
    pub fn materialize_all(&self, rows: &[Row]) -> Result<Vec<T>> {
        rows.iter().map(|row| self.materialize(row)).collect()
    }
}

impl<T: Shape> RowMapper for Projection<T> {
    type Output = T;

    fn map_row(&self, row: &Row) -> Result<T> {
        self.materialize(row)
    }
}

impl Query {
    /// Fetch all rows and materialize them through `mapper`.
    pub fn fetch_all_as<M: RowMapper>(
        &self,
        store: &impl crate::store::Store,
        mapper: &M,
    ) -> Result<Vec<M::Output>> {
        let rows = self.fetch_all(store)?;
        rows.iter().map(|row| mapper.map_row(row)).collect()
    }
}
