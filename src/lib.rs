//! Quarry — a type-safe query construction and execution layer.
//!
//! Quarry sits between application code and a relational store. Callers
//! assemble filter conditions, projections, joins, ordering, pagination,
//! and bulk mutations as typed expressions instead of concatenated query
//! text, then execute the composed query through an explicit [`Store`]
//! handle and materialize rows into plain data shapes.
//!
//! ```no_run
//! use quarry::{Cardinality, EntitySchema, Query, Registry, SqliteStore, ValueType, compose};
//!
//! # fn main() -> quarry::Result<()> {
//! let mut registry = Registry::new();
//! registry.register(
//!     EntitySchema::new("user")
//!         .field("id", ValueType::Int)
//!         .field("name", ValueType::Text)
//!         .field("age", ValueType::Int)
//!         .field("team_id", ValueType::Int)
//!         .relation("team", "team", Cardinality::One, "team_id", "id"),
//! )?;
//!
//! let store = SqliteStore::open_in_memory()?;
//! let user = registry.source("user")?;
//!
//! // Dynamic conditions: absent inputs are omitted, not rendered as TRUE
//! let name: Option<&str> = None;
//! let min_age = Some(20);
//! let predicate = compose([
//!     name.map(|n| user.field("name")?.eq(n)).transpose()?,
//!     min_age.map(|a| user.field("age")?.ge(a)).transpose()?,
//! ]);
//!
//! let adults = Query::from_entity(&user)
//!     .filter(predicate)
//!     .order_by(user.field("age")?.desc())
//!     .fetch_all(&store)?;
//! # let _ = adults;
//! # Ok(())
//! # }
//! ```
//!
//! Construction is pure and requires no synchronization; the single store
//! round trip per fetch or mutation is the only side effect. Sequencing a
//! bulk mutation against subsequent reads in the same unit of work is the
//! caller's responsibility.

mod error;
mod join;
mod page;
mod projection;
mod row;
mod schema;
mod store;
mod value;

pub mod builder;
pub mod expr;
pub mod sql;

pub use builder::{Delete, Direction, NullPlacement, OrderKey, Query, QuerySpec, Update};
pub use error::{Error, Result};
pub use expr::{
    AggregateKind, CaseBuilder, Expr, IntoExpr, Path, avg, case, compose, count, count_all, lit,
    max, min, sum,
};
pub use join::{JoinKind, JoinSpec};
pub use page::{Page, PageRequest};
pub use projection::{Projection, RowMapper, Shape, TupleMapper};
pub use row::Row;
pub use schema::{Cardinality, EntitySchema, FieldDescriptor, Registry, RelationDescriptor, RelationRef, Source};
pub use store::{Statement, Store};
pub use value::{Value, ValueType};

#[cfg(feature = "rusqlite")]
pub use store::SqliteStore;
