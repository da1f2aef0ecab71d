//! Query and mutation builders.

pub mod delete;
pub mod select;
pub mod update;

pub use delete::Delete;
pub use select::{Direction, NullPlacement, OrderKey, Query, QuerySpec};
pub use update::Update;
