//! Join specifications.

use crate::expr::Expr;
use crate::schema::Source;

/// The kind of join operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Cross,
}

impl JoinKind {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// One join in a query.
///
/// `on` is the explicit on-predicate; relation joins derive it from the
/// schema-declared relation key, theta joins supply it directly against an
/// otherwise unrelated entity, cross joins carry none. `eager` is a
/// load-strategy hint, not a join kind: it requests that the target
/// entity's data be present in the same round trip, by expanding the
/// target's columns into the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub target: Source,
    pub on: Option<Expr>,
    pub eager: bool,
}
