//! Result rows.
//!
//! A [`Row`] is the tuple-strategy projection: values addressable by
//! position or by the label the source expression carried (its declared
//! alias, or the field name for a bare path). Retrieving an absent key
//! fails with [`Error::UnknownProjectionKey`](crate::Error::UnknownProjectionKey).

use crate::error::{Error, Result};
use crate::value::Value;
use std::sync::Arc;

/// One materialized result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
    labels: Arc<[Option<String>]>,
}

impl Row {
    pub fn new(values: Vec<Value>, labels: Arc<[Option<String>]>) -> Self {
        Self { values, labels }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Value at a position.
    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values
            .get(index)
            .ok_or_else(|| Error::UnknownProjectionKey(format!("position {index}")))
    }

    /// Value under a label, matched case-sensitively against the first
    /// column that declared it.
    pub fn get_named(&self, label: &str) -> Result<&Value> {
        let index = self
            .labels
            .iter()
            .position(|l| l.as_deref() == Some(label))
            .ok_or_else(|| Error::UnknownProjectionKey(format!("label {label:?}")))?;
        self.get(index)
    }

    /// The label of each column, in selection order.
    pub fn labels(&self) -> &[Option<String>] {
        &self.labels
    }
}
