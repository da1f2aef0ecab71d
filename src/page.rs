//! Pagination executor.
//!
//! Wraps a query into a content fetch plus a total count, eliding the
//! count query when the content page is provably the last one.

use crate::builder::select::Query;
use crate::error::{Error, Result};
use crate::projection::RowMapper;
use crate::store::Store;

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(index: u64, size: u64) -> Self {
        Self { index, size }
    }

    pub fn offset(self) -> u64 {
        self.index * self.size
    }
}

/// One page of materialized results.
///
/// Invariants: `content.len() <= size` and `total >= offset + content.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total: u64,
    pub size: u64,
    pub offset: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(self.size)
        }
    }
}

impl Query {
    /// Fetch one page of this query's results plus the total row count.
    ///
    /// The content query applies `offset = index * size` and `limit = size`
    /// atop this query, preserving predicate, joins, and ordering. When the
    /// content comes back strictly shorter than the page size — the short
    /// last page — the total is inferred as `offset + content.len()` and no
    /// count query runs. A full page gives no information about further
    /// rows, so `content.len() == size` always issues the count query.
    pub fn fetch_page<M: RowMapper>(
        &self,
        store: &impl Store,
        page: PageRequest,
        mapper: &M,
    ) -> Result<Page<M::Output>> {
        if page.size == 0 {
            return Err(Error::Configuration("page size must be positive".into()));
        }
        let offset = page.offset();

        let mut content_spec = self.spec_ref()?.clone();
        content_spec.offset = Some(offset);
        content_spec.limit = Some(page.size);
        let stmt = crate::sql::compile::select_statement(&content_spec)?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "running page query");
        let rows = store.run_query(&stmt)?;
        let content: Vec<M::Output> = rows
            .iter()
            .map(|row| mapper.map_row(row))
            .collect::<Result<_>>()?;

        let total = if (content.len() as u64) < page.size {
            offset + content.len() as u64
        } else {
            self.fetch_count(store)?
        };

        Ok(Page {
            content,
            total,
            size: page.size,
            offset,
        })
    }
}
