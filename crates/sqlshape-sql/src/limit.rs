//! LIMIT / OFFSET merging
//!
//! Structural edits on a query block's row count and offset. No SQL text is
//! parsed here.

use sqlparser::ast::{Expr, Offset, OffsetRows, Query, Value};
use sqlshape_core::DEFAULT_ROW_COUNT;

/// Requested LIMIT and OFFSET values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitMerge {
    pub limit: Option<u64>,
    pub offset: Option<u64>,

    /// Row count used when only an offset is requested; 0 falls back to 100
    pub default_row_count: u64,
}

impl LimitMerge {
    /// Check if neither value is set
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }

    /// Apply to a query block
    ///
    /// A new LIMIT created for a row count starts at offset 0. A new LIMIT
    /// created for an offset gets the default row count.
    pub fn apply(&self, query: &mut Query) {
        if let Some(limit) = self.limit {
            if !has_limit_clause(query) {
                query.offset = Some(offset_node(0));
            }
            query.limit = Some(number(limit));
        }

        if let Some(offset) = self.offset {
            if !has_limit_clause(query) {
                query.limit = Some(number(self.row_count()));
            }
            match &mut query.offset {
                Some(existing) => existing.value = number(offset),
                None => query.offset = Some(offset_node(offset)),
            }
        }
    }

    fn row_count(&self) -> u64 {
        if self.default_row_count > 0 {
            self.default_row_count
        } else {
            DEFAULT_ROW_COUNT
        }
    }
}

fn has_limit_clause(query: &Query) -> bool {
    query.limit.is_some() || query.offset.is_some()
}

fn number(n: u64) -> Expr {
    Expr::Value(Value::Number(n.to_string(), false))
}

fn offset_node(n: u64) -> Offset {
    Offset {
        value: number(n),
        rows: OffsetRows::None,
    }
}
