//! ORDER BY and GROUP BY specs
//!
//! Specs are comma-separated column lists. For ORDER BY only the column
//! token and a trailing `asc`/`desc` direction are honored; whatever else a
//! caller appends after the column is dropped, never printed.

use crate::column::ColumnRef;
use crate::error::DirectiveError;
use crate::parser::SqlSyntax;
use sqlparser::ast::{GroupByExpr, OrderBy, OrderByExpr};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Direction from the text after the column token
    ///
    /// Only a case-insensitive `desc` suffix selects descending order.
    fn from_suffix(text: &str) -> Self {
        if text.to_ascii_lowercase().ends_with("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// One ORDER BY entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub column: ColumnRef,
    pub direction: Direction,
}

/// Parsed ORDER BY spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    items: Vec<OrderItem>,
}

impl OrderSpec {
    /// Parse `"column [ASC|DESC], ..."`
    ///
    /// Empty entries are skipped; a spec with no entry at all is rejected.
    pub fn parse(spec: &str) -> Result<Self, DirectiveError> {
        let mut items = Vec::new();

        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (column, direction) = match part.split_once(' ') {
                Some((column, rest)) => (column, Direction::from_suffix(rest)),
                None => (part, Direction::Asc),
            };

            items.push(OrderItem {
                column: ColumnRef::parse(column)?,
                direction,
            });
        }

        if items.is_empty() {
            return Err(DirectiveError::EmptySpec {
                clause: "ORDER BY",
                spec: spec.to_string(),
            });
        }

        Ok(Self { items })
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// ORDER BY node replacing any existing one
    pub fn to_order_by(&self, syntax: &dyn SqlSyntax) -> OrderBy {
        OrderBy {
            exprs: self
                .items
                .iter()
                .map(|item| OrderByExpr {
                    expr: item.column.to_expr(syntax),
                    asc: Some(item.direction == Direction::Asc),
                    nulls_first: None,
                    with_fill: None,
                })
                .collect(),
            interpolate: None,
        }
    }
}

/// Parsed GROUP BY spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    columns: Vec<ColumnRef>,
}

impl GroupSpec {
    /// Parse `"column, table.column, ..."`
    ///
    /// Any entry that does not resolve to a column rejects the whole spec.
    pub fn parse(spec: &str) -> Result<Self, DirectiveError> {
        let columns = spec
            .split(',')
            .map(|part| ColumnRef::parse(part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    /// GROUP BY node replacing any existing one
    pub fn to_group_by(&self, syntax: &dyn SqlSyntax) -> GroupByExpr {
        GroupByExpr::Expressions(
            self.columns.iter().map(|column| column.to_expr(syntax)).collect(),
            vec![],
        )
    }
}
