//! Column reference resolution
//!
//! Turns `"table.column"` or `"column"` into an identifier node. Rendering
//! always goes through [`SqlSyntax::ident`], so column text supplied by a
//! caller is never printed raw.

use crate::error::DirectiveError;
use crate::parser::SqlSyntax;
use sqlparser::ast::Expr;
use std::fmt;

/// An optionally table-qualified column name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Owning table, if qualified
    pub table: Option<String>,

    /// Column name
    pub column: String,
}

impl ColumnRef {
    /// Unqualified column
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    /// Table-qualified column
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Resolve a column token
    ///
    /// Splits on the first `.`. At most one dot is accepted and neither part
    /// may be empty. Anything else in the parts (spaces, parentheses,
    /// operators) is kept literally and neutralized by identifier quoting.
    pub fn parse(token: &str) -> Result<Self, DirectiveError> {
        let invalid = || DirectiveError::InvalidColumn(token.to_string());

        match token.split_once('.') {
            None if token.is_empty() => Err(invalid()),
            None => Ok(Self::new(token)),
            Some((table, column)) => {
                if table.is_empty() || column.is_empty() || column.contains('.') {
                    return Err(invalid());
                }
                Ok(Self::qualified(table, column))
            }
        }
    }

    /// Identifier expression for this column
    pub fn to_expr(&self, syntax: &dyn SqlSyntax) -> Expr {
        match &self.table {
            Some(table) => Expr::CompoundIdentifier(vec![syntax.ident(table), syntax.ident(&self.column)]),
            None => Expr::Identifier(syntax.ident(&self.column)),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}
