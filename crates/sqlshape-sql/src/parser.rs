//! SQL parsing and printing using datafusion-sqlparser-rs
//!
//! The rewriter never touches SQL text directly. It goes through a
//! [`SqlSyntax`] implementation for parsing, printing, identifier
//! construction and placeholder construction.

use sqlparser::ast::{Expr, Ident, Statement, Value};
use sqlparser::dialect::{
    AnsiDialect, Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};
use sqlparser::keywords::ALL_KEYWORDS;
use sqlparser::parser::{Parser, ParserError};
use sqlshape_core::DialectConfig;
use std::fmt;

/// The only bound-parameter symbol ever emitted
pub const PLACEHOLDER: &str = "?";

/// Parse/print/construct capability handed to the rewriter
pub trait SqlSyntax: Send + Sync {
    /// Parse exactly one statement
    fn parse(&self, sql: &str) -> Result<Statement, ParseError>;

    /// Print a statement back to SQL text
    fn serialize(&self, statement: &Statement) -> String {
        statement.to_string()
    }

    /// Build an identifier node, quoting it when needed
    fn ident(&self, name: &str) -> Ident;

    /// Build the placeholder node for the `ordinal`-th (1-based) bound argument
    fn placeholder(&self, _ordinal: usize) -> Expr {
        Expr::Value(Value::Placeholder(PLACEHOLDER.to_string()))
    }
}

/// SQL parser with configurable dialect
#[derive(Debug)]
pub struct SqlParser {
    dialect: Box<dyn Dialect + Send + Sync>,
    quote: char,
}

impl SqlParser {
    /// Create a new SQL parser with the default (MySQL) dialect
    pub fn new() -> Self {
        Self::mysql()
    }

    /// Create a SQL parser for MySQL
    pub fn mysql() -> Self {
        Self {
            dialect: Box::new(MySqlDialect {}),
            quote: '`',
        }
    }

    /// Create a SQL parser for the generic dialect
    pub fn generic() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
            quote: '"',
        }
    }

    /// Create a SQL parser for PostgreSQL
    pub fn postgres() -> Self {
        Self {
            dialect: Box::new(PostgreSqlDialect {}),
            quote: '"',
        }
    }

    /// Create a SQL parser for SQLite
    pub fn sqlite() -> Self {
        Self {
            dialect: Box::new(SQLiteDialect {}),
            quote: '"',
        }
    }

    /// Create a SQL parser for ANSI SQL
    pub fn ansi() -> Self {
        Self {
            dialect: Box::new(AnsiDialect {}),
            quote: '"',
        }
    }

    /// Create a parser from a dialect config
    pub fn from_dialect(dialect: &DialectConfig) -> Self {
        match dialect {
            DialectConfig::MySql => Self::mysql(),
            DialectConfig::Generic => Self::generic(),
            DialectConfig::Postgres => Self::postgres(),
            DialectConfig::Sqlite => Self::sqlite(),
            DialectConfig::Ansi => Self::ansi(),
        }
    }

    /// Quote character used for identifiers that cannot be printed bare
    pub fn quote_style(&self) -> char {
        self.quote
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlSyntax for SqlParser {
    fn parse(&self, sql: &str) -> Result<Statement, ParseError> {
        let mut statements = Parser::parse_sql(&*self.dialect, sql).map_err(|e| ParseError {
            sql: sql.to_string(),
            error: e,
        })?;

        if statements.len() != 1 {
            return Err(ParseError {
                sql: sql.to_string(),
                error: ParserError::ParserError(format!(
                    "expected exactly one statement, found {}",
                    statements.len()
                )),
            });
        }

        Ok(statements.remove(0))
    }

    fn ident(&self, name: &str) -> Ident {
        if is_bare_identifier(name) {
            Ident::new(name)
        } else {
            Ident::with_quote(self.quote, name)
        }
    }
}

/// Plain ASCII identifier that is not an SQL keyword
fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');

    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_keyword(name)
}

fn is_keyword(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    ALL_KEYWORDS.binary_search(&upper.as_str()).is_ok()
}

/// SQL parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Original SQL string
    pub sql: String,

    /// Parser error from sqlparser
    pub error: ParserError,
}

impl ParseError {
    /// Check if this is an unsupported syntax error
    pub fn is_unsupported_syntax(&self) -> bool {
        let error_msg = self.error.to_string().to_lowercase();
        error_msg.contains("expected") || error_msg.contains("unexpected")
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQL parse error: {}", self.error)
    }
}

impl std::error::Error for ParseError {}
