//! SQL statement augmentation
//!
//! This crate handles:
//! - Recording dynamic WHERE / ORDER BY / GROUP BY / LIMIT / OFFSET requests
//! - Parsing a base SELECT with datafusion-sqlparser-rs
//! - Compiling requests into AST nodes (never into SQL text)
//! - Printing the rewritten statement with `?` placeholders and the
//!   matching argument list

pub mod builder;
pub mod column;
pub mod error;
pub mod limit;
pub mod ordering;
pub mod parser;
pub mod predicate;
pub mod rewriter;

pub use builder::{Builder, Directive};
pub use column::ColumnRef;
pub use error::{BuildError, DirectiveError, RewriteError};
pub use limit::LimitMerge;
pub use ordering::{Direction, GroupSpec, OrderItem, OrderSpec};
pub use parser::{ParseError, SqlParser, SqlSyntax, PLACEHOLDER};
pub use predicate::{Operator, Positional, WhereShape};
pub use rewriter::{select_blocks, Rewriter, Rewritten};
