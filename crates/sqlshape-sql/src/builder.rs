//! Directive accumulator
//!
//! `Builder` records WHERE directives, ORDER BY / GROUP BY specs and
//! LIMIT / OFFSET values in call order. It does no SQL work itself; the
//! [`Rewriter`](crate::rewriter::Rewriter) reads it when a query is built,
//! so one builder can be built against many queries.
//!
//! ```rust,ignore
//! use sqlshape_sql::Builder;
//!
//! let rewritten = Builder::new()
//!     .and_where("email = ?", ["john@example.com"])
//!     .where_in("age", [25, 30, 35])
//!     .order_by("email ASC, age DESC")
//!     .offset(10)
//!     .limit(5)
//!     .build("SELECT * FROM users", vec![])?;
//! ```

use crate::column::ColumnRef;
use crate::error::{BuildError, DirectiveError};
use crate::limit::LimitMerge;
use crate::ordering::{GroupSpec, OrderSpec};
use crate::rewriter::{Rewriter, Rewritten};
use sqlshape_core::{AugmentScope, Config, SqlValue};
use std::fmt;

/// One recorded WHERE augmentation
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `column operator value` template with its bound arguments
    Where { template: String, args: Vec<SqlValue> },

    /// `column IN (?, ...)` with one placeholder per argument
    In { column: ColumnRef, args: Vec<SqlValue> },
}

impl Directive {
    /// Arguments bound by this directive, in placeholder order
    pub fn args(&self) -> &[SqlValue] {
        match self {
            Self::Where { args, .. } | Self::In { args, .. } => args,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Where { template, .. } => write!(f, "{}", template),
            Self::In { column, args } => {
                let placeholders = vec!["?"; args.len()].join(",");
                write!(f, "{} IN ({})", column, placeholders)
            }
        }
    }
}

/// Accumulates query augmentations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Builder {
    directives: Vec<Directive>,
    order: Option<OrderSpec>,
    group: Option<GroupSpec>,
    limit: LimitMerge,
    scope: AugmentScope,

    /// Construction-time failures, reported by the next build
    deferred: Vec<DirectiveError>,
}

impl Builder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder seeded with configured defaults
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .row_count(config.default_row_count)
            .scope(config.scope)
    }

    /// Add a WHERE condition, ANDed with any existing one
    ///
    /// The template must read `column operator value` with single spaces,
    /// e.g. `"email = ?"` or `"age NOT IN (?, ?)"`. It is validated when the
    /// query is built.
    pub fn and_where<I, V>(mut self, template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.directives.push(Directive::Where {
            template: template.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add `column IN (?, ?, ...)` with one placeholder per value
    pub fn where_in<I, V>(mut self, column: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let args: Vec<SqlValue> = args.into_iter().map(Into::into).collect();

        match ColumnRef::parse(column) {
            Ok(_) if args.is_empty() => self.defer(DirectiveError::EmptyInList(column.to_string())),
            Ok(column) => self.directives.push(Directive::In { column, args }),
            Err(e) => self.defer(e),
        }
        self
    }

    /// Set ORDER BY, replacing any earlier spec
    ///
    /// `"email, age DESC"`. Only the column and a trailing ASC/DESC are used.
    pub fn order_by(mut self, spec: &str) -> Self {
        match OrderSpec::parse(spec) {
            Ok(order) => self.order = Some(order),
            Err(e) => self.defer(e),
        }
        self
    }

    /// Set GROUP BY, replacing any earlier spec
    pub fn group_by(mut self, spec: &str) -> Self {
        match GroupSpec::parse(spec) {
            Ok(group) => self.group = Some(group),
            Err(e) => self.defer(e),
        }
        self
    }

    /// Set the row offset
    pub fn offset(mut self, n: u64) -> Self {
        self.limit.offset = Some(n);
        self
    }

    /// Set the row count
    pub fn limit(mut self, n: u64) -> Self {
        self.limit.limit = Some(n);
        self
    }

    /// Row count used when only an offset is set (0 means 100)
    pub fn row_count(mut self, n: u64) -> Self {
        self.limit.default_row_count = n;
        self
    }

    /// Choose which SELECT blocks are augmented
    pub fn scope(mut self, scope: AugmentScope) -> Self {
        self.scope = scope;
        self
    }

    /// Rewrite `sql` with the default MySQL syntax
    ///
    /// `args` are the base query's own arguments; they stay first in the
    /// returned argument list.
    pub fn build(&self, sql: &str, args: Vec<SqlValue>) -> Result<Rewritten, BuildError> {
        Rewriter::default().rewrite(self, sql, args)
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn order_spec(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    pub fn group_spec(&self) -> Option<&GroupSpec> {
        self.group.as_ref()
    }

    pub fn limit_merge(&self) -> LimitMerge {
        self.limit
    }

    pub fn augment_scope(&self) -> AugmentScope {
        self.scope
    }

    /// Failures recorded while the builder was populated
    pub fn deferred_errors(&self) -> &[DirectiveError] {
        &self.deferred
    }

    /// Check if the builder would leave a query untouched
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
            && self.order.is_none()
            && self.group.is_none()
            && self.limit.is_empty()
            && self.deferred.is_empty()
    }

    fn defer(&mut self, error: DirectiveError) {
        tracing::warn!(%error, "directive rejected, build will fail");
        self.deferred.push(error);
    }
}
