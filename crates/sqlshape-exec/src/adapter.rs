//! Executor trait and the augmenting decorator

use sqlshape_core::{Config, SqlValue};
use sqlshape_sql::{BuildError, Builder, Rewriter};
use std::sync::Arc;

/// Request-scoped call context
///
/// Carries the builder, if any, that should shape the statements issued
/// under it.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    builder: Option<Arc<Builder>>,
}

impl QueryContext {
    /// Create a context with no builder attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a builder
    pub fn with_builder(mut self, builder: impl Into<Arc<Builder>>) -> Self {
        self.builder = Some(builder.into());
        self
    }

    /// Detach the builder
    pub fn without_builder(mut self) -> Self {
        self.builder = None;
        self
    }

    pub fn builder(&self) -> Option<&Builder> {
        self.builder.as_deref()
    }
}

/// Errors returned by an [`Augmented`] executor
#[derive(Debug, thiserror::Error)]
pub enum ExecError<E> {
    #[error("Query augmentation failed: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Executor(E),
}

impl<E> ExecError<E> {
    /// Check if the statement never reached the executor
    pub fn is_build_error(&self) -> bool {
        matches!(self, Self::Build(_))
    }
}

/// A parameterized-SQL executor
///
/// Arguments bind to `?` placeholders by position.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Result of a statement that returns no rows
    type Outcome: Send;

    /// Result set of a query
    type Rows: Send;

    /// A single row
    type Row: Send;

    /// A prepared statement handle
    type Statement: Send;

    type Error: std::error::Error + Send + Sync + 'static;

    async fn exec(
        &self,
        ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Outcome, Self::Error>;

    async fn query(
        &self,
        ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Rows, Self::Error>;

    async fn query_row(
        &self,
        ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Row, Self::Error>;

    async fn prepare(&self, ctx: &QueryContext, sql: &str) -> Result<Self::Statement, Self::Error>;
}

/// Executor decorator that applies the context's builder before delegating
///
/// A failed rewrite is returned as [`ExecError::Build`] and the inner
/// executor is never called; the unmodified statement is never run in its
/// place. `prepare` is passed through untouched.
#[derive(Debug)]
pub struct Augmented<E> {
    inner: E,
    rewriter: Rewriter,
}

impl<E: Executor> Augmented<E> {
    /// Wrap an executor, rewriting with the MySQL syntax
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            rewriter: Rewriter::default(),
        }
    }

    /// Wrap an executor, rewriting with the configured dialect
    pub fn from_config(inner: E, config: &Config) -> Self {
        Self {
            inner,
            rewriter: Rewriter::from_config(config),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Rewrite a statement with the context's builder, if it has a populated one
    fn shape(
        &self,
        ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<(String, Vec<SqlValue>), BuildError> {
        match ctx.builder() {
            Some(builder) if !builder.is_empty() => {
                let rewritten = self.rewriter.rewrite(builder, sql, args).map_err(|error| {
                    tracing::warn!(%error, sql, "statement rejected before execution");
                    error
                })?;
                tracing::debug!(original = sql, rewritten = %rewritten.sql, "statement augmented");
                Ok((rewritten.sql, rewritten.args))
            }
            _ => Ok((sql.to_string(), args)),
        }
    }
}

#[async_trait::async_trait]
impl<E: Executor> Executor for Augmented<E> {
    type Outcome = E::Outcome;
    type Rows = E::Rows;
    type Row = E::Row;
    type Statement = E::Statement;
    type Error = ExecError<E::Error>;

    async fn exec(
        &self,
        ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Outcome, Self::Error> {
        let (sql, args) = self.shape(ctx, sql, args)?;
        self.inner.exec(ctx, &sql, args).await.map_err(ExecError::Executor)
    }

    async fn query(
        &self,
        ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Rows, Self::Error> {
        let (sql, args) = self.shape(ctx, sql, args)?;
        self.inner.query(ctx, &sql, args).await.map_err(ExecError::Executor)
    }

    async fn query_row(
        &self,
        ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Row, Self::Error> {
        let (sql, args) = self.shape(ctx, sql, args)?;
        self.inner.query_row(ctx, &sql, args).await.map_err(ExecError::Executor)
    }

    async fn prepare(&self, ctx: &QueryContext, sql: &str) -> Result<Self::Statement, Self::Error> {
        self.inner.prepare(ctx, sql).await.map_err(ExecError::Executor)
    }
}
