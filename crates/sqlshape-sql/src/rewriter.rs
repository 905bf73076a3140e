//! Statement rewriting
//!
//! Parses a base query, applies a [`Builder`]'s accumulated state to its
//! SELECT blocks and prints the result. Blocks are visited post-order
//! (inner blocks before the blocks containing them).
//!
//! The returned arguments are the base arguments followed by directive
//! arguments in visit order. When the base query has placeholders of its
//! own and an inner block prints before one of them, the printed `?`
//! order no longer matches the argument order:
//!
//! ```text
//! SELECT * FROM (SELECT * FROM t WHERE age > ?) AS x WHERE x.tenant = ? AND age > ?
//! args: [tenant, age, age]
//! ```
//!
//! [`AugmentScope::Outermost`] only touches the top-level block and keeps
//! the two orders aligned.
//!
//! A query block whose body is a plain SELECT gets everything. For a set
//! operation (`UNION`, ...), ORDER BY and LIMIT go on the set operation and
//! WHERE / GROUP BY go on each bare SELECT operand.

use crate::builder::Builder;
use crate::error::{BuildError, RewriteError};
use crate::parser::{SqlParser, SqlSyntax};
use crate::predicate::{compile_directive, conjoin, Positional};
use sqlparser::ast::{Query, Select, SetExpr, Statement, Visit, VisitMut, Visitor, VisitorMut};
use sqlshape_core::{AugmentScope, Config, SqlValue};
use std::ops::ControlFlow;

/// A rewritten statement and its complete argument list
#[derive(Debug, Clone, PartialEq)]
pub struct Rewritten {
    /// SQL text; every bound parameter is `?`
    pub sql: String,

    /// Base arguments followed by directive arguments in placeholder order
    pub args: Vec<SqlValue>,
}

/// Applies builders to base queries through a [`SqlSyntax`]
#[derive(Debug)]
pub struct Rewriter<S = SqlParser> {
    syntax: S,
}

impl Rewriter<SqlParser> {
    /// Create a rewriter for the configured dialect
    pub fn from_config(config: &Config) -> Self {
        Self::new(SqlParser::from_dialect(&config.dialect))
    }
}

impl Default for Rewriter<SqlParser> {
    fn default() -> Self {
        Self::new(SqlParser::new())
    }
}

impl<S: SqlSyntax> Rewriter<S> {
    pub fn new(syntax: S) -> Self {
        Self { syntax }
    }

    pub fn syntax(&self) -> &S {
        &self.syntax
    }

    /// Rewrite `sql` with everything recorded in `builder`
    ///
    /// The builder is only read. Any failure aborts the whole call.
    pub fn rewrite(
        &self,
        builder: &Builder,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Rewritten, BuildError> {
        let mut statement = self.syntax.parse(sql)?;

        if let Some(error) = builder.deferred_errors().first() {
            return Err(error.clone().into());
        }

        let mut augmenter = Augmenter {
            builder,
            syntax: &self.syntax,
            depth: 0,
            consumed: args.len(),
            appended: Vec::new(),
            blocks: 0,
        };

        if let ControlFlow::Break(error) = VisitMut::visit(&mut statement, &mut augmenter) {
            tracing::debug!(%error, "rewrite aborted");
            return Err(error.into());
        }

        tracing::debug!(
            blocks = augmenter.blocks,
            appended = augmenter.appended.len(),
            "statement rewritten"
        );

        if !args.is_empty() && augmenter.blocks > 1 && !augmenter.appended.is_empty() {
            tracing::warn!(
                blocks = augmenter.blocks,
                base_args = args.len(),
                "several blocks augmented on a query with base arguments; \
                 argument order may not match placeholder order"
            );
        }

        let mut final_args = args;
        final_args.extend(augmenter.appended);

        Ok(Rewritten {
            sql: self.syntax.serialize(&statement),
            args: final_args,
        })
    }
}

struct Augmenter<'a> {
    builder: &'a Builder,
    syntax: &'a dyn SqlSyntax,
    depth: usize,

    /// Arguments bound so far, base arguments included
    consumed: usize,
    appended: Vec<SqlValue>,
    blocks: usize,
}

impl Augmenter<'_> {
    fn augment(&mut self, query: &mut Query) -> Result<(), RewriteError> {
        if !has_bare_select(&query.body) {
            return Ok(());
        }

        let builder = self.builder;

        if let Some(order) = builder.order_spec() {
            query.order_by = Some(order.to_order_by(self.syntax));
        }
        builder.limit_merge().apply(query);

        let mut selects = Vec::new();
        bare_selects(&mut query.body, &mut selects);

        for select in selects {
            self.blocks += 1;

            if let Some(group) = builder.group_spec() {
                select.group_by = group.to_group_by(self.syntax);
            }

            let mut positional = Positional::starting_at(self.consumed);
            for directive in builder.directives() {
                let predicate = compile_directive(directive, self.syntax, &mut positional)?;
                select.selection = Some(conjoin(select.selection.take(), predicate)?);
                self.appended.extend_from_slice(directive.args());
            }
            self.consumed = positional.consumed();

            tracing::debug!(
                block = self.blocks,
                directives = builder.directives().len(),
                consumed = self.consumed,
                "augmented SELECT block"
            );
        }

        Ok(())
    }
}

impl VisitorMut for Augmenter<'_> {
    type Break = RewriteError;

    fn pre_visit_query(&mut self, _query: &mut Query) -> ControlFlow<Self::Break> {
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, query: &mut Query) -> ControlFlow<Self::Break> {
        let outermost = self.depth == 1;
        self.depth -= 1;

        if self.builder.augment_scope() == AugmentScope::Outermost && !outermost {
            return ControlFlow::Continue(());
        }

        match self.augment(query) {
            Ok(()) => ControlFlow::Continue(()),
            Err(error) => ControlFlow::Break(error),
        }
    }
}

fn has_bare_select(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(_) => true,
        SetExpr::SetOperation { left, right, .. } => has_bare_select(left) || has_bare_select(right),
        _ => false,
    }
}

fn bare_selects<'q>(body: &'q mut SetExpr, out: &mut Vec<&'q mut Select>) {
    match body {
        SetExpr::Select(select) => out.push(&mut **select),
        SetExpr::SetOperation { left, right, .. } => {
            bare_selects(left, out);
            bare_selects(right, out);
        }
        _ => {}
    }
}

/// SELECT blocks of a statement, in the order the rewriter visits them
pub fn select_blocks(statement: &Statement) -> Vec<Select> {
    struct Collector(Vec<Select>);

    impl Visitor for Collector {
        type Break = ();

        fn post_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
            collect_selects(&query.body, &mut self.0);
            ControlFlow::Continue(())
        }
    }

    fn collect_selects(body: &SetExpr, out: &mut Vec<Select>) {
        match body {
            SetExpr::Select(select) => out.push(select.as_ref().clone()),
            SetExpr::SetOperation { left, right, .. } => {
                collect_selects(left, out);
                collect_selects(right, out);
            }
            _ => {}
        }
    }

    let mut collector = Collector(Vec::new());
    match Visit::visit(statement, &mut collector) {
        ControlFlow::Continue(()) | ControlFlow::Break(()) => collector.0,
    }
}
