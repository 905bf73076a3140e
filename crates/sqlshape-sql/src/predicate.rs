//! Predicate compilation and WHERE composition
//!
//! A directive template has the shape `column operator value`, split on
//! single spaces. The value must be a placeholder: `?`, or for `IN` /
//! `NOT IN` a tuple `(?, ?, ...)`. Every placeholder becomes its own
//! positional argument node.

use crate::builder::Directive;
use crate::column::ColumnRef;
use crate::error::{DirectiveError, RewriteError};
use crate::parser::{SqlSyntax, PLACEHOLDER};
use sqlparser::ast::{BinaryOperator, Expr};

/// Comparison operators accepted in directives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    In,
    NotIn,
    Like,
    NotLike,
}

impl Operator {
    /// Parse an operator token, keywords matched case-insensitively
    pub fn parse(token: &str) -> Option<Self> {
        let op = match token {
            "=" => Self::Eq,
            "!=" => Self::NotEq,
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::GtEq,
            "<=" => Self::LtEq,
            t if t.eq_ignore_ascii_case("IN") => Self::In,
            t if t.eq_ignore_ascii_case("LIKE") => Self::Like,
            _ => return None,
        };
        Some(op)
    }

    fn negate(self) -> Option<Self> {
        match self {
            Self::In => Some(Self::NotIn),
            Self::Like => Some(Self::NotLike),
            _ => None,
        }
    }

    fn binary_operator(self) -> Option<BinaryOperator> {
        match self {
            Self::Eq => Some(BinaryOperator::Eq),
            Self::NotEq => Some(BinaryOperator::NotEq),
            Self::Gt => Some(BinaryOperator::Gt),
            Self::Lt => Some(BinaryOperator::Lt),
            Self::GtEq => Some(BinaryOperator::GtEq),
            Self::LtEq => Some(BinaryOperator::LtEq),
            _ => None,
        }
    }

    fn takes_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

/// Placeholder shape of a directive's value token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueShape {
    Single,
    Tuple(usize),
}

impl ValueShape {
    fn parse(token: &str) -> Option<Self> {
        if token == PLACEHOLDER {
            return Some(Self::Single);
        }

        let inner = token.strip_prefix('(')?.strip_suffix(')')?;
        let count = inner.split(',').try_fold(0usize, |n, item| {
            (item.trim() == PLACEHOLDER).then_some(n + 1)
        })?;
        Some(Self::Tuple(count))
    }

    fn placeholders(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Tuple(n) => n,
        }
    }
}

/// Hands out positional argument slots for one rewrite pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Positional {
    consumed: usize,
}

impl Positional {
    /// Counter positioned after `consumed` already-bound arguments
    pub fn starting_at(consumed: usize) -> Self {
        Self { consumed }
    }

    /// Number of argument slots handed out so far, seed included
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn next(&mut self, syntax: &dyn SqlSyntax) -> Expr {
        self.consumed += 1;
        syntax.placeholder(self.consumed)
    }
}

/// Split a template into column token, operator and value token
fn split_template(template: &str) -> Result<(&str, Operator, &str), DirectiveError> {
    let malformed = || DirectiveError::Malformed(template.to_string());
    let unsupported = |operator: &str| DirectiveError::UnsupportedOperator {
        template: template.to_string(),
        operator: operator.to_string(),
    };

    let mut parts = template.splitn(3, ' ');
    let (Some(column), Some(operator), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    if operator.eq_ignore_ascii_case("NOT") {
        let (keyword, value) = rest.split_once(' ').ok_or_else(malformed)?;
        let op = Operator::parse(keyword)
            .and_then(Operator::negate)
            .ok_or_else(|| unsupported(&format!("{} {}", operator, keyword)))?;
        return Ok((column, op, value));
    }

    let op = Operator::parse(operator).ok_or_else(|| unsupported(operator))?;
    Ok((column, op, rest))
}

/// Compile one directive into a predicate expression
///
/// Placeholder slots are taken from `positional` in order, one per bound
/// argument.
pub fn compile_directive(
    directive: &Directive,
    syntax: &dyn SqlSyntax,
    positional: &mut Positional,
) -> Result<Expr, DirectiveError> {
    match directive {
        Directive::Where { template, args } => {
            let (column, op, value) = split_template(template)?;
            let column = ColumnRef::parse(column)?;

            let shape = ValueShape::parse(value)
                .filter(|shape| matches!(shape, ValueShape::Single) || op.takes_list())
                .ok_or_else(|| DirectiveError::UnsupportedValue {
                    template: template.clone(),
                    value: value.to_string(),
                })?;

            if shape.placeholders() != args.len() {
                return Err(DirectiveError::ArgumentCount {
                    template: template.clone(),
                    placeholders: shape.placeholders(),
                    args: args.len(),
                });
            }

            Ok(comparison(column.to_expr(syntax), op, shape.placeholders(), syntax, positional))
        }
        Directive::In { column, args } => {
            if args.is_empty() {
                return Err(DirectiveError::EmptyInList(column.to_string()));
            }
            Ok(comparison(column.to_expr(syntax), Operator::In, args.len(), syntax, positional))
        }
    }
}

fn comparison(
    left: Expr,
    op: Operator,
    placeholders: usize,
    syntax: &dyn SqlSyntax,
    positional: &mut Positional,
) -> Expr {
    let left = Box::new(left);

    match (op, op.binary_operator()) {
        (_, Some(binary)) => Expr::BinaryOp {
            left,
            op: binary,
            right: Box::new(positional.next(syntax)),
        },
        (Operator::In | Operator::NotIn, None) => Expr::InList {
            expr: left,
            list: (0..placeholders).map(|_| positional.next(syntax)).collect(),
            negated: op == Operator::NotIn,
        },
        (_, None) => Expr::Like {
            negated: op == Operator::NotLike,
            any: false,
            expr: left,
            pattern: Box::new(positional.next(syntax)),
            escape_char: None,
        },
    }
}

/// Shape of an existing WHERE expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereShape {
    /// A single comparison (`=`, `<`, `IN`, `LIKE`, ...)
    Comparison,

    /// `a AND b`
    Conjunction,

    /// `a OR b`
    Disjunction,

    /// Anything else; cannot be composed
    Other,
}

impl WhereShape {
    /// Classify an expression; parentheses are looked through
    pub fn of(expr: &Expr) -> Self {
        match expr {
            Expr::Nested(inner) => Self::of(inner),
            Expr::BinaryOp { op, .. } => match op {
                BinaryOperator::And => Self::Conjunction,
                BinaryOperator::Or => Self::Disjunction,
                BinaryOperator::Eq
                | BinaryOperator::NotEq
                | BinaryOperator::Lt
                | BinaryOperator::LtEq
                | BinaryOperator::Gt
                | BinaryOperator::GtEq
                | BinaryOperator::Spaceship => Self::Comparison,
                _ => Self::Other,
            },
            Expr::InList { .. }
            | Expr::InSubquery { .. }
            | Expr::Like { .. }
            | Expr::ILike { .. }
            | Expr::RLike { .. } => Self::Comparison,
            _ => Self::Other,
        }
    }
}

/// AND a new predicate onto the existing WHERE expression
///
/// A top-level disjunction is parenthesized first so the printed text keeps
/// its grouping.
pub fn conjoin(existing: Option<Expr>, predicate: Expr) -> Result<Expr, RewriteError> {
    let Some(existing) = existing else {
        return Ok(predicate);
    };

    let left = match (WhereShape::of(&existing), &existing) {
        (WhereShape::Other, _) => {
            return Err(RewriteError::UnsupportedExpression(existing.to_string()));
        }
        (WhereShape::Disjunction, Expr::BinaryOp { .. }) => Expr::Nested(Box::new(existing)),
        _ => existing,
    };

    Ok(Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOperator::And,
        right: Box::new(predicate),
    })
}
