//! Error taxonomy for directive compilation and statement rewriting

use crate::parser::ParseError;

/// A directive, column reference, or ORDER/GROUP spec that cannot be compiled
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("invalid column reference '{0}'")]
    InvalidColumn(String),

    #[error("malformed directive '{0}': expected `column operator value`")]
    Malformed(String),

    #[error("unsupported operator '{operator}' in directive '{template}'")]
    UnsupportedOperator { template: String, operator: String },

    #[error("unsupported value '{value}' in directive '{template}': only placeholders are allowed")]
    UnsupportedValue { template: String, value: String },

    #[error("directive '{template}' has {placeholders} placeholder(s) but {args} argument(s)")]
    ArgumentCount {
        template: String,
        placeholders: usize,
        args: usize,
    },

    #[error("IN on column '{0}' requires at least one value")]
    EmptyInList(String),

    #[error("{clause} spec '{spec}' names no column")]
    EmptySpec { clause: &'static str, spec: String },
}

/// Failure while applying accumulated directives to a parsed statement
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error("invalid directive: {0}")]
    InvalidDirective(#[from] DirectiveError),

    #[error("unsupported WHERE expression, cannot compose with AND: {0}")]
    UnsupportedExpression(String),
}

/// Failure of a whole `build` call; no partial output accompanies it
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("could not parse sql: {0}")]
    Parse(#[from] ParseError),

    #[error("build aborted: {0}")]
    Aborted(#[from] RewriteError),
}

impl BuildError {
    /// Check if the base query failed to parse
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// The directive failure behind this error, if any
    pub fn directive_error(&self) -> Option<&DirectiveError> {
        match self {
            Self::Aborted(RewriteError::InvalidDirective(e)) => Some(e),
            _ => None,
        }
    }
}

impl From<DirectiveError> for BuildError {
    fn from(err: DirectiveError) -> Self {
        Self::Aborted(RewriteError::InvalidDirective(err))
    }
}
