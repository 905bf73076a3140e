//! sqlshape core
//!
//! Shared types used across the workspace: bound argument values and the
//! `sqlshape.toml` configuration schema.

pub mod config;
pub mod value;

pub use config::{AugmentScope, Config, ConfigError, DialectConfig, DEFAULT_ROW_COUNT};
pub use value::SqlValue;
