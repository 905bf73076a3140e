//! Configuration schema (sqlshape.toml)

use serde::{Deserialize, Serialize};

/// Row count used when only an offset is requested and no default is configured
pub const DEFAULT_ROW_COUNT: u64 = 100;

/// SQL dialect configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectConfig {
    /// MySQL dialect (backtick identifier quoting)
    MySql,

    /// Generic SQL dialect
    Generic,

    /// PostgreSQL SQL dialect
    Postgres,

    /// SQLite SQL dialect
    Sqlite,

    /// Generic ANSI SQL
    Ansi,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::MySql
    }
}

/// Which SELECT blocks of a statement receive augmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentScope {
    /// Every SELECT block, including subqueries, derived tables and CTEs
    AllSelects,

    /// Only the top-level query block of the statement
    Outermost,
}

impl Default for AugmentScope {
    fn default() -> Self {
        Self::AllSelects
    }
}

fn default_row_count() -> u64 {
    DEFAULT_ROW_COUNT
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQL dialect used to parse and print statements
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Row count applied when an offset is set without a limit
    #[serde(default = "default_row_count")]
    pub default_row_count: u64,

    /// Traversal scope for augmentation
    #[serde(default)]
    pub scope: AugmentScope,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: DialectConfig::default(),
            default_row_count: DEFAULT_ROW_COUNT,
            scope: AugmentScope::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.dialect, DialectConfig::MySql);
        assert_eq!(config.default_row_count, 100);
        assert_eq!(config.scope, AugmentScope::AllSelects);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = Config::from_toml("dialect = \"postgres\"").unwrap();
        assert_eq!(config.dialect, DialectConfig::Postgres);
        assert_eq!(config.default_row_count, DEFAULT_ROW_COUNT);
        assert_eq!(config.scope, AugmentScope::AllSelects);
    }

    #[test]
    fn full_toml() {
        let config = Config::from_toml(
            r#"
            dialect = "sqlite"
            default_row_count = 25
            scope = "outermost"
            "#,
        )
        .unwrap();

        assert_eq!(config.dialect, DialectConfig::Sqlite);
        assert_eq!(config.default_row_count, 25);
        assert_eq!(config.scope, AugmentScope::Outermost);
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        let err = Config::from_toml("dialect = \"oracle\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config {
            dialect: DialectConfig::Ansi,
            default_row_count: 10,
            scope: AugmentScope::Outermost,
        };
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }
}
