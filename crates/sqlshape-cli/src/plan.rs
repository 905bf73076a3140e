//! Rewrite plans
//!
//! A plan lists the augmentations to apply, either from a TOML file or
//! assembled from command-line flags:
//!
//! ```toml
//! order = "created_at DESC"
//! limit = 20
//!
//! [[where]]
//! template = "tenant_id = ?"
//! args = [42]
//!
//! [[in]]
//! column = "status_code"
//! args = [200, 204]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlshape_core::SqlValue;
use sqlshape_sql::Builder;
use std::path::Path;

/// One `and_where` call
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WherePlan {
    pub template: String,
    #[serde(default)]
    pub args: Vec<SqlValue>,
}

/// One `where_in` call
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InPlan {
    pub column: String,
    pub args: Vec<SqlValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Plan {
    #[serde(rename = "where", default)]
    pub filters: Vec<WherePlan>,

    #[serde(rename = "in", default)]
    pub in_lists: Vec<InPlan>,

    pub order: Option<String>,
    pub group: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Plan {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid plan {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Add WHERE templates from flags, binding `args` in order
    ///
    /// Each template takes as many values as it has `?` marks.
    pub fn push_filters(&mut self, templates: &[String], args: &[SqlValue]) -> Result<()> {
        let mut remaining = args;

        for template in templates {
            let wanted = template.matches('?').count();
            if wanted > remaining.len() {
                anyhow::bail!(
                    "--where '{}' needs {} argument(s), only {} left",
                    template,
                    wanted,
                    remaining.len()
                );
            }
            let (taken, rest) = remaining.split_at(wanted);
            self.filters.push(WherePlan {
                template: template.clone(),
                args: taken.to_vec(),
            });
            remaining = rest;
        }

        if !remaining.is_empty() {
            anyhow::bail!("{} --arg value(s) not used by any --where", remaining.len());
        }
        Ok(())
    }

    /// Add an IN list from a `COLUMN=JSON_ARRAY` flag
    pub fn push_in_list(&mut self, flag: &str) -> Result<()> {
        let (column, values) = flag
            .split_once('=')
            .with_context(|| format!("--in '{}' must look like COLUMN=[...]", flag))?;
        let items: Vec<serde_json::Value> = serde_json::from_str(values)
            .with_context(|| format!("--in '{}' values must be a JSON array", flag))?;
        let args = items
            .into_iter()
            .map(|item| scalar_value(item, flag))
            .collect::<Result<Vec<_>>>()?;

        self.in_lists.push(InPlan {
            column: column.trim().to_string(),
            args,
        });
        Ok(())
    }

    /// Replay the plan onto a builder: filters, then IN lists, then the rest
    pub fn apply(&self, mut builder: Builder) -> Builder {
        for filter in &self.filters {
            builder = builder.and_where(&filter.template, filter.args.iter().cloned());
        }
        for list in &self.in_lists {
            builder = builder.where_in(&list.column, list.args.iter().cloned());
        }
        if let Some(order) = &self.order {
            builder = builder.order_by(order);
        }
        if let Some(group) = &self.group {
            builder = builder.group_by(group);
        }
        if let Some(offset) = self.offset {
            builder = builder.offset(offset);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        builder
    }
}

/// Parse a JSON literal into a bound value
///
/// Only scalars are accepted. `SqlValue` would read an array of small
/// integers as bytes, which is never what a flag meant.
pub fn parse_value(raw: &str) -> Result<SqlValue> {
    let value: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("'{}' is not a JSON value", raw))?;
    scalar_value(value, raw)
}

fn scalar_value(value: serde_json::Value, raw: &str) -> Result<SqlValue> {
    if value.is_array() || value.is_object() {
        anyhow::bail!("'{}': arguments must be JSON scalars, not arrays or objects", raw);
    }
    Ok(serde_json::from_value(value)?)
}
