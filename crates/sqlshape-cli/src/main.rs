mod plan;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plan::Plan;
use sqlshape_core::{Config, SqlValue};
use sqlshape_sql::{select_blocks, Builder, Rewriter, SqlParser, SqlSyntax};

/// sqlshape - Augment SQL queries with filters, ordering and pagination
#[derive(Parser)]
#[command(name = "sqlshape")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlshape.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a query and print the SQL and its arguments
    Rewrite {
        /// Base query
        sql: String,

        /// TOML plan with [[where]], [[in]], order, group, limit, offset
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// WHERE template, e.g. "age > ?" (repeatable)
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,

        /// JSON value bound to the --where templates in order (repeatable)
        #[arg(short, long = "arg")]
        args: Vec<String>,

        /// JSON value bound to the base query's own placeholders (repeatable)
        #[arg(long = "base-arg")]
        base_args: Vec<String>,

        /// IN list as COLUMN=JSON_ARRAY (repeatable)
        #[arg(long = "in")]
        in_lists: Vec<String>,

        /// ORDER BY spec, e.g. "created_at DESC, id"
        #[arg(long)]
        order: Option<String>,

        /// GROUP BY spec
        #[arg(long)]
        group: Option<String>,

        #[arg(long)]
        limit: Option<u64>,

        #[arg(long)]
        offset: Option<u64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the SELECT blocks of a query in rewrite order
    AstDump {
        /// Query to parse
        sql: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Rewrite {
            sql,
            plan,
            filters,
            args,
            base_args,
            in_lists,
            order,
            group,
            limit,
            offset,
            json,
        } => {
            let mut plan = match plan {
                Some(path) => Plan::from_file(&path)?,
                None => Plan::default(),
            };

            let args = parse_values(&args)?;
            plan.push_filters(&filters, &args)?;
            for flag in &in_lists {
                plan.push_in_list(flag)?;
            }
            plan.order = order.or(plan.order);
            plan.group = group.or(plan.group);
            plan.limit = limit.or(plan.limit);
            plan.offset = offset.or(plan.offset);

            rewrite_command(&config, &sql, &plan, parse_values(&base_args)?, json)
        }
        Commands::AstDump { sql } => ast_dump_command(&config, &sql),
    }
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(config_path) = path {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new("sqlshape.toml").exists() {
        Config::from_file(Path::new("sqlshape.toml"))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if verbose {
        eprintln!(
            "{} dialect: {:?}, scope: {:?}, row count: {}",
            "Using".cyan(),
            config.dialect,
            config.scope,
            config.default_row_count
        );
    }
    Ok(config)
}

fn parse_values(raw: &[String]) -> Result<Vec<SqlValue>> {
    raw.iter().map(|value| plan::parse_value(value)).collect()
}

/// Rewrite command - apply a plan to a base query
fn rewrite_command(
    config: &Config,
    sql: &str,
    plan: &Plan,
    base_args: Vec<SqlValue>,
    json: bool,
) -> Result<()> {
    let builder = plan.apply(Builder::from_config(config));
    tracing::debug!(
        directives = builder.directives().len(),
        deferred = builder.deferred_errors().len(),
        "plan applied"
    );

    let rewritten = Rewriter::from_config(config)
        .rewrite(&builder, sql, base_args)
        .context("Rewrite failed")?;

    if json {
        let output = serde_json::json!({
            "sql": rewritten.sql,
            "args": rewritten.args,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", rewritten.sql.bold());
    if rewritten.args.is_empty() {
        println!("{}", "(no arguments)".dimmed());
    }
    for (i, arg) in rewritten.args.iter().enumerate() {
        println!("  {} {} {}", arg_label(i).cyan(), arg, arg.type_name().dimmed());
    }
    Ok(())
}

/// Position label for the i-th (0-based) argument; never a placeholder syntax
fn arg_label(i: usize) -> String {
    format!("#{}", i + 1)
}

/// AST dump command - show the SELECT blocks a rewrite would touch
fn ast_dump_command(config: &Config, sql: &str) -> Result<()> {
    let parser = SqlParser::from_dialect(&config.dialect);
    let statement = parser.parse(sql)?;
    let blocks = select_blocks(&statement);

    println!("{} {}", "Statement:".bold(), parser.serialize(&statement));
    if blocks.is_empty() {
        println!("{}", "No SELECT blocks; a rewrite leaves this statement unchanged".yellow());
    }

    for (i, block) in blocks.iter().enumerate() {
        println!();
        println!("{}", format!("Block {} of {}", i + 1, blocks.len()).bold().bright_blue());
        println!("{:#?}", block);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn argument_labels_are_not_placeholders() {
        assert_eq!(arg_label(0), "#1");
        assert_eq!(arg_label(9), "#10");
        assert!(!arg_label(0).starts_with('$'));
    }
}
