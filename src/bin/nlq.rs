//! nlq: translate plain sentences into SQL and MongoDB queries.
//!
//! # Usage
//!
//! ```bash
//! # SQL text
//! nlq --schema schema.json sql choose loan_amnt from loan where person_age greater 25
//!
//! # MongoDB pipeline
//! nlq --schema schema.json mongo sum loan_amnt from loan by person_age
//!
//! # Show how the sentence was read
//! NLQ_SCHEMA=schema.json nlq explain group by person_age having loan_amnt 5000 from loan
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use nlq::prelude::*;
use nlq::resolver::ColumnSet;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nlq")]
#[command(version)]
#[command(about = "Natural-language query compiler", long_about = None)]
#[command(after_help = "EXAMPLES:
    nlq -s schema.json sql choose loan_amnt from loan where person_age greater 25
    nlq -s schema.json mongo sum loan_amnt from loan by person_age
    nlq -s schema.json --format json explain sort loan by loan_amnt descending")]
struct Cli {
    /// Schema file (JSON or TOML)
    #[arg(short, long, env = "NLQ_SCHEMA", global = true)]
    schema: Option<PathBuf>,

    /// Configuration file (defaults to <config dir>/nlq/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate into SQL text
    Sql {
        /// The sentence (quoting is optional)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Translate into a MongoDB query
    Mongo {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show tables, stages and warnings for a sentence
    Explain {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// List the keyword vocabulary
    Keywords,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Log to stderr. `NLQ_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("NLQ_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "nlq=debug" } else { "error" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => NlqConfig::load(path)?,
        None => NlqConfig::load_default()?,
    };
    let translator = Translator::from_config(&config);

    match &cli.command {
        Commands::Keywords => {
            show_keywords(translator.taxonomy(), cli.format)?;
            Ok(())
        }
        Commands::Sql { query } => {
            let schema = load_schema(cli, &config)?;
            let plan = translate(&translator, query, &schema, cli)?;
            let sql = plan.to_sql();
            match cli.format {
                OutputFormat::Text => {
                    print_warnings(&plan.warnings);
                    println!("{}", sql);
                }
                OutputFormat::Json => {
                    let out = json!({ "sql": sql, "warnings": plan.warnings });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
            Ok(())
        }
        Commands::Mongo { query } => {
            let schema = load_schema(cli, &config)?;
            let doc = translate(&translator, query, &schema, cli)?.to_mongo();
            match cli.format {
                OutputFormat::Text => {
                    print_warnings(&doc.warnings);
                    println!("{}", doc.to_shell());
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
            }
            Ok(())
        }
        Commands::Explain { query } => {
            let schema = load_schema(cli, &config)?;
            let plan = translate(&translator, query, &schema, cli)?;
            match cli.format {
                OutputFormat::Text => explain(&plan),
                OutputFormat::Json => {
                    let out = json!({
                        "plan": plan,
                        "sql": plan.to_sql(),
                        "mongo": plan.to_mongo(),
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
            Ok(())
        }
    }
}

fn load_schema(cli: &Cli, config: &NlqConfig) -> Result<Schema> {
    let path: &Path = cli
        .schema
        .as_deref()
        .or(config.schema_path.as_deref())
        .ok_or_else(|| anyhow!("no schema given; use --schema or set NLQ_SCHEMA"))?;
    Schema::load(path).with_context(|| format!("failed to load schema {}", path.display()))
}

fn translate(
    translator: &Translator,
    words: &[String],
    schema: &Schema,
    cli: &Cli,
) -> Result<QueryPlan> {
    let query = words.join(" ");
    if cli.verbose {
        eprintln!("{} {}", "Input:".dimmed(), query.yellow());
    }
    translator
        .plan(&query, schema)
        .with_context(|| format!("cannot translate \"{}\"", query))
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{} {}", "⚠".yellow(), warning.message.yellow());
    }
}

fn explain(plan: &QueryPlan) {
    println!("{} {}", "Mode:".dimmed(), plan.mode.to_string().cyan());
    println!("{} {}", "Primary table:".dimmed(), plan.primary_table.white().bold());

    println!("{}", "Tables:".dimmed());
    for table in plan.resolved.tables() {
        let columns = match plan.resolved.columns(table) {
            Some(ColumnSet::Named(cols)) => cols.join(", "),
            _ => "*".to_string(),
        };
        println!("  • {} ({})", table.white(), columns);
    }
    if plan.resolved.is_synthetic() {
        println!("  {}", "(no schema table recognized)".dimmed());
    }

    println!("{}", "Stages:".dimmed());
    if plan.stages.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (i, fragment) in plan.stages.iter().enumerate() {
        println!(
            "  {}. {:12} {}",
            i + 1,
            fragment.kind().to_string().cyan(),
            describe(fragment)
        );
    }

    if !plan.warnings.is_empty() {
        println!("{}", "Warnings:".dimmed());
        print_warnings(&plan.warnings);
    }

    println!();
    println!("{}", "SQL:".green().bold());
    println!("  {}", plan.to_sql().white());
    println!("{}", "MongoDB:".green().bold());
    println!("  {}", plan.to_mongo().to_shell().white());
}

fn describe(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Filter(cond) => cond.to_string(),
        Fragment::PostFilter(cond) => cond.to_string(),
        Fragment::Join(join) => {
            let links: Vec<String> = join
                .links
                .iter()
                .map(|l| {
                    let note = if l.default_used { " (default key)" } else { "" };
                    format!("{} on {}{}", l.table, l.key, note)
                })
                .collect();
            format!("{} ⋈ {}", join.primary, links.join(", "))
        }
        Fragment::Grouping(group) => {
            let key = group
                .key
                .as_ref()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "(all rows)".to_string());
            let aggs: Vec<&str> = group.aggregates.iter().map(|a| a.name.as_str()).collect();
            if aggs.is_empty() {
                format!("by {}", key)
            } else {
                format!("by {} computing {}", key, aggs.join(", "))
            }
        }
        Fragment::Ordering(order) => {
            let keys: Vec<String> = order
                .keys
                .iter()
                .map(|k| match k {
                    SortKey::Column(col) => col.to_string(),
                    SortKey::GroupKey(col) => format!("{} (group key)", col),
                    SortKey::Aggregate(name) => name.clone(),
                    SortKey::RowId => "_id".to_string(),
                })
                .collect();
            format!("{} {}", keys.join(", "), order.direction.sql_keyword())
        }
        Fragment::Projection(proj) => {
            let fields: Vec<String> = proj
                .bindings
                .iter()
                .map(|b| match b {
                    Binding::Field(col) | Binding::GroupKey(col) => col.to_string(),
                    Binding::Aggregate(agg) | Binding::Computed(agg) => agg.name.clone(),
                })
                .collect();
            fields.join(", ")
        }
    }
}

fn show_keywords(taxonomy: &Taxonomy, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(taxonomy)?);
        return Ok(());
    }

    println!("{:12} {}", "Role".white().bold(), "Words".white().bold());
    println!("{}", "─".repeat(60).dimmed());
    for role in Role::ALL {
        println!("{:12} {}", role.to_string().cyan(), taxonomy.words(role).join(", "));
    }

    println!();
    println!("{}", "Conditions:".dimmed());
    for (word, op) in taxonomy.conditions() {
        println!("  {:10} {}", word.yellow(), op);
    }
    println!("{}", "Aggregates:".dimmed());
    for (word, func) in taxonomy.aggregates() {
        println!("  {:10} {}", word.yellow(), func);
    }
    println!("{}", "Directions:".dimmed());
    for (word, dir) in taxonomy.directions() {
        println!("  {:10} {}", word.yellow(), dir.sql_keyword());
    }
    Ok(())
}
