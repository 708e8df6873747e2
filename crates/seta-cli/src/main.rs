//! `seta`: command-line client for the SETA reporting server.
//!
//! # Usage
//!
//! ```
//! seta --url http://localhost:8080 import --kind verification checks.json
//! seta report --kind verification --granularity weekly --from 2025-01-01 --to 2025-01-31
//! seta --config ~/.config/seta/config.toml report ... --format json
//! ```

mod client;
mod table;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use seta_core::{config::Granularity, record::RecordKind};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "seta", about = "Command-line client for SETA verification reports")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the seta server (default: http://localhost:8080).
  #[arg(long, env = "SETA_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Upload records from a JSON array file.
  Import {
    /// `verification` or `enrollment`.
    #[arg(long, value_parser = parse_kind)]
    kind: RecordKind,

    /// File holding `[{"subject_id", "timestamp", "outcome"}, ...]`.
    file: PathBuf,
  },

  /// Fetch and print a period report.
  Report {
    #[arg(long, value_parser = parse_kind)]
    kind: RecordKind,

    /// `daily`, `weekly` or `monthly`.
    #[arg(long, value_parser = parse_granularity)]
    granularity: Granularity,

    /// First day of the range (YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// Last day of the range, inclusive (YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,

    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
  Table,
  Json,
}

fn parse_kind(raw: &str) -> Result<RecordKind, String> {
  RecordKind::parse(raw).map_err(|e| e.to_string())
}

fn parse_granularity(raw: &str) -> Result<Granularity, String> {
  Granularity::parse(raw).map_err(|e| e.to_string())
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug, PartialEq, Eq)]
struct ConfigFile {
  url: Option<String>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let api_config = ApiConfig {
    base_url: resolve_url(args.url, file_cfg),
  };
  tracing::debug!(url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Import { kind, file } => import(&client, kind, &file).await,
    Command::Report {
      kind,
      granularity,
      from,
      to,
      format,
    } => {
      if from > to {
        bail!("--from {from} is after --to {to}");
      }
      let doc = client.report(kind, granularity, from, to).await?;
      if doc.truncated {
        eprintln!(
          "warning: the server hit its page limit; totals cover only part of the range"
        );
      }
      match format {
        Format::Table => print!("{}", table::render(&doc)),
        Format::Json => println!(
          "{}",
          serde_json::to_string_pretty(&doc).context("serialising report")?
        ),
      }
      Ok(())
    }
  }
}

/// CLI flags override the config file, which overrides the default.
fn resolve_url(flag: Option<String>, file: ConfigFile) -> String {
  flag
    .or(file.url.filter(|url| !url.trim().is_empty()))
    .unwrap_or_else(|| DEFAULT_URL.to_owned())
}

async fn import(client: &ApiClient, kind: RecordKind, file: &Path) -> Result<()> {
  let raw = std::fs::read_to_string(file)
    .with_context(|| format!("reading {}", file.display()))?;
  let records: Vec<serde_json::Value> = serde_json::from_str(&raw)
    .with_context(|| format!("{} is not a JSON array", file.display()))?;

  let inserted = client.import_records(kind, records).await?;
  println!("imported {inserted} {kind} records");
  Ok(())
}
