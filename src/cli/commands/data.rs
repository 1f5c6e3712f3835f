//! Read and import commands for the data exchange service

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use relatics_api::api::{HttpTransport, import_data, read_data};
use relatics_api::config::Config;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use super::{OutputArgs, resolve_company};

#[derive(Args)]
pub struct ReadCommands {
    /// Company name, the subdomain of relaticsonline.com
    #[arg(short, long)]
    pub company: Option<String>,
    /// Workspace ID
    #[arg(short, long)]
    pub workspace: String,
    /// Operation name of the webservice
    #[arg(short, long)]
    pub operation: String,
    /// Entry code of the webservice
    #[arg(short, long)]
    pub entry_code: String,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct ImportCommands {
    /// Company name, the subdomain of relaticsonline.com
    #[arg(short, long)]
    pub company: Option<String>,
    /// Workspace ID
    #[arg(short, long)]
    pub workspace: String,
    /// Operation name of the import definition
    #[arg(short, long)]
    pub operation: String,
    /// Entry code of the import definition
    #[arg(short, long)]
    pub entry_code: String,
    /// JSON object with the fields to import
    #[arg(short, long, conflicts_with = "data_file")]
    pub data: Option<String>,
    /// File containing the JSON object to import
    #[arg(long)]
    pub data_file: Option<PathBuf>,
    #[command(flatten)]
    pub output: OutputArgs,
}

pub async fn handle_read_command(args: ReadCommands, config: &Config) -> Result<()> {
    let company = resolve_company(&args.company, config)?;
    let transport = HttpTransport::new(&config.transport)?;

    eprintln!("🔄 {}", format!("Reading '{}' from {}", args.operation, company).dimmed());
    let response = read_data(
        &transport,
        &company,
        &args.workspace,
        &args.operation,
        &args.entry_code,
    )
    .await
    .context("Read failed")?;

    args.output.print(&response)
}

pub async fn handle_import_command(args: ImportCommands, config: &Config) -> Result<()> {
    let company = resolve_company(&args.company, config)?;

    let raw = match (&args.data, &args.data_file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path.display()))?,
        (None, None) => anyhow::bail!("Either provide --data or use --data-file"),
    };
    let data: Value = serde_json::from_str(&raw).context("Import data is not valid JSON")?;

    let transport = HttpTransport::new(&config.transport)?;

    eprintln!("🔄 {}", format!("Importing via '{}' into {}", args.operation, company).dimmed());
    let response = import_data(
        &transport,
        &company,
        &args.workspace,
        &args.operation,
        &args.entry_code,
        &data,
    )
    .await
    .context("Import failed")?;

    eprintln!("{} {}", "✓".green(), "Import sent");
    args.output.print(&response)
}
