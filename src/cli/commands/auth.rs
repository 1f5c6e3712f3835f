use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use relatics_api::api::{HttpTransport, login};
use relatics_api::config::Config;

use super::{CredentialArgs, resolve_company};

#[derive(Args)]
pub struct LoginCommands {
    /// Company name, the subdomain of relaticsonline.com
    #[arg(short, long)]
    pub company: Option<String>,
    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Log in and print the session token
pub async fn handle_login_command(args: LoginCommands, config: &Config) -> Result<()> {
    let company = resolve_company(&args.company, config)?;
    let credentials = args.credentials.resolve()?;
    let transport = HttpTransport::new(&config.transport)?;

    eprintln!("🔐 {}", format!("Logging in to {} ({})", company, credentials).dimmed());
    let token = login(&transport, &company, &credentials)
        .await
        .context("Login failed")?;

    eprintln!("{} {}", "✓".green(), "Logged in");
    println!("{}", token.as_str());
    Ok(())
}
