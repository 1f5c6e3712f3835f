pub mod auth;
pub mod data;
pub mod invoke;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use relatics_api::api::SoapResponse;
use relatics_api::auth::Credentials;
use relatics_api::config::Config;
use std::path::PathBuf;

pub use auth::{LoginCommands, handle_login_command};
pub use data::{ImportCommands, ReadCommands, handle_import_command, handle_read_command};
pub use invoke::{InvokeCommands, handle_invoke_command};

/// How a SOAP response is printed
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ResponseFormat {
    /// The raw XML exactly as returned
    #[default]
    Raw,
    /// The SOAP body content as JSON
    Parsed,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "raw")]
    pub format: ResponseFormat,
}

impl OutputArgs {
    pub fn print(&self, response: &SoapResponse) -> Result<()> {
        match self.format {
            ResponseFormat::Raw => println!("{}", response.text()),
            ResponseFormat::Parsed => {
                let node = response.parse().context("Failed to parse response")?;
                println!("{}", serde_json::to_string_pretty(&node)?);
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    /// Username (falls back to RELATICS_USERNAME)
    #[arg(long)]
    pub username: Option<String>,
    /// Password (falls back to RELATICS_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,
    /// Read credentials from the specified .env file
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

impl CredentialArgs {
    pub fn resolve(&self) -> Result<Credentials> {
        match (&self.username, &self.password, &self.env_file) {
            (Some(username), Some(password), _) => Ok(Credentials::from_command_line(
                username.clone(),
                password.clone(),
            )),
            (None, None, Some(path)) => Credentials::from_env_file(path),
            (None, None, None) => Credentials::from_env(),
            _ => anyhow::bail!("--username and --password must be given together"),
        }
    }
}

/// Company name from the command line, otherwise from the config
pub fn resolve_company(company: &Option<String>, config: &Config) -> Result<String> {
    company
        .clone()
        .or_else(|| config.company_name.clone())
        .context("No company name given (use --company or set RELATICS_COMPANY)")
}
