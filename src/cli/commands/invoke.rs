use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use relatics_api::api::{EndpointIdentity, Payload, RelaticsClient};
use relatics_api::config::Config;

use super::{CredentialArgs, OutputArgs};

#[derive(Args)]
pub struct InvokeCommands {
    /// Name of the generic API operation (e.g. GetInstances)
    pub operation: String,
    /// Values filled in after token, environment and workspace, in order
    pub values: Vec<String>,
    /// Company name, the subdomain of relaticsonline.com
    #[arg(short, long)]
    pub company: Option<String>,
    /// Environment ID
    #[arg(long)]
    pub environment_id: Option<String>,
    /// Workspace ID
    #[arg(short, long)]
    pub workspace_id: Option<String>,
    /// Print the rendered request envelope before sending
    #[arg(long)]
    pub show_request: bool,
    #[command(flatten)]
    pub credentials: CredentialArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

pub async fn handle_invoke_command(args: InvokeCommands, config: &Config) -> Result<()> {
    // Command line values win over the config file
    let mut config = config.clone();
    if args.company.is_some() {
        config.company_name = args.company.clone();
    }
    if args.environment_id.is_some() {
        config.environment_id = args.environment_id.clone();
    }
    if args.workspace_id.is_some() {
        config.workspace_id = args.workspace_id.clone();
    }

    let identity: EndpointIdentity = config.identity()?;
    let credentials = args.credentials.resolve()?;

    let client = RelaticsClient::connect_http(identity, credentials, &config.transport)
        .await
        .context("Failed to connect")?;
    eprintln!("{} {}", "✓".green(), client);

    let payload = match args.values.as_slice() {
        [single] => Payload::Single(single.clone()),
        values => Payload::Sequence(values.to_vec()),
    };

    let invocation = client
        .operation(args.operation.as_str())
        .call(payload)
        .await
        .with_context(|| format!("Invoking {} failed", args.operation))?;

    if args.show_request {
        eprintln!("{}", invocation.url.as_str().dimmed());
        eprintln!("{}", invocation.envelope.dimmed());
    }

    args.output.print(&invocation.response)
}
