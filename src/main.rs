use anyhow::Result;
use clap::Parser;
use log::info;

mod cli;

use cli::commands::{
    handle_import_command, handle_invoke_command, handle_login_command, handle_read_command,
};
use cli::{Cli, Commands};
use relatics_api::config::Config;

fn init_logging(log_stderr: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if !log_stderr {
        // Initialize logger to file (truncate on each run)
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open("relatics-cli.log")?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_stderr)?;
    info!("Starting relatics-cli");

    let config = Config::load()?;

    match cli.command {
        Commands::Read(args) => handle_read_command(args, &config).await,
        Commands::Import(args) => handle_import_command(args, &config).await,
        Commands::Login(args) => handle_login_command(args, &config).await,
        Commands::Invoke(args) => handle_invoke_command(args, &config).await,
    }
}
