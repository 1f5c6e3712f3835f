use super::commands::{ImportCommands, InvokeCommands, LoginCommands, ReadCommands};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "relatics-cli")]
#[command(about = "A CLI tool for reading and writing Relatics workspaces through the SOAP web services")]
pub struct Cli {
    /// Write log output to stderr instead of relatics-cli.log
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read data through a webservice entry (GetResult)
    Read(ReadCommands),
    /// Import data through an import definition
    Import(ImportCommands),
    /// Log in to the generic API and print the session token
    Login(LoginCommands),
    /// Invoke any generic API operation by name
    Invoke(InvokeCommands),
}
