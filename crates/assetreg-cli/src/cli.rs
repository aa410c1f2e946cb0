use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "assetreg",
    about = "Asset registry: run ledger transactions against a local world state",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// World-state snapshot file (overrides the configured one)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one transaction function and commit it
    Invoke(InvokeArgs),
    /// List the transaction functions and their parameters
    Functions,
    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Transaction function name, e.g. CreateAsset
    pub function: String,
    /// Positional arguments of the function
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}
