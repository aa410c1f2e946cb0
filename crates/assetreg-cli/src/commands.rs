use anyhow::Context;
use assetreg_contract::{LedgerContract, Operation, TracingSink};
use assetreg_store::InMemoryWorldState;
use assetreg_types::Asset;
use colored::Colorize;
use serde_json::{json, Value};
use tracing::info;

use crate::cli::*;
use crate::config::{HostConfig, NotificationMode};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = HostConfig::load(cli.config.as_deref())?;
    if let Some(state) = cli.state {
        config.state_file = state;
    }

    match cli.command {
        Command::Invoke(args) => cmd_invoke(&config, args, cli.format),
        Command::Functions => cmd_functions(cli.format),
        Command::Config => cmd_config(&config, cli.format),
    }
}

fn build_contract(config: &HostConfig) -> LedgerContract<Asset> {
    let contract = LedgerContract::new(config.contract.clone());
    match config.notifications {
        NotificationMode::Log => contract.with_sink(TracingSink),
        NotificationMode::None => contract,
    }
}

/// Run one transaction function against the snapshot in `config.state_file`.
///
/// The snapshot is rewritten only when the function succeeds and can
/// write; a failed function leaves the file untouched.
pub fn execute(config: &HostConfig, function: &str, args: &[String]) -> anyhow::Result<Option<Value>> {
    info!(
        chaincode_id = %config.chaincode_id,
        function,
        args = args.len(),
        "invoking transaction function"
    );

    let store = InMemoryWorldState::load_or_new(&config.state_file)
        .with_context(|| format!("opening world state {}", config.state_file.display()))?;
    let contract = build_contract(config);

    let result = store
        .transact(|tx| contract.invoke(tx, function, args))
        .with_context(|| format!("{function} failed"))?;

    let read_only = Operation::from_name(function).is_some_and(|op| op.is_read_only());
    if !read_only {
        store
            .save(&config.state_file)
            .with_context(|| format!("saving world state {}", config.state_file.display()))?;
    }
    Ok(result)
}

fn cmd_invoke(config: &HostConfig, args: InvokeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let result = execute(config, &args.function, &args.args)?;
    match format {
        OutputFormat::Json => {
            println!("{}", result.unwrap_or(Value::Null));
        }
        OutputFormat::Text => match result {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("{} {} committed", "✓".green().bold(), args.function.bold()),
        },
    }
    Ok(())
}

fn cmd_functions(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let functions: Vec<Value> = Operation::ALL
                .iter()
                .map(|op| {
                    json!({
                        "name": op.name(),
                        "parameters": op.parameters(),
                        "readOnly": op.is_read_only(),
                    })
                })
                .collect();
            println!("{}", Value::Array(functions));
        }
        OutputFormat::Text => {
            for op in Operation::ALL {
                let params = op.parameters().join(" ");
                let marker = if op.is_read_only() { "query" } else { "submit" };
                println!("{:<16} {:<7} {}", op.name().bold(), marker.dimmed(), params.cyan());
            }
        }
    }
    Ok(())
}

fn cmd_config(config: &HostConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
