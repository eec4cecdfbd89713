//! CLI command definitions and dispatch.

pub mod classify;
pub mod info;
pub mod simulate;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use unshare_common::config::ModuleConfig;

/// unshare-sim — inspect and replay the unshare zygote hooks.
#[derive(Parser, Debug)]
#[command(name = "unshare-sim", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Module configuration file (defaults to the stock Android uid layout).
    #[arg(long, global = true, env = "UNSHARE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify one or more uids.
    Classify(classify::ClassifyArgs),
    /// Run one specialization cycle through the module hooks.
    Simulate(simulate::SimulateArgs),
    /// Show the negotiated revision and module metadata.
    Info(info::InfoArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Classify(args) => classify::execute(&args, &config),
        Command::Simulate(args) => simulate::execute(&args, config),
        Command::Info(args) => info::execute(&args),
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ModuleConfig> {
    path.map_or_else(
        || Ok(ModuleConfig::default()),
        |path| {
            ModuleConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))
        },
    )
}
