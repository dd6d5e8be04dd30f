//! Command-line interface definitions.

pub mod exchanges;
pub mod run;
pub mod stats;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Bridgewatch - bridge-asset corridor detection across exchanges.
#[derive(Parser, Debug)]
#[command(name = "bridgewatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the corridor detector (default)
    Run(RunArgs),

    /// List the exchange registry
    Exchanges(ExchangesArgs),

    /// Show statistics from the configured database
    Stats(StatsArgs),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug, Default)]
pub struct ConfigPathArg {
    /// Path to configuration file [default: config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ConfigPathArg {
    /// Load the named config, or `config.toml` if present, or defaults.
    ///
    /// # Errors
    /// Returns an error if an explicitly named file cannot be read, or any
    /// file that is read fails to parse or validate.
    pub fn load(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH),
            None => Ok(Config::default()),
        }
    }
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigPathArg,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `exchanges` subcommand.
#[derive(Parser, Debug)]
pub struct ExchangesArgs {
    #[command(flatten)]
    pub config: ConfigPathArg,

    /// JSON output for scripting
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `stats` subcommand.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub config: ConfigPathArg,

    /// JSON output for scripting
    #[arg(long)]
    pub json: bool,

    /// Also list this many of the latest events
    #[arg(long, default_value = "0")]
    pub recent: usize,
}
