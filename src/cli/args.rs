// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Allure reporter runtime tooling
#[derive(Parser, Debug)]
#[command(name = "allure-runtime")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Write Allure results relayed from other processes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write relayed writer messages (JSON lines) into a results directory
    Relay(RelayArgs),

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct RelayArgs {
    /// Results directory (defaults to the configured one)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// File with one message per line; stdin when omitted
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write environment.properties and categories.json from configuration
    #[arg(long, default_value_t = false)]
    pub with_config_files: bool,
}
