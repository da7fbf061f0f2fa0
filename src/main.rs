// Main entry point for allure-runtime

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::{debug, info, warn};

use allure_runtime::cli::{Cli, Commands, RelayArgs};
use allure_runtime::config::ReporterConfig;
use allure_runtime::logging;
use allure_runtime::runtime::ReporterRuntime;
use allure_runtime::writer::{FileSystemWriter, WriterMessage, WriterRegistry, replay};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = ReporterConfig::load()
        .context("Failed to load configuration")?
        .unwrap_or_else(ReporterConfig::from_env);

    match cli.command {
        Commands::Relay(args) => run_relay(&args, config),
        Commands::Config => {
            print!("{}", config.to_toml());
            Ok(())
        }
    }
}

fn run_relay(args: &RelayArgs, mut config: ReporterConfig) -> Result<()> {
    if let Some(dir) = &args.results_dir {
        config.results_dir = dir.clone();
    }
    let writer = FileSystemWriter::new(config.results_dir.clone());
    debug!("Relaying messages into {}", config.results_dir.display());

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut written = 0usize;
    let mut skipped = 0usize;
    for (index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read relay input")?;
        if line.trim().is_empty() {
            continue;
        }
        let relayed = serde_json::from_str::<WriterMessage>(&line)
            .map_err(Into::into)
            .and_then(|message| replay(&message, &writer));
        match relayed {
            Ok(()) => written += 1,
            Err(e) => {
                warn!("Skipping line {}: {}", index + 1, e);
                skipped += 1;
            }
        }
    }

    if args.with_config_files {
        // The runtime writes through the results directory chosen above.
        config.writer = None;
        let runtime = ReporterRuntime::from_config(&config, &WriterRegistry::new())
            .context("Failed to set up the reporter from configuration")?;
        runtime.write_environment_info();
        runtime.write_categories_definitions();
    }

    info!(
        "Relayed {} messages into {} ({} skipped)",
        written,
        config.results_dir.display(),
        skipped
    );
    Ok(())
}
