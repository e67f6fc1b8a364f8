//! wav2mp3 CLI
//!
//! Command-line entry point. Without arguments it converts
//! assets/audio/01_Welcome.wav to assets/audio/01_Welcome.mp3.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::debug;

use wav2mp3::cli::{commands, overrides, Cli, Commands};
use wav2mp3::{ConvertConfig, ConvertError};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    debug!("wav2mp3 v{}", env!("CARGO_PKG_VERSION"));

    let result = run(cli);
    if let Err(err) = &result {
        if let Some(convert_err) = err.downcast_ref::<ConvertError>() {
            for hint in convert_err.recovery_suggestions() {
                eprintln!("hint: {}", hint);
            }
        }
    }
    result
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConvertConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        None => commands::convert(&config, false).with_context(|| {
            format!("Failed to convert {}", config.source.display())
        }),
        Some(Commands::Convert {
            input,
            output,
            bitrate,
            vbr,
            encoder,
            json,
        }) => {
            let config = config.with_overrides(overrides(input, output, bitrate, vbr, encoder));
            commands::convert(&config, json)
                .with_context(|| format!("Failed to convert {}", config.source.display()))
        }
        Some(Commands::Probe { path, json }) => {
            commands::probe(&path, json).with_context(|| format!("Failed to probe {}", path.display()))
        }
        Some(Commands::Encoders) => commands::list_encoders().context("Failed to list encoders"),
    }
}
