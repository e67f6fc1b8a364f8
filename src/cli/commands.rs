//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};

use crate::config::ConvertConfig;
use crate::convert::Converter;
use crate::encoder::{available_encoders, ExternalEncoder, Mp3Encoder};
use crate::error::Result;
use crate::mp3::probe_file;

/// Convert the configured source to the configured destination.
pub fn convert(config: &ConvertConfig, json: bool) -> Result<()> {
    info!(
        "Converting {} -> {}",
        config.source.display(),
        config.destination.display()
    );

    let encoder = ExternalEncoder::discover(config.encoder.as_deref())?;
    let converter = Converter::new(encoder).with_profile(config.profile);
    let report = converter.convert(&config.source, &config.destination)?;

    let drift = report.duration_drift_secs();
    if drift.abs() > 0.5 {
        warn!("MP3 duration differs from the source by {:.3}s", drift);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }

    Ok(())
}

/// Print what an MP3 file contains.
pub fn probe(path: &Path, json: bool) -> Result<()> {
    info!("Probing: {}", path.display());

    let info = probe_file(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.summary());
    }

    Ok(())
}

/// List the encoders found on PATH.
pub fn list_encoders() -> Result<()> {
    let encoders = available_encoders();

    if encoders.is_empty() {
        println!("No MP3 encoder found on PATH (looked for ffmpeg, avconv, lame).");
        return Ok(());
    }

    for encoder in &encoders {
        println!(
            "{:<8} {:<8} {}",
            encoder.name(),
            format!("{:?}", encoder.kind()),
            encoder.program().display()
        );
    }

    Ok(())
}
