//! CLI Module
//!
//! Command-line interface for wav2mp3.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;
use crate::encoder::Mp3Profile;

/// Convert a WAV file to MP3 using an external encoder
///
/// With no subcommand, converts assets/audio/01_Welcome.wav to
/// assets/audio/01_Welcome.mp3.
#[derive(Parser, Debug)]
#[command(name = "wav2mp3")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a WAV file to MP3
    #[command(name = "convert")]
    Convert {
        /// Source WAV file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Destination MP3 file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Constant bitrate in kbps
        #[arg(short, long, conflicts_with = "vbr")]
        bitrate: Option<u32>,

        /// Variable bitrate quality, 0 (best) to 9
        #[arg(long)]
        vbr: Option<u8>,

        /// Encoder binary (ffmpeg, avconv or lame)
        #[arg(short, long)]
        encoder: Option<PathBuf>,

        /// Print the conversion report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect an MP3 file
    #[command(name = "probe")]
    Probe {
        /// MP3 file to inspect
        path: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List MP3 encoders found on PATH
    #[command(name = "encoders")]
    Encoders,
}

/// Collect the overrides carried by `convert` flags
pub fn overrides(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    bitrate: Option<u32>,
    vbr: Option<u8>,
    encoder: Option<PathBuf>,
) -> ConfigOverrides {
    let profile = match (bitrate, vbr) {
        (_, Some(quality)) => Some(Mp3Profile::Vbr { quality }),
        (Some(kbps), None) => Some(Mp3Profile::Cbr { kbps }),
        (None, None) => None,
    };

    ConfigOverrides {
        source: input,
        destination: output,
        encoder,
        profile,
    }
}
