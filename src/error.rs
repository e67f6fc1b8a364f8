//! Error handling for wav2mp3
//!
//! All errors carry a stable error code and recovery suggestions.

use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Main error type for conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Encoder Errors
    #[error("Invalid MP3 profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("No MP3 encoder found (searched: {})", .searched.join(", "))]
    EncoderNotFound { searched: Vec<String> },

    #[error("Encoder '{encoder}' failed with status {}: {stderr}", .status.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    EncoderFailed {
        encoder: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Encoder output is not a valid MP3 stream: {reason}")]
    InvalidMp3 { reason: String },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConvertError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ConvertError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ConvertError::InvalidAudio { .. } => "INVALID_AUDIO",
            ConvertError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ConvertError::EmptyAudio => "EMPTY_AUDIO",
            ConvertError::InvalidProfile { .. } => "INVALID_PROFILE",
            ConvertError::EncoderNotFound { .. } => "ENCODER_NOT_FOUND",
            ConvertError::EncoderFailed { .. } => "ENCODER_FAILED",
            ConvertError::InvalidMp3 { .. } => "INVALID_MP3",
            ConvertError::Config { .. } => "CONFIG_ERROR",
            ConvertError::Io(_) => "IO_ERROR",
            ConvertError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ConvertError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Run from the directory that contains assets/audio",
            ],
            ConvertError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "The file may be corrupted - try re-exporting it as PCM WAV",
            ],
            ConvertError::UnsupportedFormat { .. } => vec![
                "Re-export as mono or stereo PCM WAV",
                "Supported depths: 8, 16, 24, 32-bit integer and 32-bit float",
            ],
            ConvertError::InvalidProfile { .. } => vec![
                "Use a bitrate of 32-320 kbps from the MPEG-1 Layer III table",
                "VBR quality must be between 0 (best) and 9",
            ],
            ConvertError::EncoderNotFound { .. } => vec![
                "Install ffmpeg or lame and make sure it is on PATH",
                "Point WAV2MP3_ENCODER at the encoder binary",
            ],
            ConvertError::EncoderFailed { .. } => vec![
                "Run again with --verbose to see the encoder command line",
                "Check that the encoder was built with MP3 (libmp3lame) support",
            ],
            ConvertError::InvalidMp3 { .. } => vec![
                "Check that the configured binary is really an MP3 encoder",
            ],
            ConvertError::Config { .. } => vec![
                "Check the configuration file is valid JSON",
                "Remove unknown keys from the configuration file",
            ],
            _ => vec![],
        }
    }
}
