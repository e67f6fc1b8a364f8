//! wav2mp3 - WAV to MP3 conversion
//!
//! Decodes a WAV file, hands the audio to an external MP3 encoder
//! (ffmpeg, avconv or lame) and publishes the encoded file once it has been
//! verified as an MP3 stream.
//!
//! # Pipeline
//!
//! - `audio`: WAV decode into an [`AudioBuffer`] and the PCM intermediate
//! - `encoder`: the [`Mp3Encoder`] seam and the external encoder process
//! - `mp3`: stream probing used to verify encoder output
//! - `convert`: the conversion step tying these together

pub mod audio;
pub mod cli;
pub mod config;
pub mod convert;
pub mod encoder;
pub mod error;
pub mod mp3;

// Re-export commonly used types
pub use audio::AudioBuffer;
pub use config::ConvertConfig;
pub use convert::{ConversionReport, Converter};
pub use encoder::{ExternalEncoder, Mp3Encoder, Mp3Profile};
pub use error::{ConvertError, Result};
