//! Audio file I/O for wav2mp3
//!
//! Decodes the WAV source into an AudioBuffer and writes the 16-bit PCM
//! intermediate that is handed to the MP3 encoder.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::audio::AudioBuffer;
use crate::error::{ConvertError, Result};

/// MP3 carries at most two channels
const MAX_CHANNELS: u16 = 2;

/// Decode a WAV file into an AudioBuffer
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the bit depth is unsupported or the audio has
///   more than 2 channels
/// * `EmptyAudio` - If the file holds no sample frames
pub fn load_wav(path: &Path) -> Result<AudioBuffer> {
    if !path.is_file() {
        return Err(ConvertError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| ConvertError::InvalidAudio {
        reason: format!("Failed to open WAV file {}: {}", path.display(), e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    debug!(
        "WAV header: {} ch, {} Hz, {}-bit {:?}",
        spec.channels, spec.sample_rate, spec.bits_per_sample, spec.sample_format
    );

    if spec.channels > MAX_CHANNELS {
        return Err(ConvertError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", spec.channels),
        });
    }

    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    AudioBuffer::new(samples, spec.channels, spec.sample_rate, spec.bits_per_sample)
}

/// Write an AudioBuffer as a 16-bit signed PCM WAV file
pub fn write_pcm16_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_write_error)?;

    for &sample in buffer.samples() {
        // Inverse of the 1/32768 decode scale, so 16-bit sources pass through unchanged
        let scaled = (sample * 32768.0)
            .round()
            .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
        writer.write_sample(scaled).map_err(wav_write_error)?;
    }

    writer.finalize().map_err(wav_write_error)?;

    Ok(())
}

fn wav_write_error(e: hound::Error) -> ConvertError {
    match e {
        hound::Error::IoError(io) => ConvertError::Io(io),
        other => ConvertError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            other.to_string(),
        )),
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let scale = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => {
            return reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| sample_read_error("float", e));
        }
        (SampleFormat::Int, 8) => 128.0,
        (SampleFormat::Int, 16) => 32768.0,
        (SampleFormat::Int, 24) => 8388608.0,
        (SampleFormat::Int, 32) => 2147483648.0,
        (format, bits) => {
            return Err(ConvertError::UnsupportedFormat {
                format: format!("{}-bit {:?} audio", bits, format),
            });
        }
    };

    // hound widens 8/16/24-bit integer samples into i32
    reader
        .samples::<i32>()
        .map(|s| s.map(|v| (v as f64 / scale) as f32))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| sample_read_error(&format!("{}-bit", bits_per_sample), e))
}

fn sample_read_error(kind: &str, e: hound::Error) -> ConvertError {
    ConvertError::InvalidAudio {
        reason: format!("Failed to read {} samples: {}", kind, e),
        source: Some(Box::new(e)),
    }
}
