//! Audio buffer implementation
//!
//! AudioBuffer holds the decoded source audio between the WAV decode and the
//! MP3 encode.

use crate::error::{ConvertError, Result};

/// Decoded audio sample data with metadata
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved audio samples normalized to -1.0..1.0
    samples: Vec<f32>,
    /// Number of audio channels (1 = mono, 2 = stereo)
    channels: u16,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Bit depth of the decoded source
    bits_per_sample: u16,
}

impl AudioBuffer {
    /// Create a new audio buffer with the given parameters
    pub fn new(
        samples: Vec<f32>,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
    ) -> Result<Self> {
        if channels == 0 || sample_rate == 0 {
            return Err(ConvertError::UnsupportedFormat {
                format: format!("{} channels at {} Hz", channels, sample_rate),
            });
        }
        if samples.is_empty() {
            return Err(ConvertError::EmptyAudio);
        }
        if samples.len() % channels as usize != 0 {
            return Err(ConvertError::InvalidAudio {
                reason: format!(
                    "Sample count {} is not divisible by channel count {}",
                    samples.len(),
                    channels
                ),
                source: None,
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
            bits_per_sample,
        })
    }

    /// Get a reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get the number of channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the bit depth the audio was decoded from
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Get the number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Get samples for a specific channel (0-indexed)
    pub fn channel_samples(&self, channel: u16) -> Vec<f32> {
        if channel >= self.channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(channel as usize)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_frames() {
        let buffer = AudioBuffer::new(vec![0.0; 44100 * 2], 2, 44100, 24).unwrap();
        assert_eq!(buffer.num_frames(), 44100);
        assert_eq!(buffer.bits_per_sample(), 24);
        assert!((buffer.duration() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_channel_extraction() {
        // L, R, L, R, L, R
        let samples = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let buffer = AudioBuffer::new(samples, 2, 44100, 16).unwrap();

        assert_eq!(buffer.num_frames(), 3);
        assert_eq!(buffer.channel_samples(0), vec![0.1, 0.3, 0.5]);
        assert_eq!(buffer.channel_samples(1), vec![0.2, 0.4, 0.6]);
        assert!(buffer.channel_samples(2).is_empty());
    }

    #[test]
    fn test_empty_buffer_error() {
        let result = AudioBuffer::new(vec![], 1, 44100, 16);
        assert!(matches!(result, Err(ConvertError::EmptyAudio)));
    }

    #[test]
    fn test_ragged_buffer_error() {
        let result = AudioBuffer::new(vec![0.0; 3], 2, 44100, 16);
        assert!(matches!(result, Err(ConvertError::InvalidAudio { .. })));
    }

    #[test]
    fn test_zero_channels_error() {
        let result = AudioBuffer::new(vec![0.0; 4], 0, 44100, 16);
        assert!(matches!(result, Err(ConvertError::UnsupportedFormat { .. })));
    }
}
