//! MP3 stream inspection
//!
//! Demuxes encoder output with symphonia to confirm it is an MP3 stream and to
//! recover its gapless length and layout. Nothing is decoded.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;
use serde::Serialize;
use symphonia::core::codecs::CODEC_TYPE_MP3;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{ConvertError, Result};

/// Summary of a probed MP3 stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mp3Info {
    pub sample_rate: u32,
    pub channels: u16,
    /// PCM frames per channel, after encoder delay and padding are trimmed
    pub frames: u64,
    /// MPEG audio frames, excluding a Xing/Info/VBRI metadata frame
    pub packets: u64,
    pub duration_secs: f64,
    pub average_bitrate_kbps: f64,
    /// Priming frames recorded by the encoder, 0 without a LAME tag
    pub encoder_delay: u32,
    pub encoder_padding: u32,
}

impl Mp3Info {
    /// Generate a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "MP3 | {} ch @ {} Hz | {} frames | {:.2}s | {:.0} kbps",
            self.channels, self.sample_rate, self.frames, self.duration_secs, self.average_bitrate_kbps
        )
    }
}

/// Open a file and probe it as MP3
pub fn probe_file(path: &Path) -> Result<Mp3Info> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ConvertError::FileNotFound {
                path: path.display().to_string(),
                source: Some(e),
            }
        } else {
            ConvertError::Io(e)
        }
    })?;
    probe_source(Box::new(file))
}

fn probe_source(source: Box<dyn MediaSource>) -> Result<Mp3Info> {
    let stream = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let format_opts = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };

    let probed = symphonia::default::get_probe()
        .format(&hint, stream, &format_opts, &MetadataOptions::default())
        .map_err(invalid_mp3)?;
    let mut format = probed.format;

    let track = format.default_track().ok_or_else(|| ConvertError::InvalidMp3 {
        reason: "no audio track".to_string(),
    })?;
    if track.codec_params.codec != CODEC_TYPE_MP3 {
        return Err(ConvertError::InvalidMp3 {
            reason: format!("unsupported codec {:?}", track.codec_params.codec),
        });
    }

    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params.sample_rate.ok_or_else(|| ConvertError::InvalidMp3 {
        reason: "stream has no sample rate".to_string(),
    })?;
    let channels = params.channels.map(|c| c.count() as u16).ok_or_else(|| ConvertError::InvalidMp3 {
        reason: "stream has no channel layout".to_string(),
    })?;

    let mut packets: u64 = 0;
    let mut frames: u64 = 0;
    let mut coded_frames: u64 = 0;
    let mut bytes: u64 = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(invalid_mp3(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        packets += 1;
        frames += packet.dur;
        coded_frames += packet.dur + u64::from(packet.trim_start) + u64::from(packet.trim_end);
        bytes += packet.buf().len() as u64;
    }

    if packets == 0 || coded_frames == 0 {
        return Err(ConvertError::InvalidMp3 {
            reason: "stream holds no audio frames".to_string(),
        });
    }

    if let Some(n_frames) = params.n_frames {
        if n_frames != frames {
            debug!("Header reports {} frames, counted {}", n_frames, frames);
        }
    }

    Ok(Mp3Info {
        sample_rate,
        channels,
        frames,
        packets,
        duration_secs: frames as f64 / f64::from(sample_rate),
        average_bitrate_kbps: bytes as f64 * 8.0 * f64::from(sample_rate) / (coded_frames as f64 * 1000.0),
        encoder_delay: params.delay.unwrap_or(0),
        encoder_padding: params.padding.unwrap_or(0),
    })
}

fn invalid_mp3(e: SymphoniaError) -> ConvertError {
    ConvertError::InvalidMp3 {
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const SAMPLES_PER_FRAME: u64 = 1152;

    /// MPEG-1 Layer III stream of zero-filled CBR frames without padding
    fn cbr_stream(kbps: u32, sample_rate: u32, mono: bool, count: usize) -> Vec<u8> {
        let bitrate_index = [32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320]
            .iter()
            .position(|&k| k == kbps)
            .unwrap() as u8
            + 1;
        let rate_index = [44100, 48000, 32000]
            .iter()
            .position(|&r| r == sample_rate)
            .unwrap() as u8;
        let mode = if mono { 0xC0 } else { 0x40 };
        let header = [0xFF, 0xFB, (bitrate_index << 4) | (rate_index << 2), mode];
        let frame_len = (144 * kbps * 1000 / sample_rate) as usize;

        let mut data = Vec::with_capacity(frame_len * count);
        for _ in 0..count {
            let start = data.len();
            data.extend_from_slice(&header);
            data.resize(start + frame_len, 0);
        }
        data
    }

    fn probe_bytes(data: Vec<u8>) -> Result<Mp3Info> {
        probe_source(Box::new(Cursor::new(data)))
    }

    #[test]
    fn test_probe_cbr_stream() {
        let info = probe_bytes(cbr_stream(128, 44100, false, 10)).unwrap();

        assert_eq!(info.packets, 10);
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 44100);
        // Without a LAME tag there is nothing to trim beyond the decoder delay
        assert!(info.frames <= 10 * SAMPLES_PER_FRAME);
        assert!(info.frames > 9 * SAMPLES_PER_FRAME);
        assert_relative_eq!(info.duration_secs, info.frames as f64 / 44100.0, epsilon = 1e-9);
        assert_relative_eq!(info.average_bitrate_kbps, 128.0, epsilon = 0.5);
    }

    #[test]
    fn test_probe_mono_stream() {
        let info = probe_bytes(cbr_stream(64, 48000, true, 4)).unwrap();

        assert_eq!(info.channels, 1);
        assert_eq!(info.sample_rate, 48000);
        assert_eq!(info.packets, 4);
        assert_relative_eq!(info.average_bitrate_kbps, 64.0, epsilon = 1e-6);
    }

    #[test]
    fn test_probe_rejects_non_mp3() {
        let text = b"<html><body>Unknown encoder 'libmp3lame'</body></html>\n".to_vec();
        assert!(matches!(probe_bytes(text), Err(ConvertError::InvalidMp3 { .. })));
        assert!(matches!(probe_bytes(Vec::new()), Err(ConvertError::InvalidMp3 { .. })));
    }

    #[test]
    fn test_probe_file_reads_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.mp3");
        std::fs::write(&path, cbr_stream(192, 32000, false, 6)).unwrap();

        let info = probe_file(&path).unwrap();
        assert_eq!(info.packets, 6);
        assert_eq!(info.sample_rate, 32000);
    }

    #[test]
    fn test_probe_file_missing() {
        let result = probe_file(Path::new("definitely/not/here.mp3"));
        assert!(matches!(result, Err(ConvertError::FileNotFound { .. })));
    }
}
