//! The conversion step
//!
//! Decodes the WAV source, hands a PCM intermediate to the MP3 encoder and
//! publishes the result at the destination only once it probes as MP3.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::audio::{load_wav, write_pcm16_wav, AudioBuffer};
use crate::encoder::{Mp3Encoder, Mp3Profile};
use crate::error::{ConvertError, Result};
use crate::mp3::{probe_file, Mp3Info};

/// Source file converted when no path is given
pub const DEFAULT_SOURCE: &str = "assets/audio/01_Welcome.wav";

/// Destination written when no path is given
pub const DEFAULT_DESTINATION: &str = "assets/audio/01_Welcome.mp3";

/// What the decoded source looked like
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub frames: u64,
    pub duration_secs: f64,
    /// Hex SHA-256 of the source file bytes
    pub sha256: String,
}

impl SourceInfo {
    fn new(buffer: &AudioBuffer, sha256: String) -> Self {
        Self {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: buffer.bits_per_sample(),
            frames: buffer.num_frames() as u64,
            duration_secs: buffer.duration(),
            sha256,
        }
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub encoder: String,
    pub profile: Mp3Profile,
    pub input: SourceInfo,
    pub output: Mp3Info,
}

impl ConversionReport {
    /// MP3 duration minus WAV duration; encoders pad to whole frames
    pub fn duration_drift_secs(&self) -> f64 {
        self.output.duration_secs - self.input.duration_secs
    }

    /// Generate a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "{} -> {}\n\
             Input:  {} ch @ {} Hz, {}-bit, {:.2}s\n\
             Output: {}\n\
             Encoder: {} ({})",
            self.source.display(),
            self.destination.display(),
            self.input.channels,
            self.input.sample_rate,
            self.input.bits_per_sample,
            self.input.duration_secs,
            self.output.summary(),
            self.encoder,
            self.profile
        )
    }
}

/// Converts WAV files to MP3 through an [`Mp3Encoder`]
pub struct Converter<E> {
    encoder: E,
    profile: Mp3Profile,
}

impl<E: Mp3Encoder> Converter<E> {
    /// Create a converter using the default profile
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            profile: Mp3Profile::default(),
        }
    }

    /// Use a different encoding profile
    pub fn with_profile(mut self, profile: Mp3Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Convert `source` to MP3 at `destination`
    ///
    /// Nothing is written to `destination` unless every step succeeds; an
    /// existing destination file is replaced only by a probed MP3.
    ///
    /// # Errors
    /// * `InvalidProfile` - If the profile is not a legal MP3 setting
    /// * `FileNotFound`, `InvalidAudio`, `UnsupportedFormat`, `EmptyAudio` -
    ///   If the source cannot be decoded
    /// * `EncoderNotFound`, `EncoderFailed` - If the encoder cannot run
    /// * `InvalidMp3` - If the encoder produced something that is not MP3
    pub fn convert(&self, source: &Path, destination: &Path) -> Result<ConversionReport> {
        self.profile.validate()?;

        info!("Decoding {}", source.display());
        let buffer = load_wav(source)?;
        let input = SourceInfo::new(&buffer, sha256_file(source)?);
        debug!(
            "Decoded {} frames ({:.2}s, {} ch @ {} Hz)",
            input.frames, input.duration_secs, input.channels, input.sample_rate
        );

        let pcm = tempfile::Builder::new()
            .prefix("wav2mp3-")
            .suffix(".wav")
            .tempfile()?;
        write_pcm16_wav(&buffer, pcm.path())?;
        drop(buffer);

        let staged = stage(destination)?;

        info!(
            "Encoding with {} ({}) -> {}",
            self.encoder.name(),
            self.profile,
            destination.display()
        );
        self.encoder.encode(pcm.path(), staged.path(), &self.profile)?;

        let output = probe_file(staged.path())?;
        debug!("Encoded stream: {}", output.summary());

        publish(staged, destination)?;
        info!("Wrote {}", destination.display());

        Ok(ConversionReport {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            encoder: self.encoder.name().to_string(),
            profile: self.profile,
            input,
            output,
        })
    }
}

fn staging_dir(destination: &Path) -> &Path {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Create the file the encoder writes into, next to the destination so the
/// final rename stays on one filesystem
fn stage(destination: &Path) -> Result<tempfile::NamedTempFile<File>> {
    // Opened like File::create, so the published file gets the umask's mode
    let staged = tempfile::Builder::new()
        .prefix(".wav2mp3-")
        .suffix(".mp3")
        .make_in(staging_dir(destination), |path| {
            OpenOptions::new().write(true).create_new(true).open(path)
        })?;
    Ok(staged)
}

fn publish(staged: tempfile::NamedTempFile<File>, destination: &Path) -> Result<()> {
    staged
        .persist(destination)
        .map_err(|e| ConvertError::Io(e.error))?;
    Ok(())
}

fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Encoder that fails without touching its output
    struct FailingEncoder;

    impl Mp3Encoder for FailingEncoder {
        fn name(&self) -> &str {
            "failing"
        }

        fn encode(&self, _input: &Path, _output: &Path, _profile: &Mp3Profile) -> Result<()> {
            Err(ConvertError::EncoderFailed {
                encoder: "failing".to_string(),
                status: Some(1),
                stderr: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_staging_dir() {
        assert_eq!(staging_dir(Path::new("out.mp3")), Path::new("."));
        assert_eq!(
            staging_dir(Path::new("assets/audio/01_Welcome.mp3")),
            Path::new("assets/audio")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_published_file_mode_matches_file_create() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let reference = dir.path().join("reference.mp3");
        File::create(&reference).unwrap();
        let destination = dir.path().join("out.mp3");

        let staged = stage(&destination).unwrap();
        std::fs::write(staged.path(), b"encoded").unwrap();
        publish(staged, &destination).unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&destination), mode(&reference));
        assert_eq!(std::fs::read(&destination).unwrap(), b"encoded");
    }

    #[test]
    fn test_sha256_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abc.bin");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_invalid_profile_rejected_before_decoding() {
        let converter = Converter::new(FailingEncoder).with_profile(Mp3Profile::Cbr { kbps: 1 });
        let result = converter.convert(Path::new("missing.wav"), Path::new("missing.mp3"));
        assert!(matches!(result, Err(ConvertError::InvalidProfile { .. })));
    }

    #[test]
    fn test_missing_source_writes_nothing() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("out.mp3");

        let result = Converter::new(FailingEncoder).convert(&dir.path().join("missing.wav"), &destination);

        assert!(matches!(result, Err(ConvertError::FileNotFound { .. })));
        assert!(!destination.exists());
    }

    #[test]
    fn test_encoder_failure_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tone.wav");
        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        let destination = out_dir.join("tone.mp3");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&source, spec).unwrap();
        for i in 0..800 {
            writer.write_sample((i % 100) as i16 * 100).unwrap();
        }
        writer.finalize().unwrap();

        let result = Converter::new(FailingEncoder).convert(&source, &destination);

        assert!(matches!(result, Err(ConvertError::EncoderFailed { .. })));
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0);
    }
}
