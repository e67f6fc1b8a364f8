//! External encoder process
//!
//! Runs ffmpeg (or avconv) or lame as a child process. The binary is found
//! from an explicit path, the `WAV2MP3_ENCODER` environment variable, or PATH.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};

use super::{Mp3Encoder, Mp3Profile};
use crate::error::{ConvertError, Result};

/// Environment variable naming the encoder binary
pub const ENCODER_ENV_VAR: &str = "WAV2MP3_ENCODER";

/// Binaries looked up on PATH, in order of preference
const PATH_CANDIDATES: [(&str, EncoderKind); 3] = [
    ("ffmpeg", EncoderKind::Ffmpeg),
    ("avconv", EncoderKind::Ffmpeg),
    ("lame", EncoderKind::Lame),
];

/// Command-line dialect spoken by an encoder binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    /// ffmpeg and avconv with libmp3lame
    Ffmpeg,
    /// The LAME frontend
    Lame,
}

impl EncoderKind {
    /// Guess the dialect from a binary path: anything named like lame is
    /// LAME, everything else is treated as ffmpeg-compatible
    pub fn infer(program: &Path) -> Self {
        let stem = program
            .file_stem()
            .map(|s| s.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if stem.contains("lame") {
            EncoderKind::Lame
        } else {
            EncoderKind::Ffmpeg
        }
    }

    /// Build the argument list for encoding `input` into `output`
    pub fn args(&self, input: &Path, output: &Path, profile: &Mp3Profile) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        match self {
            EncoderKind::Ffmpeg => {
                args.extend(
                    ["-hide_banner", "-loglevel", "error", "-y", "-f", "wav", "-i"]
                        .map(OsString::from),
                );
                args.push(input.into());
                args.extend(["-vn", "-codec:a", "libmp3lame"].map(OsString::from));
                match profile {
                    Mp3Profile::Cbr { kbps } => {
                        args.push("-b:a".into());
                        args.push(format!("{}k", kbps).into());
                    }
                    Mp3Profile::Vbr { quality } => {
                        args.push("-q:a".into());
                        args.push(quality.to_string().into());
                    }
                }
                args.extend(["-f", "mp3"].map(OsString::from));
                args.push(output.into());
            }
            EncoderKind::Lame => {
                args.push("--silent".into());
                match profile {
                    Mp3Profile::Cbr { kbps } => {
                        args.push("-b".into());
                        args.push(kbps.to_string().into());
                        args.push("--cbr".into());
                    }
                    Mp3Profile::Vbr { quality } => {
                        args.push("-V".into());
                        args.push(quality.to_string().into());
                    }
                }
                args.push(input.into());
                args.push(output.into());
            }
        }
        args
    }
}

/// An encoder binary on this host
#[derive(Debug, Clone)]
pub struct ExternalEncoder {
    kind: EncoderKind,
    program: PathBuf,
    name: String,
}

impl ExternalEncoder {
    /// Create an encoder for a known binary without checking that it exists
    pub fn new(kind: EncoderKind, program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self { kind, program, name }
    }

    /// Resolve a binary path or bare name, inferring its dialect
    pub fn from_path(program: &Path) -> Result<Self> {
        let resolved = which::which(program).map_err(|e| {
            debug!("Encoder {} not usable: {}", program.display(), e);
            ConvertError::EncoderNotFound {
                searched: vec![program.display().to_string()],
            }
        })?;
        Ok(Self::new(EncoderKind::infer(program), resolved))
    }

    /// Find an encoder: the explicit path first, then `WAV2MP3_ENCODER`,
    /// then ffmpeg, avconv and lame on PATH
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        if let Ok(value) = std::env::var(ENCODER_ENV_VAR) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Self::from_path(Path::new(trimmed));
            }
        }

        for (name, kind) in PATH_CANDIDATES {
            if let Ok(path) = which::which(name) {
                info!("Using encoder {}", path.display());
                return Ok(Self::new(kind, path));
            }
        }

        Err(ConvertError::EncoderNotFound {
            searched: PATH_CANDIDATES
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
        })
    }

    pub fn kind(&self) -> EncoderKind {
        self.kind
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Mp3Encoder for ExternalEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, input: &Path, output: &Path, profile: &Mp3Profile) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.kind.args(input, output, profile))
            .stdin(Stdio::null());
        debug!("Running encoder: {:?}", cmd);

        // output() drains stdout and stderr, so a chatty encoder cannot block
        let result = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConvertError::EncoderNotFound {
                    searched: vec![self.program.display().to_string()],
                }
            } else {
                ConvertError::Io(e)
            }
        })?;

        if !result.status.success() {
            return Err(ConvertError::EncoderFailed {
                encoder: self.name.clone(),
                status: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Every known encoder found on PATH
pub fn available_encoders() -> Vec<ExternalEncoder> {
    PATH_CANDIDATES
        .iter()
        .filter_map(|&(name, kind)| {
            which::which(name)
                .ok()
                .map(|path| ExternalEncoder::new(kind, path))
        })
        .collect()
}
