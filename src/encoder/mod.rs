//! MP3 encoding
//!
//! MP3 encoding is delegated to an external binary. The [`Mp3Encoder`]
//! trait is the seam between the conversion pipeline and that binary.

mod external;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

pub use external::{available_encoders, EncoderKind, ExternalEncoder, ENCODER_ENV_VAR};

/// Constant bitrates allowed by MPEG-1 Layer III, in kbps
pub const CBR_BITRATES: [u32; 14] = [32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];

/// Best (0) and worst (9) LAME VBR quality
pub const VBR_QUALITY_RANGE: std::ops::RangeInclusive<u8> = 0..=9;

/// Encoder settings handed to the MP3 encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Mp3Profile {
    /// Constant bitrate
    Cbr { kbps: u32 },
    /// LAME variable bitrate quality, 0 is best
    Vbr { quality: u8 },
}

impl Default for Mp3Profile {
    /// 128 kbps CBR, the libmp3lame default
    fn default() -> Self {
        Mp3Profile::Cbr { kbps: 128 }
    }
}

impl Mp3Profile {
    /// Check the profile against the legal MP3 settings
    pub fn validate(&self) -> Result<()> {
        match *self {
            Mp3Profile::Cbr { kbps } if !CBR_BITRATES.contains(&kbps) => {
                Err(ConvertError::InvalidProfile {
                    reason: format!("{} kbps is not a Layer III bitrate", kbps),
                })
            }
            Mp3Profile::Vbr { quality } if !VBR_QUALITY_RANGE.contains(&quality) => {
                Err(ConvertError::InvalidProfile {
                    reason: format!("VBR quality {} is outside 0..=9", quality),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Mp3Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mp3Profile::Cbr { kbps } => write!(f, "{} kbps CBR", kbps),
            Mp3Profile::Vbr { quality } => write!(f, "VBR V{}", quality),
        }
    }
}

/// Anything that can turn a PCM WAV file into an MP3 file
pub trait Mp3Encoder {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Encode `input` (16-bit PCM WAV) into `output` with the given profile
    ///
    /// `output` may already exist and must be overwritten.
    fn encode(&self, input: &Path, output: &Path, profile: &Mp3Profile) -> Result<()>;
}

impl<E: Mp3Encoder + ?Sized> Mp3Encoder for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn encode(&self, input: &Path, output: &Path, profile: &Mp3Profile) -> Result<()> {
        (**self).encode(input, output, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = Mp3Profile::default();
        assert_eq!(profile, Mp3Profile::Cbr { kbps: 128 });
        assert!(profile.validate().is_ok());
        assert_eq!(profile.to_string(), "128 kbps CBR");
    }

    #[test]
    fn test_profile_validation() {
        assert!(Mp3Profile::Cbr { kbps: 320 }.validate().is_ok());
        assert!(Mp3Profile::Vbr { quality: 0 }.validate().is_ok());
        assert!(matches!(
            Mp3Profile::Cbr { kbps: 100 }.validate(),
            Err(ConvertError::InvalidProfile { .. })
        ));
        assert!(matches!(
            Mp3Profile::Vbr { quality: 10 }.validate(),
            Err(ConvertError::InvalidProfile { .. })
        ));
    }

    #[test]
    fn test_profile_json_shape() {
        let json = serde_json::to_string(&Mp3Profile::Vbr { quality: 2 }).unwrap();
        assert_eq!(json, r#"{"mode":"vbr","quality":2}"#);

        let parsed: Mp3Profile = serde_json::from_str(r#"{"mode":"cbr","kbps":192}"#).unwrap();
        assert_eq!(parsed, Mp3Profile::Cbr { kbps: 192 });
    }
}
