//! Conversion configuration
//!
//! Built-in defaults reproduce the fixed-path conversion. A JSON file and
//! command-line flags can override them, flags taking precedence.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::convert::{DEFAULT_DESTINATION, DEFAULT_SOURCE};
use crate::encoder::Mp3Profile;
use crate::error::{ConvertError, Result};

/// Settings for one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// WAV file to read
    pub source: PathBuf,
    /// MP3 file to write
    pub destination: PathBuf,
    /// Encoder binary; discovered when unset
    pub encoder: Option<PathBuf>,
    pub profile: Mp3Profile,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            source: PathBuf::from(DEFAULT_SOURCE),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            encoder: None,
            profile: Mp3Profile::default(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub encoder: Option<PathBuf>,
    pub profile: Option<Mp3Profile>,
}

impl ConvertConfig {
    /// Defaults, overlaid with `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Read a JSON configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;

        let config: Self = serde_json::from_str(&text).map_err(|e| ConvertError::Config {
            reason: format!("{}: {}", path.display(), e),
        })?;

        config.profile.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of this configuration
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(destination) = overrides.destination {
            self.destination = destination;
        }
        if let Some(encoder) = overrides.encoder {
            self.encoder = Some(encoder);
        }
        if let Some(profile) = overrides.profile {
            self.profile = profile;
        }
        self
    }
}
