use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preprocess::{ChannelOrder, Interpolation, PreprocessOptions};

/// File read from the working directory at startup, if present.
pub const CONFIG_FILE: &str = "digit-canvas.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("invalid configuration in {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
}

/// Server settings.  Every field has a default, so a partial file (or no
/// file at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Model JSON produced by the training pipeline.
    pub model_path: String,
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`.
    pub log_level: String,
    pub interpolation: Interpolation,
    pub channel_order: ChannelOrder,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr:     "127.0.0.1:7878".to_owned(),
            model_path:    "trained_models/digits.json".to_owned(),
            log_level:     "info".to_owned(),
            interpolation: Interpolation::default(),
            channel_order: ChannelOrder::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
            Err(source) => return Err(ConfigError::Io { path: display, source }),
        };
        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| ConfigError::Parse { path: display, source })
    }

    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            interpolation: self.interpolation,
            channel_order: self.channel_order,
        }
    }
}
