use std::io;

use format_serde_error::SerdeError;
use thiserror::Error;

/// Error while reading the relay's configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error loading config file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config data: {0}")]
    MalformedConfig(#[from] SerdeError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
