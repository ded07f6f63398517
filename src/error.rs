use std::path::PathBuf;

use crate::game::MoveError;

/// Errors that abort a single move decision.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("illegal move: {0}")]
    IllegalMove(#[from] MoveError),

    /// The board has no open column; the harness should score it as a draw.
    #[error("no legal move: the board is full")]
    NoLegalMove,

    #[error("invalid search configuration: {0}")]
    InvalidConfiguration(String),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for SearchError {
    fn from(err: ConfigError) -> Self {
        SearchError::InvalidConfiguration(err.to_string())
    }
}
