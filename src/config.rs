use std::path::Path;

use tracing::{info, warn};

use crate::ai::{MctsConfig, MinimaxConfig};
use crate::error::ConfigError;
use crate::game::{Board, COLS, ROWS};

/// Board geometry and win length.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Pieces in a line needed to win.
    pub connect_n: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: ROWS,
            cols: COLS,
            connect_n: 4,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::Validation(
                "game.rows and game.cols must be > 0".into(),
            ));
        }
        if self.connect_n < 2 {
            return Err(ConfigError::Validation(
                "game.connect_n must be >= 2".into(),
            ));
        }
        if self.connect_n > self.rows.max(self.cols) {
            return Err(ConfigError::Validation(
                "game.connect_n must fit on the board".into(),
            ));
        }
        Ok(())
    }

    /// An empty board with this geometry.
    pub fn empty_board(&self) -> Result<Board, ConfigError> {
        Board::with_size(self.rows, self.cols).map_err(|e| ConfigError::Validation(e.to_string()))
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub minimax: MinimaxConfig,
    pub mcts: MctsConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("Config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        self.minimax.validate(&self.game)?;
        self.mcts.validate()?;
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, ConfigError> {
        toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
    }
}
