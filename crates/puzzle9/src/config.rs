use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::TileId;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Board of {width}x{height} is not playable")]
    BoardSize { width: usize, height: usize },

    #[error("Board width {0} must be odd for the parity check")]
    EvenWidth(usize),

    #[error("Empty tile position {position} is outside 1..={len}")]
    EmptyPosition { position: usize, len: usize },

    #[error("Allotted time must be positive, got {0}")]
    AllottedTime(f32),

    #[error("Cell size must be positive, got {0}")]
    CellSize(f32),

    #[error("Could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config {path:?} is invalid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Setup-time settings. Missing fields in a config file take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    pub width: usize,
    pub height: usize,
    /// 1-based, counted from the top-left.
    pub empty_tile_position: usize,
    /// Shuffles are repeatable when positive.
    pub random_seed: i64,
    /// Seconds before the game is lost.
    pub allotted_time: f32,
    pub cell_size: f32,
    pub save_file: PathBuf,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            width: 3,
            height: 3,
            empty_tile_position: 5,
            random_seed: 0,
            allotted_time: 120.,
            cell_size: 100.,
            save_file: PathBuf::from("data.save"),
        }
    }
}

impl PuzzleConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.len();
        // Pieces are stored as u8. Single rows or columns never reorder.
        if self.width < 2 || self.height < 2 || len > usize::from(u8::MAX) + 1 {
            return Err(ConfigError::BoardSize {
                width: self.width,
                height: self.height,
            });
        }
        // Linear gap distance only tracks taxicab parity on odd widths.
        if self.width % 2 == 0 {
            return Err(ConfigError::EvenWidth(self.width));
        }
        if !(1..=len).contains(&self.empty_tile_position) {
            return Err(ConfigError::EmptyPosition {
                position: self.empty_tile_position,
                len,
            });
        }
        if self.allotted_time.is_nan() || self.allotted_time <= 0. {
            return Err(ConfigError::AllottedTime(self.allotted_time));
        }
        if self.cell_size.is_nan() || self.cell_size <= 0. {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        Ok(())
    }

    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 0-based empty slot.
    pub const fn empty_index(&self) -> TileId {
        self.empty_tile_position.saturating_sub(1)
    }

    pub fn seed(&self) -> Option<u64> {
        u64::try_from(self.random_seed).ok().filter(|&seed| seed > 0)
    }
}
