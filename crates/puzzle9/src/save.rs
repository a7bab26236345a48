use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Could not access save file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Save file {path:?} is not valid save data: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SaveData {
    high_score: f32,
}

/// The best time score, kept in a single file.
#[derive(Debug, Clone)]
pub struct ScoreBook {
    path: PathBuf,
    high_score: Option<f32>,
}

impl ScoreBook {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let path = path.into();
        let high_score = read(&path)?;
        Ok(Self { path, high_score })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn high_score(&self) -> Option<f32> {
        self.high_score
    }

    /// Stores `score` unless the current high score is greater.
    pub fn check_and_save(&mut self, score: f32) -> Result<bool, SaveError> {
        if self.high_score.is_some_and(|high_score| high_score > score) {
            return Ok(false);
        }
        write(&self.path, score)?;
        self.high_score = Some(score);
        info!("new high score {score:06.2}");
        Ok(true)
    }

    /// Banner text, hidden until a positive score exists.
    pub fn banner(&self) -> Option<String> {
        self.high_score
            .filter(|&high_score| high_score > 0.)
            .map(|high_score| format!("High score: {high_score:06.2}"))
    }
}

fn read(path: &Path) -> Result<Option<f32>, SaveError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SaveError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let data: SaveData = serde_json::from_str(&text).map_err(|source| SaveError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(data.high_score))
}

fn write(path: &Path, high_score: f32) -> Result<(), SaveError> {
    let text = serde_json::to_string(&SaveData { high_score }).map_err(|source| {
        SaveError::Format {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, text).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}
