use bevy::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TownError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    // Town file errors
    #[error("Town file not found at path: {path}")]
    TownFileNotFound { path: PathBuf },

    #[error("Corrupted town file: {reason}")]
    CorruptedTownFile { reason: String },

    #[error("Invalid town data: {reason}")]
    InvalidTownData { reason: String },

    // Navigation errors. These never leave an agent's update step.
    #[error("No path from {start:?} to {goal:?}")]
    PlanningFailure { start: Vec2, goal: Vec2 },

    #[error("No building registered at address '{address}'")]
    UnresolvedAddress { address: String },

    #[error("No valid placement for {agent} in or around '{address}'")]
    PlacementFailure { agent: String, address: String },
}

/// Result type alias for all operations
pub type TownResult<T> = Result<T, TownError>;
