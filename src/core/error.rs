use thiserror::Error;

use crate::core::types::EntityId;

#[derive(Error, Debug)]
pub enum MarchError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid action path: {0}")]
    InvalidPath(String),

    #[error("Unit {0} already has an action in flight")]
    ActionInFlight(EntityId),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarchError>;
