use contagion_core::ContagionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse adjacency table: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to parse run configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to encode results: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed adjacency table: {0}")]
    Malformed(String),
    #[error("Invalid configuration: {0}")]
    Contagion(#[from] ContagionError),
}

pub type Result<T> = std::result::Result<T, IoError>;
