//! Error types for the block model

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid page: {0}")]
    InvalidPage(String),
}
