//! Error types for inventory generation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors that can occur while building an inventory.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Terraform state read failed: {0}")]
    StateRead(String),

    #[error("Terraform output '{name}' unavailable: {message}")]
    TerraformOutput { name: String, message: String },

    #[error("Cloud provider error: {0}")]
    CloudProvider(String),

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InventoryError {
    /// Whether this error came from reading the full Terraform output set.
    pub fn is_state_read(&self) -> bool {
        matches!(self, Self::StateRead(_))
    }
}
