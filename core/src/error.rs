use crate::snapshot::SnapshotError;
use crate::types::PersonaId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot rejected: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Persona limit reached: at most {max} personas may be compared")]
    PersonaLimit { max: usize },

    #[error("Cannot remove '{id}': a workspace needs at least one persona")]
    LastPersona { id: PersonaId },

    #[error("Persona '{id}' not found")]
    PersonaNotFound { id: PersonaId },

    #[error("Unknown preset '{key}'")]
    UnknownPreset { key: String },

    #[error("Saved workspace '{name}' not found")]
    WorkspaceNotFound { name: String },

    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
