// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Translations error: {0}")]
    Translations(#[from] crate::domain::TranslationError),

    #[error(transparent)]
    Fabricnet(#[from] crate::application::fabricnet::FabricnetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to update {path} locally: rc={rc}\n{stderr}")]
    HostsUpdate {
        path: String,
        rc: i32,
        stderr: String,
    },

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
