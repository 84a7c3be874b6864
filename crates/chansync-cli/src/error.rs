//! Error types for chansync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from chansync-core
    #[error(transparent)]
    Core(#[from] chansync_core::Error),

    /// Error from chansync-meta
    #[error(transparent)]
    Meta(#[from] chansync_meta::Error),

    /// Error from chansync-gateway
    #[error(transparent)]
    Gateway(#[from] chansync_gateway::GatewayError),

    /// JSON rendering error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
