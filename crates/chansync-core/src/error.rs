//! Error types for chansync-core

use chansync_gateway::GatewayError;

/// Result type for chansync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling channels
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching remote state failed; nothing was diffed
    #[error("failed to get initial channel state (page {page}): {source}")]
    RemoteLoad {
        page: u32,
        #[source]
        source: GatewayError,
    },

    /// A single change operation's remote call failed
    #[error("{description} failed: {source}")]
    Operation {
        description: String,
        #[source]
        source: GatewayError,
    },

    /// An operation targets a channel whose id is not known yet
    #[error("channel {name} has no remote id; was it created?")]
    UnresolvedChannel { name: String },

    /// The pass found remote channels missing from the configuration
    #[error("there were configuration errors: {count} channel(s) not referenced in config")]
    ConsistencyErrors { count: usize },

    /// Configuration error from chansync-meta
    #[error(transparent)]
    Meta(#[from] chansync_meta::Error),
}
