//! Error types for chansync-gateway

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced an HTTP response
    #[error("Transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The server answered with a non-success status
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error(
        "Won't perform action through an insecure TLS connection. Please add --insecure-tls-version to bypass this check"
    )]
    InsecureTls,

    #[error("Invalid gateway configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Channel not found: {channel_id}")]
    ChannelNotFound { channel_id: String },

    /// Failure injected into a [`crate::MemoryGateway`]
    #[error("{operation} failed: {message}")]
    Injected {
        operation: &'static str,
        message: String,
    },
}
