//! Remote channel gateway for chansync.
//!
//! The reconciler never talks HTTP directly. It goes through the
//! [`ChannelGateway`] trait, which has two implementations:
//!
//! - [`MattermostClient`]: blocking HTTP client for the Mattermost API v4
//! - [`MemoryGateway`]: in-process server double that records every call
//!
//! Authentication and TLS policy are fixed when the client is built and are
//! not visible to callers of the trait.

pub mod channel;
pub mod client;
pub mod error;
pub mod gateway;
pub mod memory;

pub use channel::{ChannelPatch, RemoteChannel};
pub use client::{ClientOptions, MattermostClient};
pub use error::{GatewayError, Result};
pub use gateway::ChannelGateway;
pub use memory::{CallKind, GatewayCall, MemoryGateway};
