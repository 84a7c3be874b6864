//! Desired channel state and configuration loading for chansync.
//!
//! This crate owns everything that is read from disk before a
//! reconciliation pass starts:
//!
//! - [`ChannelConfig`] / [`ChannelSpec`]: the declarative channel document
//! - [`AuthConfig`]: server URL and token used to reach the remote workspace
//! - [`ConfigStore`]: format-agnostic (YAML, JSON, TOML) file loading
//!
//! Validation that must happen before any remote contact (duplicate or
//! empty channel names) lives here too, so that a malformed document never
//! reaches the reconciler.

pub mod auth;
pub mod channel;
pub mod error;
pub mod store;

pub use auth::AuthConfig;
pub use channel::{ChannelConfig, ChannelSpec, Visibility};
pub use error::{Error, Result};
pub use store::{ConfigStore, MAX_CONFIG_BYTES};
