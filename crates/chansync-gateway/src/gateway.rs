//! The gateway seam between the reconciler and the remote server

use chansync_meta::{ChannelSpec, Visibility};

use crate::channel::{ChannelPatch, RemoteChannel};
use crate::error::Result;

/// Channel operations the reconciler needs from the remote server.
///
/// Every call is blocking and is attempted exactly once; implementations
/// must not retry.
pub trait ChannelGateway {
    /// Short implementation name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch one page of channels across all teams.
    ///
    /// An empty page marks the end of the listing.
    fn list_channels(
        &self,
        page: u32,
        per_page: u32,
        include_deleted: bool,
    ) -> Result<Vec<RemoteChannel>>;

    /// Create a channel and return the server's record, including its id.
    fn create_channel(&self, spec: &ChannelSpec) -> Result<RemoteChannel>;

    fn patch_channel(&self, channel_id: &str, patch: &ChannelPatch) -> Result<()>;

    fn set_channel_privacy(&self, channel_id: &str, visibility: Visibility) -> Result<()>;

    /// Archive (soft-delete) a channel.
    fn archive_channel(&self, channel_id: &str) -> Result<()>;

    /// Restore an archived channel.
    fn restore_channel(&self, channel_id: &str) -> Result<()>;
}
