//! Wire types for the channel endpoints

use chansync_meta::{ChannelSpec, Visibility};
use serde::{Deserialize, Serialize};

/// Channel type code for open channels.
pub const CHANNEL_OPEN: &str = "O";
/// Channel type code for private channels.
pub const CHANNEL_PRIVATE: &str = "P";

/// Map a visibility to the API's channel type code.
pub fn channel_type(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => CHANNEL_OPEN,
        Visibility::Private => CHANNEL_PRIVATE,
    }
}

/// A channel record as returned by the server.
///
/// Only the fields the reconciler needs are decoded; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteChannel {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(rename = "type", default)]
    pub channel_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub purpose: String,
    /// Deletion timestamp in milliseconds, zero while the channel is live
    #[serde(default)]
    pub delete_at: i64,
}

impl RemoteChannel {
    pub fn is_open(&self) -> bool {
        self.channel_type == CHANNEL_OPEN
    }

    pub fn is_archived(&self) -> bool {
        self.delete_at != 0
    }

    /// Normalize into the same shape as a desired channel.
    pub fn to_spec(&self) -> ChannelSpec {
        ChannelSpec {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            header: self.header.clone(),
            purpose: self.purpose.clone(),
            private: !self.is_open(),
            archive: self.is_archived(),
            team_id: self.team_id.clone(),
            channel_id: self.id.clone(),
        }
    }
}

/// Body of a create-channel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NewChannel<'a> {
    pub team_id: &'a str,
    pub name: &'a str,
    pub display_name: &'a str,
    pub header: &'a str,
    pub purpose: &'a str,
    #[serde(rename = "type")]
    pub channel_type: &'static str,
}

impl<'a> NewChannel<'a> {
    pub fn from_spec(spec: &'a ChannelSpec) -> Self {
        Self {
            team_id: &spec.team_id,
            name: &spec.name,
            display_name: &spec.display_name,
            header: &spec.header,
            purpose: &spec.purpose,
            channel_type: channel_type(spec.visibility()),
        }
    }
}

/// Partial update of a channel's metadata. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl ChannelPatch {
    /// A patch that sets every metadata field to the values in `spec`.
    pub fn from_spec(spec: &ChannelSpec) -> Self {
        Self {
            display_name: Some(spec.display_name.clone()),
            name: Some(spec.name.clone()),
            purpose: Some(spec.purpose.clone()),
            header: Some(spec.header.clone()),
        }
    }

    /// Apply the patch to a remote record.
    pub fn apply_to(&self, channel: &mut RemoteChannel) {
        if let Some(display_name) = &self.display_name {
            channel.display_name.clone_from(display_name);
        }
        if let Some(name) = &self.name {
            channel.name.clone_from(name);
        }
        if let Some(purpose) = &self.purpose {
            channel.purpose.clone_from(purpose);
        }
        if let Some(header) = &self.header {
            channel.header.clone_from(header);
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PrivacyUpdate {
    pub privacy: &'static str,
}
