//! Change operations
//!
//! Each [`ChangeOperation`] is one remote mutation. It can always describe
//! itself, and performs at most once against a gateway.

use std::fmt;

use chansync_gateway::{ChannelGateway, ChannelPatch, GatewayError};
use chansync_meta::ChannelSpec;
use serde::Serialize;

use crate::diff::metadata_changes;
use crate::error::{Error, Result};
use crate::index::ObservedIndex;

/// Kind of a change operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Create,
    UpdateMetadata,
    UpdatePrivacy,
    Archive,
    Unarchive,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::Create => "create",
            OperationKind::UpdateMetadata => "update-metadata",
            OperationKind::UpdatePrivacy => "update-privacy",
            OperationKind::Archive => "archive",
            OperationKind::Unarchive => "unarchive",
        };
        f.write_str(label)
    }
}

/// A single remote mutation produced by the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeOperation {
    /// Channel is desired but does not exist remotely
    Create { spec: ChannelSpec },
    /// Display name, name, purpose or header differ
    UpdateMetadata { old: ChannelSpec, new: ChannelSpec },
    /// Public/private status differs
    UpdatePrivacy { old: ChannelSpec, new: ChannelSpec },
    /// Channel should be archived.
    ///
    /// `channel_id` is empty when the channel is created in the same pass;
    /// it is then looked up in the index at perform time.
    Archive {
        channel_id: String,
        channel: ChannelSpec,
    },
    /// Channel should be restored from the archive
    Unarchive {
        channel_id: String,
        channel: ChannelSpec,
    },
}

impl ChangeOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            ChangeOperation::Create { .. } => OperationKind::Create,
            ChangeOperation::UpdateMetadata { .. } => OperationKind::UpdateMetadata,
            ChangeOperation::UpdatePrivacy { .. } => OperationKind::UpdatePrivacy,
            ChangeOperation::Archive { .. } => OperationKind::Archive,
            ChangeOperation::Unarchive { .. } => OperationKind::Unarchive,
        }
    }

    /// Name of the channel the operation targets, as currently known.
    pub fn channel_name(&self) -> &str {
        match self {
            ChangeOperation::Create { spec } => &spec.name,
            ChangeOperation::UpdateMetadata { old, .. } => &old.name,
            ChangeOperation::UpdatePrivacy { old, .. } => &old.name,
            ChangeOperation::Archive { channel, .. } => &channel.name,
            ChangeOperation::Unarchive { channel, .. } => &channel.name,
        }
    }

    /// Human-readable, stable description of the operation.
    pub fn describe(&self) -> String {
        match self {
            ChangeOperation::Create { spec } => {
                format!("Create new channel: {}/{}", spec.name, spec.display_name)
            }
            ChangeOperation::UpdateMetadata { old, new } => {
                let changes: Vec<String> = metadata_changes(old, new)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                format!("Update channel {}: {}", old.name, changes.join(", "))
            }
            ChangeOperation::UpdatePrivacy { old, new } => format!(
                "Channel {} privacy mode update from {} to {}",
                old.name,
                old.visibility(),
                new.visibility()
            ),
            ChangeOperation::Archive { channel, .. } => {
                format!("Archive channel: {}", channel.name)
            }
            ChangeOperation::Unarchive { channel, .. } => {
                format!("Unarchive channel: {}", channel.name)
            }
        }
    }

    /// Apply the operation remotely.
    ///
    /// Successful `create` and `update-metadata` operations write their
    /// result back into `index` so later operations in the same pass see it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Operation`] when the remote call fails, or
    /// [`Error::UnresolvedChannel`] when an archive targets a channel whose
    /// id is unknown.
    pub fn perform(&self, gateway: &dyn ChannelGateway, index: &mut ObservedIndex) -> Result<()> {
        match self {
            ChangeOperation::Create { spec } => {
                let created = gateway
                    .create_channel(spec)
                    .map_err(|source| self.failed(source))?;
                tracing::debug!(name = %spec.name, id = %created.id, "Channel created");
                index.insert_as(spec.name.clone(), created.to_spec());
            }
            ChangeOperation::UpdateMetadata { old, new } => {
                gateway
                    .patch_channel(&old.channel_id, &ChannelPatch::from_spec(new))
                    .map_err(|source| self.failed(source))?;
                index.replace(&old.name, new.clone());
            }
            ChangeOperation::UpdatePrivacy { old, new } => {
                gateway
                    .set_channel_privacy(&old.channel_id, new.visibility())
                    .map_err(|source| self.failed(source))?;
            }
            ChangeOperation::Archive {
                channel_id,
                channel,
            } => {
                let id = resolve_id(channel_id, channel, index)?;
                gateway
                    .archive_channel(&id)
                    .map_err(|source| self.failed(source))?;
            }
            ChangeOperation::Unarchive {
                channel_id,
                channel,
            } => {
                let id = resolve_id(channel_id, channel, index)?;
                gateway
                    .restore_channel(&id)
                    .map_err(|source| self.failed(source))?;
            }
        }
        Ok(())
    }

    fn failed(&self, source: GatewayError) -> Error {
        Error::Operation {
            description: self.describe(),
            source,
        }
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn resolve_id(channel_id: &str, channel: &ChannelSpec, index: &ObservedIndex) -> Result<String> {
    if !channel_id.is_empty() {
        return Ok(channel_id.to_string());
    }
    index
        .get(&channel.name)
        .map(|known| known.channel_id.clone())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::UnresolvedChannel {
            name: channel.name.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chansync_gateway::{CallKind, GatewayCall, MemoryGateway};
    use chansync_meta::Visibility;
    use pretty_assertions::assert_eq;

    fn seeded(spec: &ChannelSpec) -> (MemoryGateway, ObservedIndex) {
        let gateway = MemoryGateway::with_specs([spec]);
        let index = ObservedIndex::load(&gateway, true).unwrap();
        (gateway, index)
    }

    #[test]
    fn test_describe_create() {
        let mut spec = ChannelSpec::new("honk");
        spec.display_name = "Honk".to_string();
        let op = ChangeOperation::Create { spec };
        assert_eq!(op.describe(), "Create new channel: honk/Honk");
        assert_eq!(op.to_string(), op.describe());
    }

    #[test]
    fn test_describe_archive_and_unarchive() {
        let channel = ChannelSpec::new("old");
        let archive = ChangeOperation::Archive {
            channel_id: "c1".to_string(),
            channel: channel.clone(),
        };
        let unarchive = ChangeOperation::Unarchive {
            channel_id: "c1".to_string(),
            channel,
        };
        assert_eq!(archive.describe(), "Archive channel: old");
        assert_eq!(unarchive.describe(), "Unarchive channel: old");
    }

    #[test]
    fn test_describe_update_lists_changed_fields() {
        let old = ChannelSpec {
            purpose: "before".to_string(),
            ..ChannelSpec::new("honk")
        };
        let new = ChannelSpec {
            name: "honk-2".to_string(),
            header: "hello".to_string(),
            ..ChannelSpec::new("honk")
        };
        let op = ChangeOperation::UpdateMetadata { old, new };
        assert_eq!(
            op.describe(),
            concat!(
                r#"Update channel honk: name "honk" -> "honk-2", "#,
                r#"purpose "before" -> "", header "" -> "hello""#
            )
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(OperationKind::UpdateMetadata.to_string(), "update-metadata");
        assert_eq!(OperationKind::Unarchive.to_string(), "unarchive");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let op = ChangeOperation::Create {
            spec: ChannelSpec::new("honk"),
        };
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["kind"], "create");
        assert_eq!(value["spec"]["name"], "honk");
    }

    #[test]
    fn test_create_inserts_server_record() {
        let gateway = MemoryGateway::new();
        let mut index = ObservedIndex::new();
        let mut spec = ChannelSpec::new("secret");
        spec.private = true;

        ChangeOperation::Create { spec }
            .perform(&gateway, &mut index)
            .unwrap();

        let stored = index.get("secret").unwrap();
        assert!(!stored.channel_id.is_empty());
        assert!(stored.private);
        assert_eq!(gateway.channel_named("secret").unwrap().channel_type, "P");
    }

    #[test]
    fn test_create_failure_leaves_index_alone() {
        let gateway = MemoryGateway::new();
        gateway.fail_on(CallKind::Create);
        let mut index = ObservedIndex::new();

        let op = ChangeOperation::Create {
            spec: ChannelSpec::new("honk"),
        };
        let err = op.perform(&gateway, &mut index).unwrap_err();

        assert!(index.is_empty());
        assert!(err.to_string().starts_with("Create new channel: honk/ failed"));
    }

    #[test]
    fn test_update_metadata_rewrites_index_on_rename() {
        let (gateway, mut index) = seeded(&ChannelSpec::new("honk"));
        let old = index.get("honk").unwrap().clone();
        let new = ChannelSpec {
            name: "honk-renamed".to_string(),
            ..old.clone()
        };

        ChangeOperation::UpdateMetadata {
            old: old.clone(),
            new,
        }
        .perform(&gateway, &mut index)
        .unwrap();

        assert!(!index.contains("honk"));
        assert_eq!(index.get("honk-renamed").unwrap().channel_id, old.channel_id);
        assert!(gateway.channel_named("honk-renamed").is_some());
    }

    #[test]
    fn test_update_privacy_targets_observed_id() {
        let (gateway, mut index) = seeded(&ChannelSpec::new("honk"));
        let old = index.get("honk").unwrap().clone();
        let new = ChannelSpec {
            private: true,
            ..old.clone()
        };
        let before = index.clone();

        ChangeOperation::UpdatePrivacy {
            old: old.clone(),
            new,
        }
        .perform(&gateway, &mut index)
        .unwrap();

        assert_eq!(index, before);
        assert_eq!(
            gateway.mutations(),
            vec![GatewayCall::SetPrivacy {
                channel_id: old.channel_id,
                visibility: Visibility::Private,
            }]
        );
    }

    #[test]
    fn test_archive_resolves_id_from_index() {
        let gateway = MemoryGateway::new();
        let mut index = ObservedIndex::new();
        let mut spec = ChannelSpec::new("graveyard");
        spec.archive = true;

        ChangeOperation::Create { spec: spec.clone() }
            .perform(&gateway, &mut index)
            .unwrap();
        let before = index.clone();
        ChangeOperation::Archive {
            channel_id: String::new(),
            channel: spec,
        }
        .perform(&gateway, &mut index)
        .unwrap();

        assert_eq!(index, before);
        assert!(gateway.channel_named("graveyard").unwrap().is_archived());
    }

    #[test]
    fn test_archive_without_known_id_is_unresolved() {
        let gateway = MemoryGateway::new();
        let mut index = ObservedIndex::new();

        let err = ChangeOperation::Archive {
            channel_id: String::new(),
            channel: ChannelSpec::new("ghost"),
        }
        .perform(&gateway, &mut index)
        .unwrap_err();

        assert!(matches!(err, Error::UnresolvedChannel { ref name } if name == "ghost"));
        assert!(gateway.mutations().is_empty());
    }

    #[test]
    fn test_unarchive_restores() {
        let mut spec = ChannelSpec::new("old");
        spec.archive = true;
        let (gateway, mut index) = seeded(&spec);
        let id = index.get("old").unwrap().channel_id.clone();
        let before = index.clone();

        ChangeOperation::Unarchive {
            channel_id: id,
            channel: ChannelSpec::new("old"),
        }
        .perform(&gateway, &mut index)
        .unwrap();

        assert_eq!(index, before);
        assert!(!gateway.channel_named("old").unwrap().is_archived());
    }
}
