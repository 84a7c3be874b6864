//! Desired-versus-observed comparison
//!
//! [`diff`] is pure: it reads the desired channel list and the observed
//! index and returns a [`Plan`]. Operations come out in desired-list order,
//! and for a single channel in the order metadata, privacy, archive status.
//! That order is also the execution order.

use std::collections::BTreeSet;
use std::fmt;

use chansync_meta::ChannelSpec;
use serde::Serialize;

use crate::index::ObservedIndex;
use crate::operation::ChangeOperation;

/// An observed channel that no desired entry refers to.
///
/// The engine never deletes or archives such channels on its own; the
/// operator has to add them to the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyError {
    pub name: String,
    pub channel_id: String,
}

impl ConsistencyError {
    pub fn unreferenced(channel: &ChannelSpec) -> Self {
        Self {
            name: channel.name.clone(),
            channel_id: channel.channel_id.clone(),
        }
    }
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {} not referenced in config", self.name)
    }
}

/// Result of comparing desired and observed state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub operations: Vec<ChangeOperation>,
    pub errors: Vec<ConsistencyError>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.errors.is_empty()
    }
}

/// One metadata field that differs between two channel records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} -> {:?}", self.field, self.old, self.new)
    }
}

/// Metadata fields that differ, in the order display name, name, purpose,
/// header.
pub fn metadata_changes(old: &ChannelSpec, new: &ChannelSpec) -> Vec<FieldChange> {
    [
        ("display_name", &old.display_name, &new.display_name),
        ("name", &old.name, &new.name),
        ("purpose", &old.purpose, &new.purpose),
        ("header", &old.header, &new.header),
    ]
    .into_iter()
    .filter(|(_, before, after)| before != after)
    .map(|(field, before, after)| FieldChange {
        field,
        old: before.clone(),
        new: after.clone(),
    })
    .collect()
}

/// Compare `desired` against `observed`.
///
/// Per desired channel:
/// - missing remotely: `create`, followed by `archive` when the channel
///   should start out archived
/// - metadata differs: `update-metadata`
/// - privacy differs: `update-privacy`
/// - archive flag differs: `archive` or `unarchive`
///
/// Each observed channel never matched by name yields a
/// [`ConsistencyError`], sorted by name.
pub fn diff(desired: &[ChannelSpec], observed: &ObservedIndex) -> Plan {
    let mut unreferenced: BTreeSet<&str> = observed.names().collect();
    let mut operations = Vec::new();

    for want in desired {
        let Some(have) = observed.get(&want.name) else {
            operations.push(ChangeOperation::Create { spec: want.clone() });
            if want.archive {
                operations.push(ChangeOperation::Archive {
                    channel_id: String::new(),
                    channel: want.clone(),
                });
            }
            continue;
        };
        unreferenced.remove(want.name.as_str());

        if !metadata_changes(have, want).is_empty() {
            operations.push(ChangeOperation::UpdateMetadata {
                old: have.clone(),
                new: with_metadata_of(have, want),
            });
        }

        if have.private != want.private {
            operations.push(ChangeOperation::UpdatePrivacy {
                old: have.clone(),
                new: want.clone(),
            });
        }

        if have.archive != want.archive {
            let channel_id = have.channel_id.clone();
            let channel = want.clone();
            operations.push(if want.archive {
                ChangeOperation::Archive {
                    channel_id,
                    channel,
                }
            } else {
                ChangeOperation::Unarchive {
                    channel_id,
                    channel,
                }
            });
        }
    }

    let errors = unreferenced
        .into_iter()
        .filter_map(|name| observed.get(name))
        .map(ConsistencyError::unreferenced)
        .collect();

    Plan { operations, errors }
}

/// The observed record with the desired metadata applied. Identity,
/// privacy and archive status stay as observed.
fn with_metadata_of(have: &ChannelSpec, want: &ChannelSpec) -> ChannelSpec {
    ChannelSpec {
        name: want.name.clone(),
        display_name: want.display_name.clone(),
        header: want.header.clone(),
        purpose: want.purpose.clone(),
        ..have.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn observed(id: &str, name: &str) -> ChannelSpec {
        ChannelSpec {
            channel_id: id.to_string(),
            team_id: "team-1".to_string(),
            ..ChannelSpec::new(name)
        }
    }

    fn index(channels: Vec<ChannelSpec>) -> ObservedIndex {
        channels.into_iter().collect()
    }

    #[test]
    fn test_create_new_channel_and_flag_unreferenced() {
        let observed = index(vec![observed("c1", "test")]);
        let desired = vec![ChannelSpec::new("honk")];

        let plan = diff(&desired, &observed);

        assert_eq!(
            plan.operations,
            vec![ChangeOperation::Create {
                spec: ChannelSpec::new("honk")
            }]
        );
        assert_eq!(plan.errors.len(), 1);
        assert_eq!(plan.errors[0].name, "test");
        assert_eq!(plan.errors[0].to_string(), "channel test not referenced in config");
    }

    #[test]
    fn test_create_keeps_existing_untouched() {
        let observed = index(vec![observed("c1", "test")]);
        let desired = vec![ChannelSpec::new("honk"), ChannelSpec::new("test")];

        let plan = diff(&desired, &observed);

        assert_eq!(
            plan.operations,
            vec![ChangeOperation::Create {
                spec: ChannelSpec::new("honk")
            }]
        );
        assert!(plan.errors.is_empty());
    }

    #[test]
    fn test_update_display_name() {
        let mut before = observed("c1", "honk");
        before.display_name = "test".to_string();
        let mut desired = ChannelSpec::new("honk");
        desired.display_name = "honk the planet".to_string();

        let plan = diff(std::slice::from_ref(&desired), &index(vec![before.clone()]));

        let mut after = before.clone();
        after.display_name = "honk the planet".to_string();
        assert_eq!(
            plan.operations,
            vec![ChangeOperation::UpdateMetadata {
                old: before,
                new: after
            }]
        );
        assert!(plan.errors.is_empty());
        assert_eq!(
            plan.operations[0].describe(),
            r#"Update channel honk: display_name "test" -> "honk the planet""#
        );
    }

    #[test]
    fn test_identical_channel_yields_nothing() {
        let mut have = observed("c1", "honk");
        have.purpose = "p".to_string();
        have.private = true;
        let want = ChannelSpec {
            channel_id: String::new(),
            team_id: "other-team".to_string(),
            ..have.clone()
        };

        let plan = diff(&[want], &index(vec![have]));

        assert!(plan.is_empty());
    }

    #[test]
    fn test_all_mismatches_are_independent_operations() {
        let have = observed("c1", "honk");
        let want = ChannelSpec {
            header: "new header".to_string(),
            private: true,
            archive: true,
            ..ChannelSpec::new("honk")
        };

        let plan = diff(&[want], &index(vec![have]));

        let kinds: Vec<_> = plan.operations.iter().map(ChangeOperation::kind).collect();
        assert_eq!(
            kinds,
            vec![
                crate::OperationKind::UpdateMetadata,
                crate::OperationKind::UpdatePrivacy,
                crate::OperationKind::Archive,
            ]
        );
    }

    #[rstest]
    #[case::archive(false, true, crate::OperationKind::Archive)]
    #[case::unarchive(true, false, crate::OperationKind::Unarchive)]
    fn test_archive_flag(
        #[case] observed_archived: bool,
        #[case] desired_archived: bool,
        #[case] expected: crate::OperationKind,
    ) {
        let mut have = observed("c1", "honk");
        have.archive = observed_archived;
        let mut want = ChannelSpec::new("honk");
        want.archive = desired_archived;

        let plan = diff(&[want], &index(vec![have]));

        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.operations[0].kind(), expected);
        match &plan.operations[0] {
            ChangeOperation::Archive { channel_id, .. }
            | ChangeOperation::Unarchive { channel_id, .. } => assert_eq!(channel_id, "c1"),
            other => panic!("unexpected operation {:?}", other),
        }
    }

    #[test]
    fn test_privacy_only() {
        let have = observed("c1", "honk");
        let mut want = ChannelSpec::new("honk");
        want.private = true;

        let plan = diff(&[want], &index(vec![have]));

        assert_eq!(plan.operations.len(), 1);
        assert_eq!(
            plan.operations[0].describe(),
            "Channel honk privacy mode update from Public to Private"
        );
    }

    #[test]
    fn test_archived_new_channel_is_created_then_archived() {
        let mut want = ChannelSpec::new("graveyard");
        want.archive = true;

        let plan = diff(&[want], &ObservedIndex::new());

        let kinds: Vec<_> = plan.operations.iter().map(ChangeOperation::kind).collect();
        assert_eq!(
            kinds,
            vec![crate::OperationKind::Create, crate::OperationKind::Archive]
        );
    }

    #[test]
    fn test_operations_follow_desired_order() {
        let desired: Vec<_> = ["zulu", "alpha", "mike"]
            .into_iter()
            .map(ChannelSpec::new)
            .collect();

        let plan = diff(&desired, &ObservedIndex::new());

        let names: Vec<_> = plan
            .operations
            .iter()
            .map(ChangeOperation::channel_name)
            .collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_errors_sorted_by_name() {
        let observed = index(vec![
            observed("c3", "zeta"),
            observed("c1", "alpha"),
            observed("c2", "beta"),
        ]);

        let plan = diff(&[], &observed);

        let names: Vec<_> = plan.errors.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "zeta"]);
        assert!(plan.operations.is_empty());
    }

    #[test]
    fn test_empty_against_empty() {
        assert!(diff(&[], &ObservedIndex::new()).is_empty());
    }

    #[test]
    fn test_metadata_changes_order() {
        let old = ChannelSpec {
            display_name: "a".to_string(),
            purpose: "b".to_string(),
            header: "c".to_string(),
            ..ChannelSpec::new("x")
        };
        let new = ChannelSpec {
            display_name: "A".to_string(),
            purpose: "B".to_string(),
            header: "C".to_string(),
            ..ChannelSpec::new("x")
        };

        let fields: Vec<_> = metadata_changes(&old, &new)
            .into_iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(fields, vec!["display_name", "purpose", "header"]);
    }
}
