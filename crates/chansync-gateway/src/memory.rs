//! In-memory gateway for tests.
//!
//! Behaves like a small channel server: mutating calls change its channel
//! list, created channels get generated ids, and archived channels carry a
//! non-zero deletion timestamp. Every call is recorded so tests can assert
//! on what the reconciler sent and in which order.

use std::cell::RefCell;
use std::collections::HashSet;

use chansync_meta::{ChannelSpec, Visibility};

use crate::channel::{ChannelPatch, RemoteChannel, channel_type};
use crate::error::{GatewayError, Result};
use crate::gateway::ChannelGateway;

/// Kind of gateway call, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    List,
    Create,
    Patch,
    SetPrivacy,
    Archive,
    Restore,
}

impl CallKind {
    fn label(self) -> &'static str {
        match self {
            CallKind::List => "list_channels",
            CallKind::Create => "create_channel",
            CallKind::Patch => "patch_channel",
            CallKind::SetPrivacy => "set_channel_privacy",
            CallKind::Archive => "archive_channel",
            CallKind::Restore => "restore_channel",
        }
    }
}

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    List {
        page: u32,
        per_page: u32,
        include_deleted: bool,
    },
    Create {
        name: String,
    },
    Patch {
        channel_id: String,
        patch: ChannelPatch,
    },
    SetPrivacy {
        channel_id: String,
        visibility: Visibility,
    },
    Archive {
        channel_id: String,
    },
    Restore {
        channel_id: String,
    },
}

impl GatewayCall {
    pub fn kind(&self) -> CallKind {
        match self {
            GatewayCall::List { .. } => CallKind::List,
            GatewayCall::Create { .. } => CallKind::Create,
            GatewayCall::Patch { .. } => CallKind::Patch,
            GatewayCall::SetPrivacy { .. } => CallKind::SetPrivacy,
            GatewayCall::Archive { .. } => CallKind::Archive,
            GatewayCall::Restore { .. } => CallKind::Restore,
        }
    }

    pub fn is_mutation(&self) -> bool {
        self.kind() != CallKind::List
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    channels: Vec<RemoteChannel>,
    calls: Vec<GatewayCall>,
    failing: HashSet<CallKind>,
    failing_page: Option<u32>,
    next_id: u64,
    clock: i64,
}

/// In-process [`ChannelGateway`] implementation.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: RefCell<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the server from channel specs, generating ids where missing.
    pub fn with_specs<'a>(specs: impl IntoIterator<Item = &'a ChannelSpec>) -> Self {
        let gateway = Self::new();
        for spec in specs {
            let mut state = gateway.state.borrow_mut();
            let id = if spec.channel_id.is_empty() {
                state.generate_id()
            } else {
                spec.channel_id.clone()
            };
            let delete_at = if spec.archive { state.tick() } else { 0 };
            state.channels.push(RemoteChannel {
                id,
                team_id: spec.team_id.clone(),
                channel_type: channel_type(spec.visibility()).to_string(),
                display_name: spec.display_name.clone(),
                name: spec.name.clone(),
                header: spec.header.clone(),
                purpose: spec.purpose.clone(),
                delete_at,
            });
        }
        gateway
    }

    /// Make every call of `kind` fail from now on.
    pub fn fail_on(&self, kind: CallKind) {
        self.state.borrow_mut().failing.insert(kind);
    }

    /// Make the listing fail when `page` is requested.
    pub fn fail_on_page(&self, page: u32) {
        self.state.borrow_mut().failing_page = Some(page);
    }

    pub fn channels(&self) -> Vec<RemoteChannel> {
        self.state.borrow().channels.clone()
    }

    pub fn channel_named(&self, name: &str) -> Option<RemoteChannel> {
        self.state
            .borrow()
            .channels
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.borrow().calls.clone()
    }

    /// Recorded calls that would have changed remote state.
    pub fn mutations(&self) -> Vec<GatewayCall> {
        self.calls().into_iter().filter(|c| c.is_mutation()).collect()
    }

    fn record(&self, call: GatewayCall) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let kind = call.kind();
        let failing_page = match &call {
            GatewayCall::List { page, .. } => state.failing_page == Some(*page),
            _ => false,
        };
        state.calls.push(call);
        if state.failing.contains(&kind) || failing_page {
            return Err(GatewayError::Injected {
                operation: kind.label(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn with_channel<F>(&self, channel_id: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut RemoteChannel, i64),
    {
        let mut state = self.state.borrow_mut();
        let now = state.tick();
        let channel = state
            .channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| GatewayError::ChannelNotFound {
                channel_id: channel_id.to_string(),
            })?;
        update(channel, now);
        Ok(())
    }
}

impl MemoryState {
    fn generate_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem{:06}", self.next_id)
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }
}

impl ChannelGateway for MemoryGateway {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn list_channels(
        &self,
        page: u32,
        per_page: u32,
        include_deleted: bool,
    ) -> Result<Vec<RemoteChannel>> {
        self.record(GatewayCall::List {
            page,
            per_page,
            include_deleted,
        })?;

        let state = self.state.borrow();
        let per_page = per_page.max(1) as usize;
        Ok(state
            .channels
            .iter()
            .filter(|c| include_deleted || !c.is_archived())
            .skip(page as usize * per_page)
            .take(per_page)
            .cloned()
            .collect())
    }

    fn create_channel(&self, spec: &ChannelSpec) -> Result<RemoteChannel> {
        self.record(GatewayCall::Create {
            name: spec.name.clone(),
        })?;

        let mut state = self.state.borrow_mut();
        if state.channels.iter().any(|c| c.name == spec.name) {
            return Err(GatewayError::Api {
                endpoint: "POST /channels".to_string(),
                status: 400,
                message: "A channel with that name already exists".to_string(),
            });
        }

        let channel = RemoteChannel {
            id: state.generate_id(),
            team_id: spec.team_id.clone(),
            channel_type: channel_type(spec.visibility()).to_string(),
            display_name: spec.display_name.clone(),
            name: spec.name.clone(),
            header: spec.header.clone(),
            purpose: spec.purpose.clone(),
            delete_at: 0,
        };
        state.channels.push(channel.clone());
        Ok(channel)
    }

    fn patch_channel(&self, channel_id: &str, patch: &ChannelPatch) -> Result<()> {
        self.record(GatewayCall::Patch {
            channel_id: channel_id.to_string(),
            patch: patch.clone(),
        })?;
        self.with_channel(channel_id, |channel, _| patch.apply_to(channel))
    }

    fn set_channel_privacy(&self, channel_id: &str, visibility: Visibility) -> Result<()> {
        self.record(GatewayCall::SetPrivacy {
            channel_id: channel_id.to_string(),
            visibility,
        })?;
        self.with_channel(channel_id, |channel, _| {
            channel.channel_type = channel_type(visibility).to_string();
        })
    }

    fn archive_channel(&self, channel_id: &str) -> Result<()> {
        self.record(GatewayCall::Archive {
            channel_id: channel_id.to_string(),
        })?;
        self.with_channel(channel_id, |channel, now| channel.delete_at = now)
    }

    fn restore_channel(&self, channel_id: &str) -> Result<()> {
        self.record(GatewayCall::Restore {
            channel_id: channel_id.to_string(),
        })?;
        self.with_channel(channel_id, |channel, _| channel.delete_at = 0)
    }
}
