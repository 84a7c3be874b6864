//! Channel reconciliation engine for chansync
//!
//! This crate compares the desired channel configuration against the
//! channels that exist on the remote server and brings the two in line:
//!
//! - **ObservedIndex**: snapshot of remote channels keyed by name
//! - **diff**: pure comparison producing a [`Plan`] of operations and errors
//! - **ChangeOperation**: one remote mutation that can describe and perform itself
//! - **Reconciler**: runs one pass and produces a [`ReconcileReport`]
//!
//! # Architecture
//!
//! ```text
//!                 chansync-cli
//!                      |
//!                chansync-core
//!                   |      |
//!     chansync-gateway  chansync-meta
//! ```
//!
//! # Example
//!
//! ```
//! use chansync_core::{Reconciler, RunOptions};
//! use chansync_gateway::MemoryGateway;
//! use chansync_meta::{ChannelConfig, ChannelSpec};
//!
//! let gateway = MemoryGateway::new();
//! let config = ChannelConfig::new(vec![ChannelSpec::new("honk")]);
//!
//! let mut reconciler = Reconciler::new(&gateway, config);
//! let report = reconciler.reconcile(RunOptions::default()).unwrap();
//!
//! assert_eq!(report.steps.len(), 1);
//! assert!(gateway.mutations().is_empty());
//! ```

pub mod diff;
pub mod error;
pub mod index;
pub mod operation;
pub mod reconciler;
pub mod report;

pub use diff::{ConsistencyError, FieldChange, Plan, diff, metadata_changes};
pub use error::{Error, Result};
pub use index::{DEFAULT_CHANNELS, ObservedIndex, PAGE_SIZE};
pub use operation::{ChangeOperation, OperationKind};
pub use reconciler::{Reconciler, RunOptions};
pub use report::{ReconcileReport, ReportStatus, RunMode, Step, StepOutcome};
