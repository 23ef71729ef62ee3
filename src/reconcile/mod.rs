//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigStore (desired state)
//!     → sync_all: per-tenant load → merge → InstancePool::ensure
//!     → instances for vanished tenants removed
//!     → SyncReport (per-tenant failures collected, never fatal)
//!
//! Triggers:
//!     startup (must complete before ready)
//!     fixed interval with jitter
//!     explicit nudge after a successful save/delete
//! ```
//!
//! # Design Decisions
//! - Declarative convergence: a sync pass is idempotent and safe to run
//!   concurrently with request-triggered applies; version checks make the
//!   last writer win
//! - One bad tenant never blocks reconciliation of the rest

pub mod sync;

pub use sync::{Reconciler, SyncError, SyncReport};
