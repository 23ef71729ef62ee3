//! Data model for tenant alerting configurations.
//!
//! # Data Flow
//! ```text
//! PrimaryConfig (authoritative, per tenant)
//!     + OverlayConfig (imported "extra" bundle, at most one per tenant)
//!     → merge engine
//!     → EffectiveConfig (derived, never persisted)
//!     → compiled into a running routing instance
//! ```
//!
//! # Design Decisions
//! - Explicit tagged structs for each document kind; no ad hoc field lookup
//! - All document types are plain serde data: Debug, Clone, PartialEq
//! - EffectiveConfig is deterministic given its inputs and holds no state

pub mod document;
pub mod matcher;
pub mod receiver;
pub mod route;

pub use document::{
    ConfigVersion, EffectiveConfig, GlobalConfig, OverlayConfig, PrimaryConfig, RoutingDocument,
    StoredConfig, TenantId,
};
pub use matcher::{matches_all, LabelMatcher, LabelSet};
pub use receiver::{EmailConfig, Receiver, WebhookConfig, REDACTED_SECRET};
pub use route::Route;
