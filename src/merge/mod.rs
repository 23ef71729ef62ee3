//! Merging of primary and overlay configurations.
//!
//! # Data Flow
//! ```text
//! PrimaryConfig + Option<OverlayConfig>
//!     → merge (pure: receivers, templates, grafted route tree)
//!     → validate (structural rules shared with the routing engine)
//!     → EffectiveConfig
//! ```
//!
//! # Design Decisions
//! - Pure function: same inputs always yield the same effective document
//! - Receiver name collisions are rejected and reported, never auto-renamed
//! - Overlay template keys are namespaced by identifier so replacing the
//!   overlay cannot disturb primary templates

pub mod engine;

pub use engine::{merge, validate, MergeError};
