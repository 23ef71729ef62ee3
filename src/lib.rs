//! Multi-tenant alert-notification routing engine.
//!
//! Maintains, per tenant, one authoritative routing configuration plus at
//! most one imported "extra" overlay, merges them into a single effective
//! configuration, and keeps a pool of running routing instances converged
//! with persisted state.

pub mod api;
pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod manager;
pub mod merge;
pub mod model;
pub mod observability;
pub mod pool;
pub mod reconcile;
pub mod store;

pub use config::ServiceConfig;
pub use lifecycle::Shutdown;
pub use manager::TenantManager;
pub use pool::InstancePool;
pub use reconcile::Reconciler;
