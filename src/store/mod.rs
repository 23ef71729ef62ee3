//! Per-tenant configuration persistence.
//!
//! # Data Flow
//! ```text
//! provision (external tenant management)
//!     → StoredConfig { primary, overlay?, version }
//!     → get / save_overlay / delete_overlay (optimistic versioning)
//!     → reconciler + apply path read-your-writes
//! ```
//!
//! # Design Decisions
//! - One overlay slot per tenant; a save under a different identifier is a
//!   conflict reported with the blocking identifier, never an overwrite
//! - Every successful mutation bumps the tenant's version token
//! - Deleting an absent or non-matching overlay is a no-op, not an error

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ConfigVersion, OverlayConfig, PrimaryConfig, StoredConfig, TenantId};

/// Storage failures, ordered from most to least specific.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The tenant has no provisioned configuration.
    #[error("no alerting configuration found for tenant {0}")]
    TenantNotFound(TenantId),

    /// Another writer updated the document since it was read.
    #[error("version conflict for tenant {tenant}: expected {expected}, current {current}")]
    VersionConflict {
        tenant: TenantId,
        expected: ConfigVersion,
        current: ConfigVersion,
    },

    /// The single overlay slot is held by a different identifier.
    #[error(
        "multiple extra configurations are not supported: an extra configuration \
         with identifier \"{existing}\" already exists"
    )]
    OverlayExists { existing: String },

    /// Transient I/O failure; eligible for bounded retry by the caller.
    #[error("storage i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be decoded.
    #[error("stored configuration for tenant {tenant} is corrupt: {reason}")]
    Corrupt { tenant: TenantId, reason: String },
}

/// Row/document storage keyed by tenant, with optimistic-version
/// compare-and-swap on the overlay slot.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// All tenants currently provisioned.
    async fn list_tenants(&self) -> Result<Vec<TenantId>, StoreError>;

    /// The tenant's full persisted document.
    async fn get(&self, tenant: &TenantId) -> Result<StoredConfig, StoreError>;

    /// Create or replace the overlay, guarded by `expected` version.
    ///
    /// Fails with [`StoreError::VersionConflict`] when `expected` is stale and
    /// with [`StoreError::OverlayExists`] when an overlay with a different
    /// identifier holds the slot. Replacing the same identifier is an update.
    async fn save_overlay(
        &self,
        tenant: &TenantId,
        overlay: OverlayConfig,
        expected: ConfigVersion,
    ) -> Result<ConfigVersion, StoreError>;

    /// Remove the overlay if it carries `identifier`; otherwise a no-op that
    /// returns the current version unchanged.
    async fn delete_overlay(
        &self,
        tenant: &TenantId,
        identifier: &str,
    ) -> Result<ConfigVersion, StoreError>;

    /// Create (or reset) a tenant with the given primary configuration.
    /// Invoked by the external tenant-management collaborator.
    async fn provision(
        &self,
        tenant: TenantId,
        primary: PrimaryConfig,
    ) -> Result<ConfigVersion, StoreError>;

    /// Remove a tenant and its configuration entirely. Idempotent.
    async fn deprovision(&self, tenant: &TenantId) -> Result<(), StoreError>;
}

/// Shared slot check used by both store implementations.
fn check_overlay_slot(current: &StoredConfig, incoming_identifier: &str) -> Result<(), StoreError> {
    match &current.overlay {
        Some(existing) if existing.identifier != incoming_identifier => {
            Err(StoreError::OverlayExists {
                existing: existing.identifier.clone(),
            })
        }
        _ => Ok(()),
    }
}

fn check_version(
    tenant: &TenantId,
    current: &StoredConfig,
    expected: ConfigVersion,
) -> Result<(), StoreError> {
    if current.version != expected {
        return Err(StoreError::VersionConflict {
            tenant: tenant.clone(),
            expected,
            current: current.version,
        });
    }
    Ok(())
}
