//! Apply API orchestration.
//!
//! # Data Flow
//! ```text
//! save/delete extra configuration (per tenant)
//!     → request preconditions (identifier, matchers)
//!     → per-tenant lock
//!     → ConfigStore.get (version read)
//!     → merge + validate against the prospective state (fail fast)
//!     → ConfigStore.save_overlay / delete_overlay (optimistic CAS)
//!     → InstancePool.ensure (hot reload)
//!     → reconciler nudge
//! ```
//!
//! # Design Decisions
//! - Validation runs before any persistence, so storage never holds a
//!   document the routing engine would reject
//! - The per-tenant lock spans save-then-reload, so a reload never observes
//!   a half-written configuration
//! - Error kinds from the store pass through unchanged; this layer only adds
//!   tenant and identifier context

pub mod error;

pub use error::{ApplyError, ErrorKind};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};

use crate::merge;
use crate::model::{EffectiveConfig, OverlayConfig, TenantId};
use crate::observability::metrics;
use crate::pool::InstancePool;
use crate::store::ConfigStore;

/// Orchestrates configuration mutations across store, merge engine, and
/// instance pool for all tenants.
pub struct TenantManager {
    store: Arc<dyn ConfigStore>,
    pool: Arc<InstancePool>,
    locks: DashMap<TenantId, Arc<Mutex<()>>>,
    sync_nudge: Option<mpsc::UnboundedSender<()>>,
}

impl TenantManager {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        pool: Arc<InstancePool>,
        sync_nudge: Option<mpsc::UnboundedSender<()>>,
    ) -> Self {
        Self {
            store,
            pool,
            locks: DashMap::new(),
            sync_nudge,
        }
    }

    pub fn pool(&self) -> &Arc<InstancePool> {
        &self.pool
    }

    /// Create or replace the tenant's extra configuration and hot-reload its
    /// routing instance.
    pub async fn save_and_apply_extra_config(
        &self,
        tenant: &TenantId,
        overlay: OverlayConfig,
    ) -> Result<(), ApplyError> {
        let result = self.save_and_apply_inner(tenant, overlay).await;
        metrics::record_apply("save", result.is_ok());
        result
    }

    async fn save_and_apply_inner(
        &self,
        tenant: &TenantId,
        overlay: OverlayConfig,
    ) -> Result<(), ApplyError> {
        // Request-level preconditions, checked before any storage access.
        if overlay.identifier.trim().is_empty() {
            return Err(ApplyError::InvalidRequest(
                "an extra configuration identifier is required".into(),
            ));
        }
        if overlay.merge_matchers.is_empty() {
            return Err(ApplyError::InvalidRequest(
                "at least one merge matcher is required".into(),
            ));
        }

        let lock = self.tenant_lock(tenant);
        let _guard = lock.lock().await;

        let stored = self
            .store
            .get(tenant)
            .await
            .map_err(|source| ApplyError::CurrentConfig {
                tenant: tenant.clone(),
                source,
            })?;

        // Merge and validate the prospective state before touching storage.
        let effective = merge::merge(&stored.primary, Some(&overlay))?;
        merge::validate(&effective)?;

        let identifier = overlay.identifier.clone();
        let version = self
            .store
            .save_overlay(tenant, overlay, stored.version)
            .await?;

        tracing::info!(
            tenant = %tenant,
            identifier = %identifier,
            version = %version,
            "Extra configuration saved"
        );

        self.apply(tenant, &effective)?;
        self.nudge_sync();
        Ok(())
    }

    /// Remove the tenant's extra configuration if it carries `identifier`.
    /// Deleting an absent or non-matching overlay succeeds silently.
    pub async fn delete_and_apply_extra_config(
        &self,
        tenant: &TenantId,
        identifier: &str,
    ) -> Result<(), ApplyError> {
        let result = self.delete_and_apply_inner(tenant, identifier).await;
        metrics::record_apply("delete", result.is_ok());
        result
    }

    async fn delete_and_apply_inner(
        &self,
        tenant: &TenantId,
        identifier: &str,
    ) -> Result<(), ApplyError> {
        if identifier.trim().is_empty() {
            return Err(ApplyError::InvalidRequest(
                "an extra configuration identifier is required".into(),
            ));
        }

        let lock = self.tenant_lock(tenant);
        let _guard = lock.lock().await;

        let stored = self
            .store
            .get(tenant)
            .await
            .map_err(|source| ApplyError::CurrentConfig {
                tenant: tenant.clone(),
                source,
            })?;

        let version = self.store.delete_overlay(tenant, identifier).await?;

        let remaining = stored
            .overlay
            .as_ref()
            .filter(|o| o.identifier != identifier);
        let effective = merge::merge(&stored.primary, remaining)?;

        tracing::info!(
            tenant = %tenant,
            identifier = %identifier,
            version = %version,
            "Extra configuration deleted"
        );

        self.apply(tenant, &effective)?;
        self.nudge_sync();
        Ok(())
    }

    /// Read-only view of the tenant's effective configuration and overlay
    /// summary. Never touches the instance pool.
    pub async fn get_effective_config(
        &self,
        tenant: &TenantId,
        redact: bool,
    ) -> Result<(EffectiveConfig, Option<OverlayConfig>), ApplyError> {
        let stored = self
            .store
            .get(tenant)
            .await
            .map_err(|source| ApplyError::CurrentConfig {
                tenant: tenant.clone(),
                source,
            })?;

        let effective = merge::merge(&stored.primary, stored.overlay.as_ref())?;
        if redact {
            Ok((
                effective.redacted(),
                stored.overlay.map(|o| o.redacted()),
            ))
        } else {
            Ok((effective, stored.overlay))
        }
    }

    fn apply(&self, tenant: &TenantId, effective: &EffectiveConfig) -> Result<(), ApplyError> {
        self.pool
            .ensure(tenant, effective)
            .map_err(|source| ApplyError::Engine {
                tenant: tenant.clone(),
                source,
            })?;
        Ok(())
    }

    fn tenant_lock(&self, tenant: &TenantId) -> Arc<Mutex<()>> {
        self.locks
            .entry(tenant.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn nudge_sync(&self) {
        if let Some(tx) = &self.sync_nudge {
            let _ = tx.send(());
        }
    }
}
