//! Running-instance pool.
//!
//! # Data Flow
//! ```text
//! EffectiveConfig (from store + merge)
//!     → InstancePool::ensure (build / content-diff reload / no-op)
//!     → RunningInstance (ArcSwap snapshot of config + compiled router)
//!     → route_alert reads exactly one snapshot per evaluation
//! ```
//!
//! # Design Decisions
//! - The pool is the only owner of instances; callers get Arc handles but
//!   all mutation goes through ensure/remove
//! - A failed build or reload keeps the previous instance untouched; a
//!   tenant is never left without a usable instance by a bad update
//! - Reload swaps one Arc, so an in-flight alert evaluation sees either the
//!   old or the new configuration, never a mix

pub mod instance;

pub use instance::RunningInstance;

use std::sync::Arc;

use dashmap::DashMap;

use crate::engine::{DocumentError, RoutingEngine};
use crate::model::{EffectiveConfig, TenantId};
use crate::observability::metrics;

/// Outcome of an [`InstancePool::ensure`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    Reloaded,
    Unchanged,
}

/// Registry of one running routing instance per tenant.
pub struct InstancePool {
    engine: Arc<dyn RoutingEngine>,
    instances: DashMap<TenantId, Arc<RunningInstance>>,
}

impl InstancePool {
    pub fn new(engine: Arc<dyn RoutingEngine>) -> Self {
        Self {
            engine,
            instances: DashMap::new(),
        }
    }

    /// Bring the tenant's instance in line with `config`.
    ///
    /// Builds a missing instance, reloads in place when the loaded
    /// configuration differs by content, and no-ops otherwise.
    pub fn ensure(
        &self,
        tenant: &TenantId,
        config: &EffectiveConfig,
    ) -> Result<EnsureOutcome, DocumentError> {
        if let Some(instance) = self.instances.get(tenant) {
            if instance.is_current(config) {
                return Ok(EnsureOutcome::Unchanged);
            }
            // Compile before swapping: a rejected config leaves the old
            // snapshot serving alerts.
            let router = self.engine.compile(&config.routing)?;
            instance.reload(config.clone(), router);
            tracing::info!(tenant = %tenant, instance = %instance.id(), "Instance reloaded");
            return Ok(EnsureOutcome::Reloaded);
        }

        let router = self.engine.compile(&config.routing)?;
        let instance = Arc::new(RunningInstance::new(tenant.clone(), config.clone(), router));
        tracing::info!(tenant = %tenant, instance = %instance.id(), "Instance created");
        self.instances.insert(tenant.clone(), instance);
        metrics::set_running_instances(self.instances.len());
        Ok(EnsureOutcome::Created)
    }

    /// Stop and discard the tenant's instance. Idempotent.
    pub fn remove(&self, tenant: &TenantId) -> bool {
        let removed = self.instances.remove(tenant).is_some();
        if removed {
            tracing::info!(tenant = %tenant, "Instance removed");
            metrics::set_running_instances(self.instances.len());
        }
        removed
    }

    pub fn get(&self, tenant: &TenantId) -> Option<Arc<RunningInstance>> {
        self.instances.get(tenant).map(|entry| entry.value().clone())
    }

    /// Tenants currently holding an instance, for reconciliation diffing.
    pub fn tenants(&self) -> Vec<TenantId> {
        self.instances.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TreeEngine;
    use crate::model::{EffectiveConfig, Receiver, Route, RoutingDocument};

    fn effective(receiver: &str) -> EffectiveConfig {
        EffectiveConfig {
            routing: RoutingDocument {
                route: Route::to_receiver(receiver),
                receivers: vec![Receiver::named(receiver)],
            },
            ..Default::default()
        }
    }

    fn pool() -> InstancePool {
        InstancePool::new(Arc::new(TreeEngine))
    }

    #[test]
    fn test_ensure_creates_then_noops() {
        let pool = pool();
        let tenant = TenantId::from("org-1");
        let config = effective("r1");

        assert_eq!(pool.ensure(&tenant, &config).unwrap(), EnsureOutcome::Created);
        assert_eq!(pool.ensure(&tenant, &config).unwrap(), EnsureOutcome::Unchanged);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_content_change_reloads_in_place() {
        let pool = pool();
        let tenant = TenantId::from("org-1");

        pool.ensure(&tenant, &effective("r1")).unwrap();
        let instance = pool.get(&tenant).unwrap();

        assert_eq!(pool.ensure(&tenant, &effective("r2")).unwrap(), EnsureOutcome::Reloaded);

        // Same instance object, new snapshot.
        let after = pool.get(&tenant).unwrap();
        assert_eq!(instance.id(), after.id());
        assert_eq!(after.route_alert(&Default::default()), vec!["r2"]);
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let pool = pool();
        let tenant = TenantId::from("org-1");
        pool.ensure(&tenant, &effective("r1")).unwrap();

        let mut bad = effective("r2");
        bad.routing.receivers.clear();
        assert!(pool.ensure(&tenant, &bad).is_err());

        let instance = pool.get(&tenant).unwrap();
        assert_eq!(instance.route_alert(&Default::default()), vec!["r1"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let pool = pool();
        let tenant = TenantId::from("org-1");
        pool.ensure(&tenant, &effective("r1")).unwrap();

        assert!(pool.remove(&tenant));
        assert!(!pool.remove(&tenant));
        assert!(pool.get(&tenant).is_none());
    }
}
