//! Periodic and triggered synchronization of instances with stored state.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::time;

use crate::merge;
use crate::model::TenantId;
use crate::observability::metrics;
use crate::pool::{EnsureOutcome, InstancePool};
use crate::store::{ConfigStore, StoreError};

/// Failure reconciling a single tenant.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Merge(#[from] merge::MergeError),

    #[error("failed to load routing instance: {0}")]
    Engine(#[from] crate::engine::DocumentError),
}

/// Outcome of one full reconciliation pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Instances created or reloaded.
    pub applied: usize,
    /// Instances already current.
    pub unchanged: usize,
    /// Instances retired because their tenant disappeared.
    pub removed: usize,
    /// Tenants that could not be reconciled this pass.
    pub failures: Vec<(TenantId, SyncError)>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Brings the instance pool into agreement with the store for the full
/// tenant population.
pub struct Reconciler {
    store: Arc<dyn ConfigStore>,
    pool: Arc<InstancePool>,
    interval: Duration,
    jitter: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        pool: Arc<InstancePool>,
        interval: Duration,
        jitter: Duration,
    ) -> Self {
        Self {
            store,
            pool,
            interval,
            jitter,
        }
    }

    /// One full reconciliation pass.
    ///
    /// Per-tenant failures are collected in the report; only a failure to
    /// enumerate tenants aborts the pass.
    pub async fn sync_all(&self) -> Result<SyncReport, StoreError> {
        let tenants = self.store.list_tenants().await?;
        let known: BTreeSet<&TenantId> = tenants.iter().collect();
        let mut report = SyncReport::default();

        for tenant in &tenants {
            match self.sync_tenant(tenant).await {
                Ok(EnsureOutcome::Unchanged) => report.unchanged += 1,
                Ok(_) => report.applied += 1,
                Err(e) => {
                    tracing::warn!(tenant = %tenant, error = %e, "Failed to reconcile tenant");
                    report.failures.push((tenant.clone(), e));
                }
            }
        }

        // Retire instances whose tenant no longer exists.
        for tenant in self.pool.tenants() {
            if !known.contains(&tenant) {
                self.pool.remove(&tenant);
                report.removed += 1;
            }
        }

        metrics::record_sync_run(report.failures.len());
        tracing::debug!(
            applied = report.applied,
            unchanged = report.unchanged,
            removed = report.removed,
            failed = report.failures.len(),
            "Reconciliation pass complete"
        );
        Ok(report)
    }

    async fn sync_tenant(&self, tenant: &TenantId) -> Result<EnsureOutcome, SyncError> {
        let stored = self.store.get(tenant).await?;
        let effective = merge::merge(&stored.primary, stored.overlay.as_ref())?;
        merge::validate(&effective)?;
        Ok(self.pool.ensure(tenant, &effective)?)
    }

    /// Run the sync loop until shutdown.
    ///
    /// Wakes on a jittered fixed interval and on explicit nudges sent after
    /// successful configuration mutations.
    pub async fn run(
        self: Arc<Self>,
        mut trigger: mpsc::UnboundedReceiver<()>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Reconciliation loop starting"
        );

        loop {
            let wait = self.interval + jittered(self.jitter);
            tokio::select! {
                _ = time::sleep(wait) => {
                    if let Err(e) = self.sync_all().await {
                        tracing::error!(error = %e, "Reconciliation pass aborted");
                    }
                }
                Some(()) = trigger.recv() => {
                    // Drain queued nudges so a burst of applies syncs once.
                    while trigger.try_recv().is_ok() {}
                    if let Err(e) = self.sync_all().await {
                        tracing::error!(error = %e, "Triggered reconciliation aborted");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reconciliation loop received shutdown signal, exiting");
                    break;
                }
            }
        }
    }
}

fn jittered(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    let ms = rand::thread_rng().gen_range(0..=max.as_millis() as u64);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TreeEngine;
    use crate::model::{PrimaryConfig, Receiver, Route, RoutingDocument};
    use crate::store::MemoryStore;

    fn primary(receiver: &str) -> PrimaryConfig {
        PrimaryConfig {
            routing: RoutingDocument {
                route: Route::to_receiver(receiver),
                receivers: vec![Receiver::named(receiver)],
            },
            ..Default::default()
        }
    }

    fn setup() -> (Arc<MemoryStore>, Arc<InstancePool>, Reconciler) {
        let store = Arc::new(MemoryStore::new());
        let pool = Arc::new(InstancePool::new(Arc::new(TreeEngine)));
        let reconciler = Reconciler::new(
            store.clone(),
            pool.clone(),
            Duration::from_secs(60),
            Duration::ZERO,
        );
        (store, pool, reconciler)
    }

    #[tokio::test]
    async fn test_sync_creates_missing_instances() {
        let (store, pool, reconciler) = setup();
        store
            .provision(TenantId::from("org-1"), primary("r1"))
            .await
            .unwrap();
        store
            .provision(TenantId::from("org-2"), primary("r2"))
            .await
            .unwrap();

        let report = reconciler.sync_all().await.unwrap();
        assert_eq!(report.applied, 2);
        assert!(report.is_clean());
        assert_eq!(pool.len(), 2);
    }

    #[tokio::test]
    async fn test_sync_removes_vanished_tenants() {
        let (store, pool, reconciler) = setup();
        let tenant = TenantId::from("org-1");
        store.provision(tenant.clone(), primary("r1")).await.unwrap();
        reconciler.sync_all().await.unwrap();
        assert_eq!(pool.len(), 1);

        store.deprovision(&tenant).await.unwrap();
        let report = reconciler.sync_all().await.unwrap();
        assert_eq!(report.removed, 1);
        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn test_one_bad_tenant_does_not_block_the_rest() {
        let (store, pool, reconciler) = setup();
        // Dangling receiver reference makes this tenant unloadable.
        let mut bad = primary("r1");
        bad.routing.receivers.clear();
        store
            .provision(TenantId::from("org-bad"), bad)
            .await
            .unwrap();
        store
            .provision(TenantId::from("org-good"), primary("r2"))
            .await
            .unwrap();

        let report = reconciler.sync_all().await.unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, TenantId::from("org-bad"));
        assert!(pool.get(&TenantId::from("org-good")).is_some());
        assert!(pool.get(&TenantId::from("org-bad")).is_none());
    }

    #[tokio::test]
    async fn test_repeated_sync_is_idempotent() {
        let (store, pool, reconciler) = setup();
        store
            .provision(TenantId::from("org-1"), primary("r1"))
            .await
            .unwrap();

        reconciler.sync_all().await.unwrap();
        let instance = pool.get(&TenantId::from("org-1")).unwrap();

        let report = reconciler.sync_all().await.unwrap();
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.applied, 0);
        // Same instance, untouched.
        assert_eq!(instance.id(), pool.get(&TenantId::from("org-1")).unwrap().id());
    }
}
