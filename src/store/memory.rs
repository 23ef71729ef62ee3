//! In-memory configuration store.
//!
//! Backs tests and embedded deployments. Per-tenant mutations are serialized
//! by the dashmap shard lock held across the read-check-write sequence.

use dashmap::DashMap;

use async_trait::async_trait;

use crate::model::{ConfigVersion, OverlayConfig, PrimaryConfig, StoredConfig, TenantId};
use crate::store::{check_overlay_slot, check_version, ConfigStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tenants: DashMap<TenantId, StoredConfig>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn list_tenants(&self) -> Result<Vec<TenantId>, StoreError> {
        let mut tenants: Vec<TenantId> =
            self.tenants.iter().map(|entry| entry.key().clone()).collect();
        tenants.sort();
        Ok(tenants)
    }

    async fn get(&self, tenant: &TenantId) -> Result<StoredConfig, StoreError> {
        self.tenants
            .get(tenant)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::TenantNotFound(tenant.clone()))
    }

    async fn save_overlay(
        &self,
        tenant: &TenantId,
        overlay: OverlayConfig,
        expected: ConfigVersion,
    ) -> Result<ConfigVersion, StoreError> {
        let mut entry = self
            .tenants
            .get_mut(tenant)
            .ok_or_else(|| StoreError::TenantNotFound(tenant.clone()))?;

        check_version(tenant, entry.value(), expected)?;
        check_overlay_slot(entry.value(), &overlay.identifier)?;

        let stored = entry.value_mut();
        stored.overlay = Some(overlay);
        stored.version = stored.version.next();
        Ok(stored.version)
    }

    async fn delete_overlay(
        &self,
        tenant: &TenantId,
        identifier: &str,
    ) -> Result<ConfigVersion, StoreError> {
        let mut entry = self
            .tenants
            .get_mut(tenant)
            .ok_or_else(|| StoreError::TenantNotFound(tenant.clone()))?;

        let stored = entry.value_mut();
        match &stored.overlay {
            Some(existing) if existing.identifier == identifier => {
                stored.overlay = None;
                stored.version = stored.version.next();
            }
            // Absent or non-matching identifier: no-op.
            _ => {}
        }
        Ok(stored.version)
    }

    async fn provision(
        &self,
        tenant: TenantId,
        primary: PrimaryConfig,
    ) -> Result<ConfigVersion, StoreError> {
        let version = ConfigVersion::initial();
        self.tenants.insert(
            tenant,
            StoredConfig {
                primary,
                overlay: None,
                version,
            },
        );
        Ok(version)
    }

    async fn deprovision(&self, tenant: &TenantId) -> Result<(), StoreError> {
        self.tenants.remove(tenant);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabelMatcher, Receiver, Route, RoutingDocument};

    fn overlay(identifier: &str) -> OverlayConfig {
        OverlayConfig {
            identifier: identifier.to_string(),
            merge_matchers: vec![LabelMatcher::new("env", "prod")],
            routing: RoutingDocument {
                route: Route::to_receiver("r1"),
                receivers: vec![Receiver::named("r1")],
            },
            template_files: Default::default(),
        }
    }

    async fn provisioned() -> (MemoryStore, TenantId) {
        let store = MemoryStore::new();
        let tenant = TenantId::from("org-1");
        store
            .provision(tenant.clone(), PrimaryConfig::default())
            .await
            .unwrap();
        (store, tenant)
    }

    #[tokio::test]
    async fn test_get_unknown_tenant_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get(&TenantId::from("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::TenantNotFound(_)));
    }

    #[tokio::test]
    async fn test_save_bumps_version_and_reads_back() {
        let (store, tenant) = provisioned().await;
        let before = store.get(&tenant).await.unwrap().version;

        let after = store
            .save_overlay(&tenant, overlay("cfg"), before)
            .await
            .unwrap();
        assert!(after > before);

        let stored = store.get(&tenant).await.unwrap();
        assert_eq!(stored.overlay.unwrap().identifier, "cfg");
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let (store, tenant) = provisioned().await;
        let version = store.get(&tenant).await.unwrap().version;
        store
            .save_overlay(&tenant, overlay("cfg"), version)
            .await
            .unwrap();

        // Second writer still holding the old version loses.
        let err = store
            .save_overlay(&tenant, overlay("cfg"), version)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn test_second_identifier_is_rejected_with_existing_name() {
        let (store, tenant) = provisioned().await;
        let version = store.get(&tenant).await.unwrap().version;
        let version = store
            .save_overlay(&tenant, overlay("first-config"), version)
            .await
            .unwrap();

        let err = store
            .save_overlay(&tenant, overlay("second-config"), version)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("multiple extra configurations are not supported"));
        assert!(err.to_string().contains("first-config"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, tenant) = provisioned().await;
        let version = store.get(&tenant).await.unwrap().version;
        store
            .save_overlay(&tenant, overlay("x"), version)
            .await
            .unwrap();

        let v1 = store.delete_overlay(&tenant, "x").await.unwrap();
        assert!(store.get(&tenant).await.unwrap().overlay.is_none());

        // Absent overlay: no-op, version unchanged.
        let v2 = store.delete_overlay(&tenant, "x").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_delete_with_non_matching_identifier_is_noop() {
        let (store, tenant) = provisioned().await;
        let version = store.get(&tenant).await.unwrap().version;
        store
            .save_overlay(&tenant, overlay("keep"), version)
            .await
            .unwrap();

        store.delete_overlay(&tenant, "other").await.unwrap();
        let stored = store.get(&tenant).await.unwrap();
        assert_eq!(stored.overlay.unwrap().identifier, "keep");
    }
}
