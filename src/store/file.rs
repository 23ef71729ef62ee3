//! File-backed configuration store.
//!
//! # Responsibilities
//! - Persist one JSON document per tenant under a root directory
//! - Guarantee a failed save never leaves a partially written document
//!
//! # Design Decisions
//! - Writes go to a temp file then rename, so readers only ever observe a
//!   complete document
//! - A single store-wide mutex serializes mutations; per-tenant exclusivity
//!   for the save-then-reload sequence is the manager's job
//! - Tenant ids are percent-encoded into file names, so opaque ids cannot
//!   escape the root directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::model::{ConfigVersion, OverlayConfig, PrimaryConfig, StoredConfig, TenantId};
use crate::store::{check_overlay_slot, check_version, ConfigStore, StoreError};

pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, tenant: &TenantId) -> PathBuf {
        self.root.join(format!("{}.json", encode_id(tenant.as_str())))
    }

    async fn read(&self, tenant: &TenantId) -> Result<StoredConfig, StoreError> {
        let path = self.path_for(tenant);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::TenantNotFound(tenant.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            tenant: tenant.clone(),
            reason: e.to_string(),
        })
    }

    async fn write(&self, tenant: &TenantId, stored: &StoredConfig) -> Result<(), StoreError> {
        let path = self.path_for(tenant);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(stored).map_err(|e| StoreError::Corrupt {
            tenant: tenant.clone(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn list_tenants(&self) -> Result<Vec<TenantId>, StoreError> {
        let mut tenants = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            if let Some(id) = tenant_from_path(&entry.path()) {
                tenants.push(id);
            }
        }
        tenants.sort();
        Ok(tenants)
    }

    async fn get(&self, tenant: &TenantId) -> Result<StoredConfig, StoreError> {
        self.read(tenant).await
    }

    async fn save_overlay(
        &self,
        tenant: &TenantId,
        overlay: OverlayConfig,
        expected: ConfigVersion,
    ) -> Result<ConfigVersion, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read(tenant).await?;

        check_version(tenant, &stored, expected)?;
        check_overlay_slot(&stored, &overlay.identifier)?;

        stored.overlay = Some(overlay);
        stored.version = stored.version.next();
        self.write(tenant, &stored).await?;
        Ok(stored.version)
    }

    async fn delete_overlay(
        &self,
        tenant: &TenantId,
        identifier: &str,
    ) -> Result<ConfigVersion, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read(tenant).await?;

        match &stored.overlay {
            Some(existing) if existing.identifier == identifier => {
                stored.overlay = None;
                stored.version = stored.version.next();
                self.write(tenant, &stored).await?;
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
        let _guard = self.write_lock.lock().await;
        let stored = StoredConfig {
            primary,
            overlay: None,
            version: ConfigVersion::initial(),
        };
        self.write(&tenant, &stored).await?;
        Ok(stored.version)
    }

    async fn deprovision(&self, tenant: &TenantId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.path_for(tenant)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn decode_id(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn tenant_from_path(path: &Path) -> Option<TenantId> {
    if path.extension()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    decode_id(stem).map(TenantId::new)
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

    #[tokio::test]
    async fn test_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let tenant = TenantId::from("org/with strange:id");

        store
            .provision(tenant.clone(), PrimaryConfig::default())
            .await
            .unwrap();
        let version = store.get(&tenant).await.unwrap().version;
        store
            .save_overlay(&tenant, overlay("disk-cfg"), version)
            .await
            .unwrap();

        // Fresh store over the same directory sees the same state.
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.list_tenants().await.unwrap(), vec![tenant.clone()]);
        let stored = reopened.get(&tenant).await.unwrap();
        assert_eq!(stored.overlay.unwrap().identifier, "disk-cfg");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let tenant = TenantId::from("org-1");

        std::fs::write(dir.path().join("org-1.json"), b"{not json").unwrap();

        let err = store.get(&tenant).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_deprovision_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let tenant = TenantId::from("org-1");

        store
            .provision(tenant.clone(), PrimaryConfig::default())
            .await
            .unwrap();
        store.deprovision(&tenant).await.unwrap();
        store.deprovision(&tenant).await.unwrap();

        assert!(store.list_tenants().await.unwrap().is_empty());
    }
}
