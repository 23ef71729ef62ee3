//! Shared fixtures for integration tests.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use alertmux::engine::TreeEngine;
use alertmux::manager::TenantManager;
use alertmux::model::{
    LabelMatcher, OverlayConfig, PrimaryConfig, Receiver, Route, RoutingDocument, TenantId,
};
use alertmux::pool::InstancePool;
use alertmux::store::{ConfigStore, MemoryStore};

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub pool: Arc<InstancePool>,
    pub manager: TenantManager,
}

/// Manager over a memory store with one provisioned tenant, `org-1`.
pub async fn harness() -> (Harness, TenantId) {
    let store = Arc::new(MemoryStore::new());
    let pool = Arc::new(InstancePool::new(Arc::new(TreeEngine)));
    let manager = TenantManager::new(store.clone(), pool.clone(), None);

    let tenant = TenantId::from("org-1");
    store
        .provision(tenant.clone(), primary_config("default"))
        .await
        .expect("provision should succeed");

    (
        Harness {
            store,
            pool,
            manager,
        },
        tenant,
    )
}

pub fn primary_config(root_receiver: &str) -> PrimaryConfig {
    PrimaryConfig {
        routing: RoutingDocument {
            route: Route::to_receiver(root_receiver),
            receivers: vec![Receiver::named(root_receiver)],
        },
        ..Default::default()
    }
}

pub fn overlay_config(identifier: &str, receiver: &str) -> OverlayConfig {
    OverlayConfig {
        identifier: identifier.to_string(),
        merge_matchers: vec![LabelMatcher::new("env", "prod")],
        routing: RoutingDocument {
            route: Route::to_receiver(receiver),
            receivers: vec![Receiver::named(receiver)],
        },
        template_files: Default::default(),
    }
}
