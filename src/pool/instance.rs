//! A single tenant's running routing instance.

use arc_swap::ArcSwap;
use std::sync::Arc;
use uuid::Uuid;

use crate::engine::CompiledRouter;
use crate::model::{EffectiveConfig, LabelSet, TenantId};

/// An in-memory routing engine bound to one tenant and one configuration
/// snapshot. Owned exclusively by the pool.
pub struct RunningInstance {
    tenant: TenantId,
    id: Uuid,
    state: ArcSwap<LoadedState>,
}

struct LoadedState {
    config: EffectiveConfig,
    router: CompiledRouter,
}

impl RunningInstance {
    pub(crate) fn new(tenant: TenantId, config: EffectiveConfig, router: CompiledRouter) -> Self {
        Self {
            tenant,
            id: Uuid::new_v4(),
            state: ArcSwap::from_pointee(LoadedState { config, router }),
        }
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Stable identity across reloads, for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// True when the loaded configuration equals `config` by content.
    pub fn is_current(&self, config: &EffectiveConfig) -> bool {
        self.state.load().config == *config
    }

    /// The configuration snapshot currently serving alerts.
    pub fn config(&self) -> EffectiveConfig {
        self.state.load().config.clone()
    }

    /// Atomically swap in a new snapshot. Evaluations in flight keep the old
    /// one; later evaluations see only the new one.
    pub(crate) fn reload(&self, config: EffectiveConfig, router: CompiledRouter) {
        self.state.store(Arc::new(LoadedState { config, router }));
    }

    /// Resolve the receivers for an alert. Reads exactly one snapshot.
    pub fn route_alert(&self, labels: &LabelSet) -> Vec<String> {
        self.state.load().router.route_alert(labels)
    }
}
