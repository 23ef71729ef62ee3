//! Configuration document types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::matcher::LabelMatcher;
use crate::model::receiver::Receiver;
use crate::model::route::Route;

/// Opaque tenant (organization) identifier.
///
/// Tenants are provisioned and retired by an external collaborator; this
/// crate only observes their existence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Monotonic version token for optimistic-concurrency checks on a tenant's
/// persisted configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigVersion(u64);

impl ConfigVersion {
    pub fn initial() -> Self {
        Self(1)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A route tree plus the receivers it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoutingDocument {
    pub route: Route,
    pub receivers: Vec<Receiver>,
}

/// Tenant-wide settings carried by the primary configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Sender address for email integrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_from: Option<String>,

    /// Seconds without re-notification before an alert is considered resolved.
    pub resolve_timeout_secs: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            smtp_from: None,
            resolve_timeout_secs: 300,
        }
    }
}

/// The tenant's authoritative routing configuration. Exactly one per tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PrimaryConfig {
    pub routing: RoutingDocument,

    /// Template file name → template source.
    pub template_files: BTreeMap<String, String>,

    pub globals: GlobalConfig,
}

/// An externally-imported "extra" configuration bundle. At most one may
/// exist per tenant at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Tenant-unique key for the overlay slot.
    pub identifier: String,

    /// Label predicates selecting which alerts are also routed through the
    /// overlay's route tree. All must hold (AND).
    #[serde(default)]
    pub merge_matchers: Vec<LabelMatcher>,

    pub routing: RoutingDocument,

    #[serde(default)]
    pub template_files: BTreeMap<String, String>,
}

impl OverlayConfig {
    /// Copy with receiver secrets masked, for redacted reads.
    pub fn redacted(&self) -> OverlayConfig {
        let mut out = self.clone();
        out.routing.receivers = out.routing.receivers.iter().map(Receiver::redacted).collect();
        out
    }
}

/// The computed merge of primary and overlay. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EffectiveConfig {
    pub routing: RoutingDocument,

    /// Union of primary and (namespaced) overlay template files.
    pub template_files: BTreeMap<String, String>,

    pub globals: GlobalConfig,
}

impl EffectiveConfig {
    /// Copy with receiver secrets masked, for redacted reads.
    pub fn redacted(&self) -> EffectiveConfig {
        let mut out = self.clone();
        out.routing.receivers = out.routing.receivers.iter().map(Receiver::redacted).collect();
        out
    }
}

/// A tenant's persisted configuration document as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub primary: PrimaryConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlayConfig>,

    pub version: ConfigVersion,
}
