//! Merge algorithm and validation.

use thiserror::Error;

use crate::engine::{validate_document, DocumentError};
use crate::model::{EffectiveConfig, OverlayConfig, PrimaryConfig, Route};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Primary and overlay both declare one of these receiver names.
    #[error("receiver name collision between primary and extra configuration: {}", names.join(", "))]
    ReceiverCollision { names: Vec<String> },

    /// The merged document failed the routing engine's structural rules.
    #[error("invalid merged configuration: {0}")]
    Invalid(#[from] DocumentError),
}

/// Compute the effective configuration for a tenant.
///
/// With no overlay the primary passes through unchanged. With an overlay,
/// receivers and template files from both sides are combined and a synthetic
/// route is grafted under the primary root: alerts satisfying every merge
/// matcher are routed through the overlay's tree and then continue to the
/// primary children; all other alerts see only the primary tree.
pub fn merge(
    primary: &PrimaryConfig,
    overlay: Option<&OverlayConfig>,
) -> Result<EffectiveConfig, MergeError> {
    let Some(overlay) = overlay else {
        return Ok(EffectiveConfig {
            routing: primary.routing.clone(),
            template_files: primary.template_files.clone(),
            globals: primary.globals.clone(),
        });
    };

    let primary_names: std::collections::BTreeSet<&str> = primary
        .routing
        .receivers
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    let colliding: Vec<String> = overlay
        .routing
        .receivers
        .iter()
        .filter(|r| primary_names.contains(r.name.as_str()))
        .map(|r| r.name.clone())
        .collect();
    if !colliding.is_empty() {
        return Err(MergeError::ReceiverCollision { names: colliding });
    }

    let mut routing = primary.routing.clone();
    routing
        .receivers
        .extend(overlay.routing.receivers.iter().cloned());
    routing.route.routes.insert(0, graft_route(overlay));

    let mut template_files = primary.template_files.clone();
    for (name, source) in &overlay.template_files {
        template_files.insert(format!("{}/{}", overlay.identifier, name), source.clone());
    }

    Ok(EffectiveConfig {
        routing,
        template_files,
        globals: primary.globals.clone(),
    })
}

/// Re-check the merged document against the structural rules the routing
/// engine enforces. Runs before any persistence on the apply path.
pub fn validate(effective: &EffectiveConfig) -> Result<(), MergeError> {
    validate_document(&effective.routing)?;
    Ok(())
}

/// The overlay root becomes a first-position child of the primary root. The
/// merge matchers are prepended to whatever matchers the overlay root
/// carries, and `continue` is forced so matching alerts still reach the
/// primary children.
fn graft_route(overlay: &OverlayConfig) -> Route {
    let root = &overlay.routing.route;
    let mut matchers = overlay.merge_matchers.clone();
    matchers.extend(root.matchers.iter().cloned());
    Route {
        receiver: root.receiver.clone(),
        matchers,
        continue_matching: true,
        routes: root.routes.clone(),
    }
}
