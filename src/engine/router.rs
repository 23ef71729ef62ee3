//! Route tree evaluation.
//!
//! # Responsibilities
//! - Compile a validated routing document into an immutable evaluator
//! - Resolve the receiver set for an alert's label set
//!
//! # Design Decisions
//! - Depth-first child walk; first matching child wins unless it sets
//!   `continue`, in which case later siblings are tried as well
//! - A node without a receiver inherits its parent's
//! - Receiver list is deduplicated preserving first-hit order

use crate::engine::{validate_document, DocumentError, RoutingEngine};
use crate::model::{matches_all, LabelSet, Route, RoutingDocument};

/// Default engine implementation: an in-process route tree walker.
#[derive(Debug, Default)]
pub struct TreeEngine;

impl RoutingEngine for TreeEngine {
    fn compile(&self, document: &RoutingDocument) -> Result<CompiledRouter, DocumentError> {
        validate_document(document)?;
        // Root receiver presence is guaranteed by validation.
        let root_receiver = document
            .route
            .receiver
            .clone()
            .ok_or(DocumentError::MissingRootReceiver)?;
        Ok(CompiledRouter {
            route: document.route.clone(),
            root_receiver,
        })
    }
}

/// An immutable, validated route tree ready for per-alert evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRouter {
    route: Route,
    root_receiver: String,
}

impl CompiledRouter {
    /// Resolve the receivers an alert with these labels is delivered to.
    pub fn route_alert(&self, labels: &LabelSet) -> Vec<String> {
        let mut out = Vec::new();
        walk(&self.route, labels, &self.root_receiver, &mut out);
        let mut seen = std::collections::BTreeSet::new();
        out.retain(|r| seen.insert(r.clone()));
        out
    }
}

fn walk(node: &Route, labels: &LabelSet, inherited: &str, out: &mut Vec<String>) {
    let receiver = node.receiver.as_deref().unwrap_or(inherited);

    let mut matched_child = false;
    for child in &node.routes {
        if matches_all(&child.matchers, labels) {
            matched_child = true;
            walk(child, labels, receiver, out);
            if !child.continue_matching {
                break;
            }
        }
    }

    if !matched_child {
        out.push(receiver.to_string());
    }
}
