//! Routing-engine collaborator boundary.
//!
//! # Data Flow
//! ```text
//! EffectiveConfig
//!     → validate_document (structural checks)
//!     → RoutingEngine::compile (freeze into an immutable evaluator)
//!     → CompiledRouter::route_alert (per-alert receiver lookup)
//! ```
//!
//! # Design Decisions
//! - Compiled router is immutable after construction (thread-safe, no locks)
//! - Validation and compilation share the same structural rules, so a
//!   document accepted by validation always compiles
//! - Deterministic: same labels always produce the same receiver set

pub mod router;

pub use router::{CompiledRouter, TreeEngine};

use thiserror::Error;

use crate::model::{Receiver, Route, RoutingDocument};

/// Structural defects in a routing document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("root route must name a receiver")]
    MissingRootReceiver,

    #[error("route references undefined receiver \"{0}\"")]
    UndefinedReceiver(String),

    #[error("duplicate receiver name \"{0}\"")]
    DuplicateReceiver(String),

    #[error("receiver with empty name")]
    EmptyReceiverName,

    #[error("matcher with empty label name")]
    EmptyMatcherName,
}

/// Capability consumed from the routing engine: turn a validated document
/// into a running evaluator.
pub trait RoutingEngine: Send + Sync {
    fn compile(&self, document: &RoutingDocument) -> Result<CompiledRouter, DocumentError>;
}

/// Check a routing document against the structural rules the engine itself
/// enforces: unique receiver names, no dangling route references, a receiver
/// at the root, well-formed matchers.
pub fn validate_document(document: &RoutingDocument) -> Result<(), DocumentError> {
    let mut names = std::collections::BTreeSet::new();
    for receiver in &document.receivers {
        if receiver.name.is_empty() {
            return Err(DocumentError::EmptyReceiverName);
        }
        if !names.insert(receiver.name.as_str()) {
            return Err(DocumentError::DuplicateReceiver(receiver.name.clone()));
        }
    }

    if document.route.receiver.is_none() {
        return Err(DocumentError::MissingRootReceiver);
    }

    validate_route(&document.route, &names)
}

fn validate_route(
    route: &Route,
    receivers: &std::collections::BTreeSet<&str>,
) -> Result<(), DocumentError> {
    if let Some(name) = &route.receiver {
        if !receivers.contains(name.as_str()) {
            return Err(DocumentError::UndefinedReceiver(name.clone()));
        }
    }
    for matcher in &route.matchers {
        if matcher.name.is_empty() {
            return Err(DocumentError::EmptyMatcherName);
        }
    }
    for child in &route.routes {
        validate_route(child, receivers)?;
    }
    Ok(())
}

/// Convenience for tests and fixtures.
pub fn document(route: Route, receivers: Vec<Receiver>) -> RoutingDocument {
    RoutingDocument { route, receivers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabelMatcher, Receiver, Route};

    #[test]
    fn test_accepts_well_formed_document() {
        let doc = document(
            Route {
                receiver: Some("default".into()),
                routes: vec![Route {
                    receiver: Some("db-team".into()),
                    matchers: vec![LabelMatcher::new("team", "db")],
                    ..Default::default()
                }],
                ..Default::default()
            },
            vec![Receiver::named("default"), Receiver::named("db-team")],
        );

        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn test_rejects_dangling_receiver_reference() {
        let doc = document(
            Route::to_receiver("missing"),
            vec![Receiver::named("default")],
        );

        assert_eq!(
            validate_document(&doc),
            Err(DocumentError::UndefinedReceiver("missing".into()))
        );
    }

    #[test]
    fn test_rejects_missing_root_receiver() {
        let doc = document(Route::default(), vec![Receiver::named("default")]);

        assert_eq!(validate_document(&doc), Err(DocumentError::MissingRootReceiver));
    }

    #[test]
    fn test_rejects_duplicate_receivers() {
        let doc = document(
            Route::to_receiver("a"),
            vec![Receiver::named("a"), Receiver::named("a")],
        );

        assert_eq!(
            validate_document(&doc),
            Err(DocumentError::DuplicateReceiver("a".into()))
        );
    }
}
