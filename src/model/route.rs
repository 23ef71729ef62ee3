//! Route tree definition.

use serde::{Deserialize, Serialize};

use crate::model::matcher::LabelMatcher;

/// A node in the alert routing tree.
///
/// Children are evaluated in order; the first matching child handles the
/// alert unless it sets `continue`, in which case later siblings are tried
/// as well. A node without a receiver inherits its parent's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Route {
    /// Receiver handling alerts that stop at this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,

    /// Label predicates an alert must satisfy to enter this node.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matchers: Vec<LabelMatcher>,

    /// Keep evaluating sibling routes after this node matched.
    #[serde(rename = "continue", skip_serializing_if = "std::ops::Not::not")]
    pub continue_matching: bool,

    /// Child routes, evaluated in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl Route {
    /// A leaf route delivering to the named receiver.
    pub fn to_receiver(receiver: impl Into<String>) -> Self {
        Self {
            receiver: Some(receiver.into()),
            ..Default::default()
        }
    }
}
