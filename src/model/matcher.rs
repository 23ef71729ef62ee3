//! Label matching for alert routing.
//!
//! # Responsibilities
//! - Match a single alert label against an expected value
//! - Combine matchers with AND semantics
//!
//! # Design Decisions
//! - Exact equality only; no regex or negation, to keep matching O(labels)
//! - An empty matcher set is a wildcard (always matches); non-emptiness of
//!   merge matchers is enforced at the request boundary, not here

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The label set of a single alert. Ordered map so serialized output is stable.
pub type LabelSet = BTreeMap<String, String>;

/// A single label-equality predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMatcher {
    /// Label name to inspect.
    pub name: String,
    /// Expected label value (exact match).
    pub value: String,
}

impl LabelMatcher {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns true if the label set carries this label with exactly this value.
    pub fn matches(&self, labels: &LabelSet) -> bool {
        labels.get(&self.name).map(|v| v == &self.value).unwrap_or(false)
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}

/// Returns true when every matcher holds for the given labels (AND semantics).
pub fn matches_all(matchers: &[LabelMatcher], labels: &LabelSet) -> bool {
    matchers.iter().all(|m| m.matches(labels))
}
