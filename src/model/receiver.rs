//! Receiver definitions.
//!
//! # Design Decisions
//! - Integration settings are typed per channel (webhook, email), not a
//!   free-form map, so redaction knows exactly which fields are secret
//! - Redaction replaces secrets with a fixed placeholder rather than
//!   dropping the field, so callers can tell a secret is configured

use serde::{Deserialize, Serialize};

/// Placeholder substituted for secret fields when a read requests redaction.
pub const REDACTED_SECRET: &str = "[REDACTED]";

/// A named notification receiver with its channel integrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    /// Unique receiver name, referenced by route nodes.
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub webhook_configs: Vec<WebhookConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email_configs: Vec<EmailConfig>,
}

impl Receiver {
    /// A bare named receiver with no integrations.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            webhook_configs: Vec::new(),
            email_configs: Vec::new(),
        }
    }

    /// Copy of this receiver with secret fields masked.
    pub fn redacted(&self) -> Receiver {
        let mut out = self.clone();
        for webhook in &mut out.webhook_configs {
            if webhook.bearer_token.is_some() {
                webhook.bearer_token = Some(REDACTED_SECRET.to_string());
            }
        }
        out
    }
}

/// Webhook delivery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,

    /// Optional bearer token sent with each delivery. Secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

/// Email delivery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub to: String,
}
