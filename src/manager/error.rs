//! Apply API error taxonomy.
//!
//! Component errors keep their kind as they cross this layer; only tenant
//! and identifier context is added. The transport layer maps [`ErrorKind`]
//! to its own status space.

use thiserror::Error;

use crate::engine::DocumentError;
use crate::merge::MergeError;
use crate::model::TenantId;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApplyError {
    /// Missing required request parameter; rejected before storage access.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The tenant's current configuration could not be read.
    #[error("failed to get current configuration for tenant {tenant}: {source}")]
    CurrentConfig {
        tenant: TenantId,
        source: StoreError,
    },

    /// Storage rejected the mutation; kind preserved verbatim.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The prospective merged configuration is invalid.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// The routing engine rejected a configuration at load time.
    #[error("failed to apply configuration for tenant {tenant}: {source}")]
    Engine {
        tenant: TenantId,
        source: DocumentError,
    },
}

/// Coarse classification for transport mapping and retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request; never retried.
    InvalidRequest,
    /// Tenant or referenced resource absent; never retried.
    NotFound,
    /// Version mismatch or occupied overlay slot; blind retry reproduces it.
    Conflict,
    /// Structural validation failure; storage was not mutated.
    Validation,
    /// Transient storage or engine failure; eligible for bounded retry.
    Internal,
}

impl ApplyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplyError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ApplyError::CurrentConfig { source, .. } => store_kind(source),
            ApplyError::Store(source) => store_kind(source),
            ApplyError::Merge(_) => ErrorKind::Validation,
            ApplyError::Engine { .. } => ErrorKind::Validation,
        }
    }
}

fn store_kind(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::TenantNotFound(_) => ErrorKind::NotFound,
        StoreError::VersionConflict { .. } | StoreError::OverlayExists { .. } => {
            ErrorKind::Conflict
        }
        StoreError::Io(_) | StoreError::Corrupt { .. } => ErrorKind::Internal,
    }
}
