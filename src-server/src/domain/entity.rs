//! Domain Layer - Core Entity Traits
//!
//! Every persisted row has an id assigned by the store and belongs to
//! exactly one owner.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Identity-provider subject of the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Form-level checks run before any write
pub trait Validate {
    fn validate(&self) -> DomainResult<()>;
}

/// An entity scoped to one owner, created from `Draft` and edited by `Patch`
pub trait OwnedEntity: Entity<Id = i64> + Serialize + 'static {
    type Draft: Validate + DeserializeOwned + Send + Sync + 'static;
    type Patch: Validate + DeserializeOwned + Send + Sync + 'static;

    /// Human name used in messages, e.g. "Todo"
    const NOUN: &'static str;

    fn owner_id(&self) -> &OwnerId;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// User-facing text for anything the caller cannot act on
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),
}

impl DomainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DomainError::ValidationFailed(msg.into())
    }

    pub fn upstream(err: impl std::fmt::Display) -> Self {
        DomainError::UpstreamFailure(err.to_string())
    }

    /// Message safe to put in a response envelope
    pub fn public_message(&self) -> String {
        match self {
            DomainError::UpstreamFailure(_) => GENERIC_FAILURE.to_string(),
            DomainError::ValidationFailed(msg) => msg.clone(),
            DomainError::NotFound(what) => format!("{} not found", what),
            other => other.to_string(),
        }
    }
}

/// Trimmed length check counted in characters
pub(crate) fn check_text(field: &str, value: &str, max: usize) -> DomainResult<()> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(DomainError::invalid(format!("{} is required", field)));
    }
    if len > max {
        return Err(DomainError::invalid(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
