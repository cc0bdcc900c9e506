//! Error types for resource allocation
//!
//! Two families of failures exist:
//!
//! - [`CacheError`] signals a broken cache invariant (double add, removal of an
//!   absent object, capability routed to the wrong index). These are caller
//!   bugs and abort the surrounding operation.
//! - [`AvailabilityError`] is an expected, data-driven scheduling outcome. The
//!   orchestrator catches it per candidate and moves on to the next one.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{CapabilityType, ResourceId, Slot};

/// Errors raised by the keyed cache and the capability indices
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Object with the same key is already cached
    #[error("{kind} '{id}' is already in the cache")]
    DuplicateKey { kind: &'static str, id: i64 },

    /// Object is not cached
    #[error("{kind} '{id}' is not in the cache")]
    NotFound { kind: &'static str, id: i64 },

    /// Capability was routed to an index of a different type
    #[error("Capability of type {actual} cannot be added to index of {expected}")]
    TypeMismatch {
        expected: CapabilityType,
        actual: CapabilityType,
    },
}

/// Errors raised by the availability checks
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    /// Resource is not marked as allocatable
    #[error("Resource '{0}' is not allocatable")]
    NotAllocatable(ResourceId),

    /// Requesting user does not own the resource
    #[error("User is not owner of resource '{0}'")]
    NotOwner(ResourceId),

    /// Resource is already allocated; `slot` is the colliding reservation's
    #[error("Resource '{resource_id}' is already allocated in {slot}")]
    Collision { resource_id: ResourceId, slot: Slot },

    /// Resource is reserved for maintenance; `slot` is the maintenance reservation's
    #[error("Resource '{resource_id}' is under maintenance in {slot}")]
    UnderMaintenance { resource_id: ResourceId, slot: Slot },

    /// Slot ends after the maximum future the resource may be scheduled to
    #[error("Resource '{resource_id}' is not available after {horizon}")]
    NotAvailableInFuture {
        resource_id: ResourceId,
        horizon: DateTime<Utc>,
    },

    /// Reservation store query failed
    #[error("Reservation store error: {0}")]
    Store(String),
}

/// Errors raised by alias namespaces and value generation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AliasError {
    /// Value pattern cannot be parsed
    #[error("Invalid value pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Every value of the pattern is already used
    #[error("No value is available for pattern '{0}'")]
    ValueSpaceExhausted(String),

    /// Namespace restricted to its resource is owned by a non-device resource
    #[error("Alias namespace restricted to resource '{0}' requires a device resource")]
    RestrictedToNonDevice(ResourceId),
}

/// Umbrella error for callers that mix cache, availability and alias operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error(transparent)]
    Alias(#[from] AliasError),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for availability checks
pub type AvailabilityResult<T> = Result<T, AvailabilityError>;

/// Result type for alias operations
pub type AliasResult<T> = Result<T, AliasError>;

/// Result type for mixed allocation operations
pub type AllocationResult<T> = Result<T, AllocationError>;
