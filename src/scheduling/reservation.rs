// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reservations consumed by the availability checks

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{CapabilityId, ReservationId, ReservationRequestId, ResourceId, Slot};

/// Why a reservation request was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationPurpose {
    Science,
    Education,
    /// Resource owner books their own resource
    Owner,
    /// Resource is taken out of service
    Maintenance,
}

impl ReservationPurpose {
    /// Purposes reserved for resource owners
    pub fn is_by_owner(&self) -> bool {
        matches!(self, Self::Owner | Self::Maintenance)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Science => "science",
            Self::Education => "education",
            Self::Owner => "owner",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for ReservationPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request a reservation was allocated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationOrigin {
    pub request_id: ReservationRequestId,
    pub priority: i32,
    pub purpose: ReservationPurpose,
}

impl ReservationOrigin {
    pub fn new(request_id: impl Into<ReservationRequestId>, purpose: ReservationPurpose) -> Self {
        Self {
            request_id: request_id.into(),
            priority: 0,
            purpose,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// What a reservation holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReservationKind {
    /// Exclusive use of the whole resource
    Resource,
    /// Licenses of a room provider
    Room { license_count: u32 },
    /// Licenses of a recording capability
    Recording { license_count: u32 },
    /// Value allocated from an alias namespace
    Alias { value: String },
}

/// Committed or tentative reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub resource_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_id: Option<CapabilityId>,
    pub slot: Slot,
    pub kind: ReservationKind,
    pub origin: ReservationOrigin,
}

impl Reservation {
    pub fn new(
        id: impl Into<ReservationId>,
        resource_id: impl Into<ResourceId>,
        slot: Slot,
        kind: ReservationKind,
        origin: ReservationOrigin,
    ) -> Self {
        Self {
            id: id.into(),
            resource_id: resource_id.into(),
            capability_id: None,
            slot,
            kind,
            origin,
        }
    }

    /// Exclusive reservation of a whole resource
    pub fn resource(
        id: impl Into<ReservationId>,
        resource_id: impl Into<ResourceId>,
        slot: Slot,
        origin: ReservationOrigin,
    ) -> Self {
        Self::new(id, resource_id, slot, ReservationKind::Resource, origin)
    }

    /// Room reservation of `license_count` licenses on a room provider
    pub fn room(
        id: impl Into<ReservationId>,
        resource_id: impl Into<ResourceId>,
        capability_id: impl Into<CapabilityId>,
        slot: Slot,
        license_count: u32,
        origin: ReservationOrigin,
    ) -> Self {
        Self::new(id, resource_id, slot, ReservationKind::Room { license_count }, origin)
            .for_capability(capability_id)
    }

    pub fn for_capability(mut self, capability_id: impl Into<CapabilityId>) -> Self {
        self.capability_id = Some(capability_id.into());
        self
    }

    pub fn is_resource_reservation(&self) -> bool {
        matches!(self.kind, ReservationKind::Resource)
    }

    /// Licenses consumed by the reservation, zero for non-capacity kinds
    pub fn license_count(&self) -> u32 {
        match self.kind {
            ReservationKind::Room { license_count }
            | ReservationKind::Recording { license_count } => license_count,
            _ => 0,
        }
    }
}
