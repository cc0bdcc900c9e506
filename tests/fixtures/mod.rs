// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-resource-allocation
//!
//! Provides deterministic resources, slots and scheduling contexts.
//!
//! # Design Principles
//! - All test data is deterministic (no `Utc::now()`)
//! - Instants are expressed in hours after [`FIXED_TIMESTAMP`]
//! - Every context shares the store it was created with, so tests can commit
//!   reservations after building the context

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use cim_resource_allocation::domain::{
    AliasType, Capability, DeviceInfo, Resource, Slot, Technology,
};
use cim_resource_allocation::scheduling::{
    InMemoryReservationStore, ReservationOrigin, ReservationPurpose, SchedulingContext,
    StaticAuthorization,
};
use cim_resource_allocation::AliasNamespace;

// Fixed test timestamp (2026-01-19T00:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T00:00:00Z";

pub const ADMIN: &str = "admin";
pub const OWNER: &str = "owner";
pub const STRANGER: &str = "stranger";

/// Parse the fixed timestamp
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Instant `hours` after the fixed timestamp
pub fn at(hours: i64) -> DateTime<Utc> {
    fixed_timestamp() + Duration::hours(hours)
}

/// Slot `[at(start), at(end))`
pub fn slot(start: i64, end: i64) -> Slot {
    Slot::new(at(start), at(end)).expect("Invalid slot in test fixture")
}

pub fn origin(request: i64) -> ReservationOrigin {
    ReservationOrigin::new(request, ReservationPurpose::Science)
}

/// MCU owned by [`OWNER`] with one room provider (capability id = `id * 10`)
pub fn mcu(id: i64, license_count: u32, technologies: &[Technology]) -> Resource {
    Resource::builder(id, format!("mcu-{id}"), OWNER)
        .device(DeviceInfo::new(technologies.iter().copied()).with_address(format!("mcu{id}.cesnet.cz")))
        .capability(Capability::room_provider(id * 10, license_count))
        .build()
        .expect("Invalid MCU in test fixture")
}

/// Plain resource owned by [`OWNER`], optionally below `parent`
pub fn resource(id: i64, parent: Option<i64>) -> Resource {
    let mut builder = Resource::builder(id, format!("resource-{id}"), OWNER);
    if let Some(parent) = parent {
        builder = builder.parent(parent);
    }
    builder.build().expect("Invalid resource in test fixture")
}

/// Alias provider resource with a `ROOM_NAME -> "{value}"` namespace
pub fn room_name_provider(id: i64, pattern: &str) -> Resource {
    Resource::builder(id, format!("namespace-{id}"), OWNER)
        .capability(Capability::alias_provider(
            id * 10,
            AliasNamespace::new(pattern).with_alias(AliasType::RoomName, "{value}"),
        ))
        .build()
        .expect("Invalid alias provider in test fixture")
}

pub struct Scenario {
    pub store: Arc<InMemoryReservationStore>,
    pub authorization: Arc<StaticAuthorization>,
}

impl Scenario {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryReservationStore::new()),
            authorization: Arc::new(StaticAuthorization::new().with_administrator(ADMIN)),
        }
    }

    /// Context of an attempt starting at the fixed timestamp
    pub fn context(&self) -> SchedulingContext {
        SchedulingContext::new(fixed_timestamp(), self.store.clone(), self.authorization.clone())
    }

    pub fn context_for(&self, user: &str, purpose: ReservationPurpose) -> SchedulingContext {
        self.context().with_user(user).with_purpose(purpose)
    }
}
