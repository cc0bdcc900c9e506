// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource allocation core for a conferencing resource broker
//!
//! Decides which resources (MCUs, rooms, alias namespaces) can satisfy a
//! request for a time slot without colliding with committed allocations,
//! and materializes aliases for allocations from pattern-based namespaces.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{Duration, TimeZone, Utc};
//! use cim_resource_allocation::cache::ResourceIndex;
//! use cim_resource_allocation::domain::{Capability, DeviceInfo, Resource, Slot, Technology};
//! use cim_resource_allocation::scheduling::{
//!     InMemoryReservationStore, SchedulingContext, StaticAuthorization,
//! };
//!
//! let index = ResourceIndex::new();
//! let mcu = index.add_resource(
//!     Resource::builder(1, "mcu", "admin")
//!         .device(DeviceInfo::new([Technology::H323]))
//!         .capability(Capability::room_provider(10, 50))
//!         .build()?,
//! )?;
//!
//! let start = Utc.with_ymd_and_hms(2026, 1, 19, 10, 0, 0).unwrap();
//! let slot = Slot::new(start, start + Duration::hours(1))?;
//! let mut transaction = SchedulingContext::new(
//!     start,
//!     Arc::new(InMemoryReservationStore::new()),
//!     Arc::new(StaticAuthorization::new()),
//! );
//! assert!(index.is_resource_available(&mcu, &slot, &mut transaction));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod alias;
pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod scheduling;

// Re-export commonly used types
pub use alias::{AliasAllocation, AliasNamespace, PatternValueGenerator, ValueGenerator};
pub use cache::{CapabilityHandle, CapabilityIndex, KeyedCache, ResourceIndex};
pub use config::AllocationConfig;
pub use errors::{
    AliasError, AllocationError, AllocationResult, AvailabilityError, AvailabilityResult,
    CacheError, CacheResult,
};
pub use scheduling::{SchedulingContext, SchedulingTransaction};
