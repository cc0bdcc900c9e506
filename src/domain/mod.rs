// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Allocation Domain Models
//!
//! Value objects and entities the allocation indices operate on.
//!
//! # Value Objects with Invariants
//!
//! - [`ResourceId`], [`CapabilityId`], [`ReservationId`], [`ReservationRequestId`], [`UserId`] - store keys
//! - [`Technology`] - Conferencing technology taxonomy
//! - [`AliasType`] / [`Alias`] - Typed room identifiers and alias templates
//! - [`Slot`] - Half-open time interval `[start, end)`
//! - [`DateTimeSpecification`] - Absolute or relative maximum-future horizon
//!
//! # Entities
//!
//! - [`Resource`] - Allocatable entity, optionally a device speaking technologies
//! - [`Capability`] - Typed facet of a resource, tagged by [`CapabilityType`]

pub mod alias;
pub mod capability;
pub mod datetime_spec;
pub mod ids;
pub mod resource;
pub mod slot;
pub mod technology;

pub use alias::{Alias, AliasType, DEVICE_ADDRESS_PLACEHOLDER, VALUE_PLACEHOLDER};
pub use capability::{Capability, CapabilityKind, CapabilityType};
pub use datetime_spec::{DateTimeSpecification, DateTimeSpecificationError};
pub use ids::{CapabilityId, ReservationId, ReservationRequestId, ResourceId, UserId};
pub use resource::{DeviceInfo, Resource, ResourceBuilder, ResourceError};
pub use slot::{Slot, SlotError};
pub use technology::{Technology, TechnologySet};
