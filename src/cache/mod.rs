// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory resource and capability indices
//!
//! - [`KeyedCache`] - objects keyed by store id
//! - [`CapabilityIndex`] - per capability type secondary index, optionally
//!   technology aware through a [`TechnologyStrategy`]
//! - [`DeviceTopology`] - parent/child tree and device technologies
//! - [`ResourceIndex`] - the top-level index running availability checks

pub mod capability_index;
pub mod keyed;
pub mod resource_index;
pub mod topology;

pub use capability_index::{CapabilityHandle, CapabilityIndex, DeviceTechnologies, TechnologyStrategy};
pub use keyed::{Keyed, KeyedCache};
pub use resource_index::ResourceIndex;
pub use topology::DeviceTopology;
