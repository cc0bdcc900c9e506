// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Entity
//!
//! A resource is an allocatable physical or virtual entity that can be
//! booked for a time interval. Device resources additionally speak a set of
//! technologies and may own device capabilities (room providers, recording,
//! terminals).
//!
//! Resources are immutable once built. The index replaces a changed resource
//! by removing the old version and adding the new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::{
    Alias, Capability, CapabilityId, CapabilityType, DateTimeSpecification, ResourceId,
    Technology, TechnologySet, UserId, DEVICE_ADDRESS_PLACEHOLDER,
};

/// Resource validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Resource name must not be empty")]
    EmptyName,

    #[error("Resource '{0}' cannot be its own parent")]
    SelfParent(ResourceId),

    #[error("Capability '{capability_id}' of type {capability_type} requires a device resource")]
    DeviceCapabilityOnNonDevice {
        capability_id: CapabilityId,
        capability_type: CapabilityType,
    },

    #[error("Alias namespace '{0}' restricted to its resource requires a device resource")]
    RestrictedAliasOnNonDevice(CapabilityId),

    #[error("Capability '{0}' is declared more than once")]
    DuplicateCapability(CapabilityId),

    #[error("Device must support at least one technology")]
    NoTechnology,
}

/// Device-specific part of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Technologies the device speaks
    pub technologies: TechnologySet,

    /// Network address substituted into `{device.address}` alias templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl DeviceInfo {
    pub fn new(technologies: impl IntoIterator<Item = Technology>) -> Self {
        Self {
            technologies: technologies.into_iter().collect(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Resource entity
///
/// # Invariants
/// - Name is not empty
/// - A resource is never its own parent
/// - Device capabilities are owned only by device resources
/// - Capability ids are unique within the resource
///
/// Deserialization goes through [`ResourceBuilder::build`], so the invariants
/// hold for resources loaded from JSON too.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ResourceRecord")]
pub struct Resource {
    pub id: ResourceId,

    pub name: String,

    /// User who created the resource; owner of last resort
    pub created_by: UserId,

    /// Only allocatable resources can be scheduled
    pub allocatable: bool,

    /// Tie-break priority among candidates, lower first, unset last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_order: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ResourceId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_future: Option<DateTimeSpecification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,

    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl Resource {
    /// Builder pattern for fluent construction
    pub fn builder(
        id: impl Into<ResourceId>,
        name: impl Into<String>,
        created_by: impl Into<UserId>,
    ) -> ResourceBuilder {
        ResourceBuilder::new(id.into(), name.into(), created_by.into())
    }

    pub fn is_device(&self) -> bool {
        self.device.is_some()
    }

    /// Technologies of a device resource
    pub fn technologies(&self) -> Option<&TechnologySet> {
        self.device.as_ref().map(|device| &device.technologies)
    }

    /// Returns `true` if the resource is a device supporting any of `technologies`
    pub fn supports_any(&self, technologies: &TechnologySet) -> bool {
        self.technologies()
            .map(|supported| super::technology::intersects(supported, technologies))
            .unwrap_or(false)
    }

    pub fn capability(&self, id: CapabilityId) -> Option<&Capability> {
        self.capabilities.iter().find(|capability| capability.id == id)
    }

    /// Position of a capability within [`Resource::capabilities`]
    pub fn capability_position(&self, id: CapabilityId) -> Option<usize> {
        self.capabilities
            .iter()
            .position(|capability| capability.id == id)
    }

    pub fn has_capability(&self, capability_type: CapabilityType) -> bool {
        self.capabilities
            .iter()
            .any(|capability| capability.capability_type() == capability_type)
    }

    /// Latest instant the resource may be scheduled to
    ///
    /// `default` is the horizon inherited by resources without their own.
    /// `None` means the resource has no horizon at all.
    pub fn maximum_future_date_time(
        &self,
        reference: DateTime<Utc>,
        default: Option<&DateTimeSpecification>,
    ) -> Option<DateTime<Utc>> {
        self.maximum_future
            .as_ref()
            .or(default)
            .map(|specification| specification.earliest(reference))
    }

    /// Returns `true` if the resource may be scheduled up to `at`
    pub fn is_available_in_future(
        &self,
        at: DateTime<Utc>,
        reference: DateTime<Utc>,
        default: Option<&DateTimeSpecification>,
    ) -> bool {
        match self.maximum_future_date_time(reference, default) {
            Some(horizon) => at <= horizon,
            None => true,
        }
    }

    /// Let the device rewrite an alias generated for it
    ///
    /// Substitutes the device address into `{device.address}`. Non-device
    /// resources and devices without an address leave the alias untouched.
    pub fn transform_alias(&self, alias: Alias) -> Alias {
        match self.device.as_ref().and_then(|device| device.address.as_deref()) {
            Some(address) if alias.value.contains(DEVICE_ADDRESS_PLACEHOLDER) => Alias {
                value: alias.value.replace(DEVICE_ADDRESS_PLACEHOLDER, address),
                ..alias
            },
            _ => alias,
        }
    }

    /// Validate invariants for the current state
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.name.trim().is_empty() {
            return Err(ResourceError::EmptyName);
        }
        if self.parent_id == Some(self.id) {
            return Err(ResourceError::SelfParent(self.id));
        }
        if let Some(device) = &self.device {
            if device.technologies.is_empty() {
                return Err(ResourceError::NoTechnology);
            }
        }

        let mut seen = HashSet::new();
        for capability in &self.capabilities {
            if !seen.insert(capability.id) {
                return Err(ResourceError::DuplicateCapability(capability.id));
            }
            let capability_type = capability.capability_type();
            if capability_type.is_device_capability() && !self.is_device() {
                return Err(ResourceError::DeviceCapabilityOnNonDevice {
                    capability_id: capability.id,
                    capability_type,
                });
            }
            if let Some(namespace) = capability.alias_namespace() {
                if namespace.validate_owner(self).is_err() {
                    return Err(ResourceError::RestrictedAliasOnNonDevice(capability.id));
                }
            }
        }
        Ok(())
    }
}

/// Serialized form of a resource, validated on conversion
#[derive(Deserialize)]
struct ResourceRecord {
    id: ResourceId,
    name: String,
    created_by: UserId,
    allocatable: bool,
    #[serde(default)]
    allocation_order: Option<i32>,
    #[serde(default)]
    parent_id: Option<ResourceId>,
    #[serde(default)]
    maximum_future: Option<DateTimeSpecification>,
    #[serde(default)]
    device: Option<DeviceInfo>,
    #[serde(default)]
    capabilities: Vec<Capability>,
}

impl TryFrom<ResourceRecord> for Resource {
    type Error = ResourceError;

    fn try_from(record: ResourceRecord) -> Result<Self, Self::Error> {
        ResourceBuilder {
            resource: Resource {
                id: record.id,
                name: record.name,
                created_by: record.created_by,
                allocatable: record.allocatable,
                allocation_order: record.allocation_order,
                parent_id: record.parent_id,
                maximum_future: record.maximum_future,
                device: record.device,
                capabilities: record.capabilities,
            },
        }
        .build()
    }
}

/// Builder for Resource with fluent API
pub struct ResourceBuilder {
    resource: Resource,
}

impl ResourceBuilder {
    fn new(id: ResourceId, name: String, created_by: UserId) -> Self {
        Self {
            resource: Resource {
                id,
                name,
                created_by,
                allocatable: true,
                allocation_order: None,
                parent_id: None,
                maximum_future: None,
                device: None,
                capabilities: Vec::new(),
            },
        }
    }

    pub fn allocatable(mut self, allocatable: bool) -> Self {
        self.resource.allocatable = allocatable;
        self
    }

    pub fn allocation_order(mut self, order: i32) -> Self {
        self.resource.allocation_order = Some(order);
        self
    }

    pub fn parent(mut self, parent_id: impl Into<ResourceId>) -> Self {
        self.resource.parent_id = Some(parent_id.into());
        self
    }

    pub fn maximum_future(mut self, maximum_future: DateTimeSpecification) -> Self {
        self.resource.maximum_future = Some(maximum_future);
        self
    }

    pub fn device(mut self, device: DeviceInfo) -> Self {
        self.resource.device = Some(device);
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.resource.capabilities.push(capability);
        self
    }

    pub fn build(self) -> Result<Resource, ResourceError> {
        self.resource.validate()?;
        Ok(self.resource)
    }
}
