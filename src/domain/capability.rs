// Copyright (c) 2025 - Cowboy AI, Inc.
//! Capability Model
//!
//! A capability is a typed facet of a resource describing what it can do:
//! host virtual rooms, record, act as a terminal, or provide aliases.
//! Every capability declares its [`CapabilityType`] explicitly; the resource
//! index keys its secondary indices on that tag, and the tag states whether
//! the capability may only be owned by a device (which makes the capability
//! technology-aware).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AliasType, CapabilityId, DateTimeSpecification, Resource};
use crate::alias::AliasNamespace;

/// Tag of a capability kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityType {
    /// Device hosts virtual rooms up to a license count
    RoomProvider,
    /// Device records conferences up to a license count
    Recording,
    /// Device is an endpoint participants dial from
    Terminal,
    /// Resource allocates aliases from a namespace
    AliasProvider,
    /// Resource allocates plain values from a pattern
    ValueProvider,
}

impl CapabilityType {
    /// Returns `true` if only device resources may own this capability
    ///
    /// Device capabilities are indexed by the technologies of their owner.
    pub fn is_device_capability(&self) -> bool {
        matches!(self, Self::RoomProvider | Self::Recording | Self::Terminal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomProvider => "room_provider",
            Self::Recording => "recording",
            Self::Terminal => "terminal",
            Self::AliasProvider => "alias_provider",
            Self::ValueProvider => "value_provider",
        }
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific capability data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapabilityKind {
    RoomProvider {
        license_count: u32,
        #[serde(default)]
        required_alias_types: Vec<AliasType>,
    },
    Recording {
        license_count: u32,
    },
    Terminal,
    AliasProvider(AliasNamespace),
    ValueProvider {
        pattern: String,
    },
}

impl CapabilityKind {
    pub fn capability_type(&self) -> CapabilityType {
        match self {
            Self::RoomProvider { .. } => CapabilityType::RoomProvider,
            Self::Recording { .. } => CapabilityType::Recording,
            Self::Terminal => CapabilityType::Terminal,
            Self::AliasProvider(_) => CapabilityType::AliasProvider,
            Self::ValueProvider { .. } => CapabilityType::ValueProvider,
        }
    }
}

/// Capability owned by exactly one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub id: CapabilityId,

    /// Own maximum future; falls back to the owning resource's when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_future: Option<DateTimeSpecification>,

    pub kind: CapabilityKind,
}

impl Capability {
    pub fn new(id: impl Into<CapabilityId>, kind: CapabilityKind) -> Self {
        Self {
            id: id.into(),
            maximum_future: None,
            kind,
        }
    }

    /// Room provider with the given license count
    pub fn room_provider(id: impl Into<CapabilityId>, license_count: u32) -> Self {
        Self::new(
            id,
            CapabilityKind::RoomProvider {
                license_count,
                required_alias_types: Vec::new(),
            },
        )
    }

    /// Recording capability with the given license count
    pub fn recording(id: impl Into<CapabilityId>, license_count: u32) -> Self {
        Self::new(id, CapabilityKind::Recording { license_count })
    }

    /// Terminal capability
    pub fn terminal(id: impl Into<CapabilityId>) -> Self {
        Self::new(id, CapabilityKind::Terminal)
    }

    /// Alias provider backed by the given namespace
    pub fn alias_provider(id: impl Into<CapabilityId>, namespace: AliasNamespace) -> Self {
        Self::new(id, CapabilityKind::AliasProvider(namespace))
    }

    pub fn with_maximum_future(mut self, maximum_future: DateTimeSpecification) -> Self {
        self.maximum_future = Some(maximum_future);
        self
    }

    pub fn capability_type(&self) -> CapabilityType {
        self.kind.capability_type()
    }

    /// License count of capacity-style capabilities
    pub fn license_count(&self) -> Option<u32> {
        match &self.kind {
            CapabilityKind::RoomProvider { license_count, .. }
            | CapabilityKind::Recording { license_count } => Some(*license_count),
            _ => None,
        }
    }

    /// Alias namespace of an alias provider
    pub fn alias_namespace(&self) -> Option<&AliasNamespace> {
        match &self.kind {
            CapabilityKind::AliasProvider(namespace) => Some(namespace),
            _ => None,
        }
    }

    /// Latest instant the capability may be scheduled to
    ///
    /// Alias namespaces carry their own horizon which takes precedence over
    /// the capability-level one; without either the owning resource decides.
    pub fn maximum_future_date_time(
        &self,
        resource: &Resource,
        reference: DateTime<Utc>,
        default: Option<&DateTimeSpecification>,
    ) -> Option<DateTime<Utc>> {
        let own = self
            .alias_namespace()
            .and_then(|namespace| namespace.maximum_future())
            .or(self.maximum_future.as_ref());
        match own {
            Some(specification) => Some(specification.earliest(reference)),
            None => resource.maximum_future_date_time(reference, default),
        }
    }

    /// Returns `true` if the capability may be scheduled up to `at`
    pub fn is_available_in_future(
        &self,
        resource: &Resource,
        at: DateTime<Utc>,
        reference: DateTime<Utc>,
        default: Option<&DateTimeSpecification>,
    ) -> bool {
        match self.maximum_future_date_time(resource, reference, default) {
            Some(horizon) => at <= horizon,
            None => true,
        }
    }
}
