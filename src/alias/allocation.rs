// Copyright (c) 2025 - Cowboy AI, Inc.
//! Alias allocation: one generated value bound to a namespace

use crate::cache::CapabilityHandle;
use crate::domain::{Alias, CapabilityType, ReservationId, Slot};
use crate::errors::{CacheError, CacheResult};
use crate::scheduling::{Reservation, ReservationKind, ReservationOrigin};

/// Value allocated from an alias namespace
///
/// Aliases are materialized on every access because the owning device may
/// rewrite them based on its current state.
#[derive(Debug, Clone)]
pub struct AliasAllocation {
    namespace: CapabilityHandle,
    value: String,
}

impl AliasAllocation {
    /// Bind `value` to the alias namespace behind `namespace`
    pub fn new(namespace: CapabilityHandle, value: impl Into<String>) -> CacheResult<Self> {
        let actual = namespace.capability().capability_type();
        if actual != CapabilityType::AliasProvider {
            return Err(CacheError::TypeMismatch {
                expected: CapabilityType::AliasProvider,
                actual,
            });
        }
        Ok(Self {
            namespace,
            value: value.into(),
        })
    }

    pub fn namespace(&self) -> &CapabilityHandle {
        &self.namespace
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn aliases(&self) -> Vec<Alias> {
        match self.namespace.capability().alias_namespace() {
            Some(namespace) => namespace.materialize_aliases(self.namespace.resource(), &self.value),
            None => Vec::new(),
        }
    }

    /// Reservation holding the value for `slot`
    pub fn to_reservation(&self, id: ReservationId, slot: Slot, origin: ReservationOrigin) -> Reservation {
        Reservation::new(
            id,
            self.namespace.resource_id(),
            slot,
            ReservationKind::Alias {
                value: self.value.clone(),
            },
            origin,
        )
        .for_capability(self.namespace.capability_id())
    }
}
