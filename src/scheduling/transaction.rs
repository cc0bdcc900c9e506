// Copyright (c) 2025 - Cowboy AI, Inc.
//! Scheduling transaction
//!
//! One scheduling attempt owns one transaction. The transaction knows who is
//! scheduling and why, which reservations the attempt created so far, and
//! decides whether a collision with a stored reservation blocks the attempt
//! or can be resolved by reallocating the colliding request.
//!
//! A transaction is not shared between threads; independent attempts use
//! independent transactions.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info_span, Span};
use uuid::Uuid;

use super::{
    Authorization, Reservation, ReservationPurpose, ReservationStore, ReservationTransaction,
    ResourceOwners,
};
use crate::domain::{CapabilityId, ReservationRequestId, Resource, ResourceId, Slot, UserId};
use crate::errors::{AvailabilityError, AvailabilityResult};

/// Transaction state consumed by the availability checks
pub trait SchedulingTransaction {
    /// Identity of the attempt, recorded in tracing spans
    fn id(&self) -> Uuid;

    /// Only owners may allocate resources in this attempt
    fn is_owner_restricted(&self) -> bool;

    /// Requesting user is an administrator
    fn is_administrator(&self) -> bool;

    /// Requesting user owns `resource`
    fn contains_created_by_user_id(&self, resource: &Resource) -> bool;

    /// Maximum-future horizons apply to this attempt
    fn is_maximum_future_and_duration_restricted(&self) -> bool;

    /// Reference instant for relative horizons
    fn minimum_date_time(&self) -> DateTime<Utc>;

    /// Resource is already used by the attempt
    fn contains_referenced_resource(&self, resource_id: ResourceId) -> bool;

    fn reservation_store(&self) -> &dyn ReservationStore;

    fn resource_reservations(&self) -> &ReservationTransaction<ResourceId>;

    fn capability_reservations(&self) -> &ReservationTransaction<CapabilityId>;

    /// Decide whether the colliding reservations block `resource_id`
    ///
    /// Errors carry the slot of the first colliding reservation.
    fn detect_collisions(
        &mut self,
        resource_id: ResourceId,
        slot: &Slot,
        collisions: &[Reservation],
    ) -> AvailabilityResult<()>;
}

/// Scheduling attempt on behalf of a user
pub struct SchedulingContext {
    id: Uuid,
    user_id: Option<UserId>,
    purpose: Option<ReservationPurpose>,
    priority: i32,
    minimum_date_time: DateTime<Utc>,
    authorization: Arc<dyn Authorization>,
    store: Arc<dyn ReservationStore>,
    referenced_resources: HashSet<ResourceId>,
    resource_reservations: ReservationTransaction<ResourceId>,
    capability_reservations: ReservationTransaction<CapabilityId>,
    forced_reallocations: IndexSet<ReservationRequestId>,
    tentative_reallocations: IndexSet<ReservationRequestId>,
}

impl SchedulingContext {
    pub fn new(
        minimum_date_time: DateTime<Utc>,
        store: Arc<dyn ReservationStore>,
        authorization: Arc<dyn Authorization>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: None,
            purpose: None,
            priority: 0,
            minimum_date_time,
            authorization,
            store,
            referenced_resources: HashSet::new(),
            resource_reservations: ReservationTransaction::new(),
            capability_reservations: ReservationTransaction::new(),
            forced_reallocations: IndexSet::new(),
            tentative_reallocations: IndexSet::new(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_purpose(mut self, purpose: ReservationPurpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn purpose(&self) -> Option<ReservationPurpose> {
        self.purpose
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Span covering work done for this attempt
    pub fn span(&self) -> Span {
        info_span!(
            "scheduling",
            transaction_id = %self.id,
            purpose = self.purpose.map(|purpose| purpose.as_str()),
            priority = self.priority
        )
    }

    /// Mark a resource as used by the attempt
    pub fn reference_resource(&mut self, resource_id: ResourceId) {
        self.referenced_resources.insert(resource_id);
    }

    /// Record a reservation created by the attempt
    ///
    /// Capability reservations are tracked per capability, the rest per resource.
    pub fn add_allocated_reservation(&mut self, reservation: Reservation) {
        self.referenced_resources.insert(reservation.resource_id);
        match reservation.capability_id {
            Some(capability_id) => self
                .capability_reservations
                .add_allocated(capability_id, reservation),
            None => self
                .resource_reservations
                .add_allocated(reservation.resource_id, reservation),
        }
    }

    /// Record a stored reservation the attempt may reuse
    pub fn add_available_reservation(&mut self, reservation: Reservation) {
        match reservation.capability_id {
            Some(capability_id) => self
                .capability_reservations
                .add_available(capability_id, reservation),
            None => self
                .resource_reservations
                .add_available(reservation.resource_id, reservation),
        }
    }

    /// Requests that lose their reservations to this higher-priority attempt
    pub fn forced_reallocations(&self) -> impl Iterator<Item = &ReservationRequestId> {
        self.forced_reallocations.iter()
    }

    /// Requests a maintenance attempt tries to move elsewhere
    pub fn tentative_reallocations(&self) -> impl Iterator<Item = &ReservationRequestId> {
        self.tentative_reallocations.iter()
    }

    fn has_higher_priority(&self, collisions: &[Reservation]) -> bool {
        collisions
            .iter()
            .all(|reservation| self.priority > reservation.origin.priority)
    }
}

impl SchedulingTransaction for SchedulingContext {
    fn id(&self) -> Uuid {
        self.id
    }

    fn is_owner_restricted(&self) -> bool {
        self.purpose.is_some_and(|purpose| purpose.is_by_owner()) || self.priority > 0
    }

    fn is_administrator(&self) -> bool {
        self.user_id
            .as_ref()
            .is_some_and(|user| self.authorization.is_administrator(user))
    }

    fn contains_created_by_user_id(&self, resource: &Resource) -> bool {
        match self.authorization.resource_owners(resource) {
            ResourceOwners::Everyone => true,
            ResourceOwners::Users(owners) => {
                let Some(user) = self.user_id.as_ref() else {
                    return false;
                };
                if owners.is_empty() {
                    resource.created_by == *user
                } else {
                    owners.contains(user)
                }
            }
        }
    }

    fn is_maximum_future_and_duration_restricted(&self) -> bool {
        self.purpose.is_some_and(|purpose| !purpose.is_by_owner())
    }

    fn minimum_date_time(&self) -> DateTime<Utc> {
        self.minimum_date_time
    }

    fn contains_referenced_resource(&self, resource_id: ResourceId) -> bool {
        self.referenced_resources.contains(&resource_id)
    }

    fn reservation_store(&self) -> &dyn ReservationStore {
        self.store.as_ref()
    }

    fn resource_reservations(&self) -> &ReservationTransaction<ResourceId> {
        &self.resource_reservations
    }

    fn capability_reservations(&self) -> &ReservationTransaction<CapabilityId> {
        &self.capability_reservations
    }

    fn detect_collisions(
        &mut self,
        resource_id: ResourceId,
        slot: &Slot,
        collisions: &[Reservation],
    ) -> AvailabilityResult<()> {
        let Some(first) = collisions.first() else {
            return Ok(());
        };
        if self.has_higher_priority(collisions) {
            for reservation in collisions {
                self.forced_reallocations.insert(reservation.origin.request_id);
            }
            debug!(%resource_id, requested = %slot, count = collisions.len(), "colliding requests forced to reallocate");
            return Ok(());
        }
        if self.purpose == Some(ReservationPurpose::Maintenance) {
            for reservation in collisions {
                self.tentative_reallocations.insert(reservation.origin.request_id);
            }
            debug!(%resource_id, requested = %slot, count = collisions.len(), "colliding requests moved for maintenance");
            return Ok(());
        }
        if first.origin.purpose == ReservationPurpose::Maintenance {
            return Err(AvailabilityError::UnderMaintenance {
                resource_id,
                slot: first.slot,
            });
        }
        Err(AvailabilityError::Collision {
            resource_id,
            slot: first.slot,
        })
    }
}
