// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reservation store
//!
//! The durable store lives outside this crate. Availability checks only need
//! the committed reservations overlapping a slot; tentative reservations of
//! an in-flight scheduling attempt are tracked by the transaction instead.

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use super::Reservation;
use crate::domain::{CapabilityId, ReservationId, ResourceId, Slot};
use crate::errors::AvailabilityResult;

/// Read access to committed reservations
///
/// Independent scheduling attempts may query concurrently; every
/// implementation must give each of them a consistent view.
pub trait ReservationStore: Send + Sync {
    /// Whole-resource reservations of `resource_id` overlapping `slot`
    fn list_resource_reservations_in_interval(
        &self,
        resource_id: ResourceId,
        slot: &Slot,
    ) -> AvailabilityResult<Vec<Reservation>>;

    /// Reservations of `capability_id` (rooms, recordings, alias values) overlapping `slot`
    fn list_capability_reservations_in_interval(
        &self,
        capability_id: CapabilityId,
        slot: &Slot,
    ) -> AvailabilityResult<Vec<Reservation>>;
}

/// Store keeping committed reservations in memory, in commit order
#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    reservations: RwLock<IndexMap<ReservationId, Reservation>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a reservation, replacing any reservation with the same id
    pub fn insert(&self, reservation: Reservation) -> Option<Reservation> {
        debug!(
            reservation_id = %reservation.id,
            resource_id = %reservation.resource_id,
            slot = %reservation.slot,
            "reservation committed"
        );
        self.reservations.write().insert(reservation.id, reservation)
    }

    pub fn remove(&self, id: ReservationId) -> Option<Reservation> {
        self.reservations.write().shift_remove(&id)
    }

    pub fn get(&self, id: ReservationId) -> Option<Reservation> {
        self.reservations.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.reservations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.read().is_empty()
    }

    fn select(&self, slot: &Slot, include: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
        self.reservations
            .read()
            .values()
            .filter(|reservation| include(reservation) && reservation.slot.overlaps(slot))
            .cloned()
            .collect()
    }
}

impl ReservationStore for InMemoryReservationStore {
    fn list_resource_reservations_in_interval(
        &self,
        resource_id: ResourceId,
        slot: &Slot,
    ) -> AvailabilityResult<Vec<Reservation>> {
        Ok(self.select(slot, |reservation| {
            reservation.resource_id == resource_id && reservation.is_resource_reservation()
        }))
    }

    fn list_capability_reservations_in_interval(
        &self,
        capability_id: CapabilityId,
        slot: &Slot,
    ) -> AvailabilityResult<Vec<Reservation>> {
        Ok(self.select(slot, |reservation| {
            reservation.capability_id == Some(capability_id)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::{ReservationOrigin, ReservationPurpose};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 19, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn slot(start: i64, end: i64) -> Slot {
        Slot::new(at(start), at(end)).unwrap()
    }

    #[test]
    fn test_lists_only_overlapping_resource_reservations() {
        let store = InMemoryReservationStore::new();
        let origin = ReservationOrigin::new(1, ReservationPurpose::Science);
        store.insert(Reservation::resource(1, 10, slot(0, 5), origin));
        store.insert(Reservation::resource(2, 10, slot(5, 10), origin));
        store.insert(Reservation::resource(3, 11, slot(0, 10), origin));
        store.insert(Reservation::room(4, 10, 100, slot(0, 10), 5, origin));

        let found = store
            .list_resource_reservations_in_interval(ResourceId::new(10), &slot(4, 5))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ReservationId::new(1));

        let rooms = store
            .list_capability_reservations_in_interval(CapabilityId::new(100), &slot(4, 5))
            .unwrap();
        assert_eq!(rooms.len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = InMemoryReservationStore::new();
        let origin = ReservationOrigin::new(1, ReservationPurpose::Science);
        store.insert(Reservation::resource(1, 10, slot(0, 5), origin));
        assert!(store.remove(ReservationId::new(1)).is_some());
        assert!(store.is_empty());
    }
}
