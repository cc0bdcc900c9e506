// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-object reservation bookkeeping of one scheduling attempt
//!
//! Two kinds of reservations are tracked for every object (resource or
//! capability) the attempt touches:
//!
//! - **allocated** reservations were created by the attempt and make the
//!   object unavailable, although the store does not know them yet
//! - **available** reservations exist in the store but are being reused or
//!   reallocated by the attempt, so they no longer block the object

use indexmap::IndexMap;
use std::collections::HashMap;
use std::hash::Hash;

use super::Reservation;
use crate::domain::{ReservationId, Slot};

/// Tentative reservation state keyed by object id
#[derive(Debug, Clone)]
pub struct ReservationTransaction<K> {
    allocated: HashMap<K, IndexMap<ReservationId, Reservation>>,
    available: HashMap<K, IndexMap<ReservationId, Reservation>>,
}

impl<K> Default for ReservationTransaction<K> {
    fn default() -> Self {
        Self {
            allocated: HashMap::new(),
            available: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> ReservationTransaction<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reservation created by the attempt
    pub fn add_allocated(&mut self, object_id: K, reservation: Reservation) {
        self.allocated
            .entry(object_id)
            .or_default()
            .insert(reservation.id, reservation);
    }

    pub fn remove_allocated(&mut self, object_id: K, id: ReservationId) -> Option<Reservation> {
        self.allocated
            .get_mut(&object_id)
            .and_then(|reservations| reservations.shift_remove(&id))
    }

    /// Record a stored reservation the attempt may reuse
    pub fn add_available(&mut self, object_id: K, reservation: Reservation) {
        self.available
            .entry(object_id)
            .or_default()
            .insert(reservation.id, reservation);
    }

    pub fn remove_available(&mut self, object_id: K, id: ReservationId) -> Option<Reservation> {
        self.available
            .get_mut(&object_id)
            .and_then(|reservations| reservations.shift_remove(&id))
    }

    pub fn allocated(&self, object_id: K) -> impl Iterator<Item = &Reservation> {
        self.allocated
            .get(&object_id)
            .into_iter()
            .flat_map(|reservations| reservations.values())
    }

    pub fn available(&self, object_id: K) -> impl Iterator<Item = &Reservation> {
        self.available
            .get(&object_id)
            .into_iter()
            .flat_map(|reservations| reservations.values())
    }

    /// Fold the attempt's view of `object_id` into reservations read from the store
    ///
    /// Reusable reservations are dropped and the attempt's own reservations
    /// overlapping `slot` are added. Reservations already present (by id) are
    /// never added twice.
    pub fn apply_reservations(&self, object_id: K, slot: &Slot, reservations: &mut Vec<Reservation>) {
        if let Some(available) = self.available.get(&object_id) {
            reservations.retain(|reservation| !available.contains_key(&reservation.id));
        }
        if let Some(allocated) = self.allocated.get(&object_id) {
            for reservation in allocated.values() {
                if reservation.slot.overlaps(slot)
                    && !reservations.iter().any(|existing| existing.id == reservation.id)
                {
                    reservations.push(reservation.clone());
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allocated.values().all(IndexMap::is_empty)
            && self.available.values().all(IndexMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceId;
    use crate::scheduling::{ReservationOrigin, ReservationPurpose};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 19, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn slot(start: i64, end: i64) -> Slot {
        Slot::new(at(start), at(end)).unwrap()
    }

    fn reservation(id: i64, start: i64, end: i64) -> Reservation {
        Reservation::resource(id, 1, slot(start, end), ReservationOrigin::new(1, ReservationPurpose::Science))
    }

    #[test]
    fn test_apply_drops_available_and_adds_allocated() {
        let resource = ResourceId::new(1);
        let mut transaction = ReservationTransaction::new();
        transaction.add_available(resource, reservation(1, 0, 10));
        transaction.add_allocated(resource, reservation(2, 5, 8));
        transaction.add_allocated(resource, reservation(3, 20, 30));

        let mut stored = vec![reservation(1, 0, 10), reservation(4, 2, 3)];
        transaction.apply_reservations(resource, &slot(0, 10), &mut stored);

        let ids: Vec<i64> = stored.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![4, 2]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let resource = ResourceId::new(1);
        let mut transaction = ReservationTransaction::new();
        transaction.add_allocated(resource, reservation(2, 5, 8));

        let mut stored = Vec::new();
        transaction.apply_reservations(resource, &slot(0, 10), &mut stored);
        transaction.apply_reservations(resource, &slot(0, 10), &mut stored);
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn test_remove_allocated() {
        let resource = ResourceId::new(1);
        let mut transaction = ReservationTransaction::new();
        transaction.add_allocated(resource, reservation(2, 5, 8));
        assert!(transaction.remove_allocated(resource, ReservationId::new(2)).is_some());
        assert!(transaction.is_empty());
    }
}
