// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Resource Index
//!
//! Uniqueness of cached resources, consistency of the capability indices,
//! deterministic allocation order and room capacity bounds.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::cmp::Ordering;

use cim_resource_allocation::domain::{
    Capability, CapabilityType, DeviceInfo, Resource, ResourceId, Slot, Technology,
};
use cim_resource_allocation::scheduling::{
    peak_license_usage, Reservation, ReservationOrigin, ReservationPurpose,
};
use cim_resource_allocation::{CacheError, ResourceIndex};

// ============================================================================
// Generators
// ============================================================================

fn at(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 19, 0, 0, 0).unwrap() + Duration::hours(hours)
}

fn room_provider(id: i64, allocation_order: Option<i32>) -> Resource {
    let mut builder = Resource::builder(id, format!("mcu-{id}"), "owner")
        .device(DeviceInfo::new([Technology::H323]))
        .capability(Capability::room_provider(id * 10, 10));
    if let Some(order) = allocation_order {
        builder = builder.allocation_order(order);
    }
    builder.build().unwrap()
}

/// Distinct resource ids in arbitrary order
fn resource_ids() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::hash_set(1i64..10_000, 1..30)
        .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

/// Resources with optional allocation orders, in arbitrary insertion order
fn ordered_resources() -> impl Strategy<Value = Vec<(i64, Option<i32>)>> {
    prop::collection::vec(prop::option::of(-5i32..5), 1..30)
        .prop_map(|orders| {
            orders
                .into_iter()
                .enumerate()
                .map(|(position, order)| (position as i64 + 1, order))
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

/// Room reservations inside `[0, 100)` hours
fn room_reservations() -> impl Strategy<Value = Vec<Reservation>> {
    prop::collection::vec((0i64..99, 1i64..50, 1u32..20), 0..20).prop_map(|rooms| {
        rooms
            .into_iter()
            .enumerate()
            .map(|(id, (start, length, licenses))| {
                let end = (start + length).min(100);
                Reservation::room(
                    id as i64,
                    1,
                    10,
                    Slot::new(at(start), at(end)).unwrap(),
                    licenses,
                    ReservationOrigin::new(id as i64, ReservationPurpose::Science),
                )
            })
            .collect()
    })
}

fn allocation_order(left: &(i64, Option<i32>), right: &(i64, Option<i32>)) -> Ordering {
    match (left.1, right.1) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then(left.0.cmp(&right.0))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: every resource is cached at most once
    #[test]
    fn prop_resources_are_unique(ids in resource_ids()) {
        let index = ResourceIndex::new();
        for id in &ids {
            index.add_resource(room_provider(*id, None)).unwrap();
            prop_assert_eq!(
                index.add_resource(room_provider(*id, None)).unwrap_err(),
                CacheError::DuplicateKey { kind: "Resource", id: *id }
            );
        }
        prop_assert_eq!(index.len(), ids.len());

        for id in &ids {
            index.remove_resource(ResourceId::new(*id)).unwrap();
            prop_assert_eq!(
                index.remove_resource(ResourceId::new(*id)).unwrap_err(),
                CacheError::NotFound { kind: "Resource", id: *id }
            );
        }
        prop_assert!(index.is_empty());
    }

    /// Property: the capability index mirrors the registered resources
    #[test]
    fn prop_capability_index_is_consistent(ids in resource_ids(), removed in any::<prop::sample::Index>()) {
        let index = ResourceIndex::new();
        for id in &ids {
            index.add_resource(room_provider(*id, None)).unwrap();
        }

        let handles = index.capabilities_of_type(CapabilityType::RoomProvider);
        prop_assert_eq!(handles.len(), ids.len());
        for handle in &handles {
            prop_assert_eq!(handle.capability_id().get(), handle.resource_id().get() * 10);
        }

        let removed = ResourceId::new(ids[removed.index(ids.len())]);
        index.remove_resource(removed).unwrap();
        prop_assert_eq!(
            index.capabilities_of_type(CapabilityType::RoomProvider).len(),
            ids.len() - 1
        );
        prop_assert!(!index
            .resource_ids_with_capability(CapabilityType::RoomProvider, None)
            .contains(&removed));
    }

    /// Property: capabilities come out in allocation order regardless of insertion order
    #[test]
    fn prop_allocation_order_is_deterministic(resources in ordered_resources()) {
        let index = ResourceIndex::new();
        for (id, order) in &resources {
            index.add_resource(room_provider(*id, *order)).unwrap();
        }

        let mut expected = resources.clone();
        expected.sort_by(allocation_order);
        let expected: Vec<i64> = expected.into_iter().map(|(id, _)| id).collect();
        let actual: Vec<i64> = index
            .capabilities_of_type(CapabilityType::RoomProvider)
            .iter()
            .map(|handle| handle.resource_id().get())
            .collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: the peak never exceeds the total and never grows when the slot shrinks
    #[test]
    fn prop_peak_usage_is_bounded(rooms in room_reservations(), start in 0i64..99, length in 1i64..100) {
        let whole = Slot::new(at(0), at(100)).unwrap();
        let part = Slot::new(at(start), at((start + length).min(100))).unwrap();

        let total: u32 = rooms.iter().map(Reservation::license_count).sum();
        let whole_peak = peak_license_usage(&rooms, &whole);
        let part_peak = peak_license_usage(&rooms, &part);

        prop_assert!(whole_peak <= total);
        prop_assert!(part_peak <= whole_peak);
    }
}

// ============================================================================
// Unit Tests for Generators
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_resources_sort_first() {
        let mut resources = vec![(1, None), (2, Some(2)), (3, Some(1))];
        resources.sort_by(allocation_order);
        assert_eq!(resources, vec![(3, Some(1)), (2, Some(2)), (1, None)]);
    }
}
