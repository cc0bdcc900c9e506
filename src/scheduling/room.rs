// Copyright (c) 2025 - Cowboy AI, Inc.
//! Free capacity of a room provider

use chrono::{DateTime, Utc};

use super::Reservation;
use crate::cache::CapabilityHandle;
use crate::domain::Slot;

/// Room provider together with its license usage in a slot
#[derive(Debug, Clone)]
pub struct AvailableRoom {
    room_provider: CapabilityHandle,
    maximum_license_count: u32,
    used_license_count: u32,
}

impl AvailableRoom {
    pub fn new(room_provider: CapabilityHandle, maximum_license_count: u32, used_license_count: u32) -> Self {
        Self {
            room_provider,
            maximum_license_count,
            used_license_count,
        }
    }

    pub fn room_provider(&self) -> &CapabilityHandle {
        &self.room_provider
    }

    pub fn maximum_license_count(&self) -> u32 {
        self.maximum_license_count
    }

    pub fn used_license_count(&self) -> u32 {
        self.used_license_count
    }

    pub fn available_license_count(&self) -> u32 {
        self.maximum_license_count.saturating_sub(self.used_license_count)
    }

    /// Share of licenses still free, `0.0` for providers without licenses
    pub fn available_ratio(&self) -> f64 {
        if self.maximum_license_count == 0 {
            return 0.0;
        }
        f64::from(self.available_license_count()) / f64::from(self.maximum_license_count)
    }
}

/// Peak number of licenses used at the same time inside `slot`
///
/// Reservations are half-open, so one ending exactly when another starts
/// never adds to the peak.
pub fn peak_license_usage(reservations: &[Reservation], slot: &Slot) -> u32 {
    let mut events: Vec<(DateTime<Utc>, i64)> = Vec::with_capacity(reservations.len() * 2);
    for reservation in reservations {
        let Some(overlap) = reservation.slot.intersection(slot) else {
            continue;
        };
        let licenses = i64::from(reservation.license_count());
        events.push((overlap.start(), licenses));
        events.push((overlap.end(), -licenses));
    }
    // Ends sort before starts at the same instant.
    events.sort_by(|left, right| left.0.cmp(&right.0).then(left.1.cmp(&right.1)));

    let mut current: i64 = 0;
    let mut peak: i64 = 0;
    for (_, delta) in events {
        current += delta;
        peak = peak.max(current);
    }
    u32::try_from(peak).unwrap_or(u32::MAX)
}
