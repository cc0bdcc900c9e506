// Copyright (c) 2025 - Cowboy AI, Inc.
//! Scheduling collaborators
//!
//! The resource index checks availability against:
//!
//! - a [`ReservationStore`] holding committed reservations
//! - a [`SchedulingTransaction`] tracking what the current attempt already
//!   allocated and deciding how collisions are resolved
//! - an [`Authorization`] capability answering administrator and ownership
//!   questions for owner-restricted attempts

pub mod authorization;
pub mod reservation;
pub mod reservation_transaction;
pub mod room;
pub mod store;
pub mod transaction;

pub use authorization::{Authorization, ResourceOwners, StaticAuthorization};
pub use reservation::{Reservation, ReservationKind, ReservationOrigin, ReservationPurpose};
pub use reservation_transaction::ReservationTransaction;
pub use room::{peak_license_usage, AvailableRoom};
pub use store::{InMemoryReservationStore, ReservationStore};
pub use transaction::{SchedulingContext, SchedulingTransaction};
