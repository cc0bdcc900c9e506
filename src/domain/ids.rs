// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identifier Value Objects
//!
//! Persisted entities are identified by the `long` keys assigned by the
//! external store. The newtypes keep resource, capability and reservation
//! keys from being mixed up in the indices.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! long_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a store-assigned key
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Raw key value
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

long_id!(
    /// Identity of a [`Resource`](super::Resource)
    ResourceId,
    "r"
);
long_id!(
    /// Identity of a [`Capability`](super::Capability)
    CapabilityId,
    "c"
);
long_id!(
    /// Identity of a committed or tentative reservation
    ReservationId,
    "rsv"
);
long_id!(
    /// Identity of the reservation request a reservation was allocated for
    ReservationRequestId,
    "req"
);

/// Identity of a user as provided by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
