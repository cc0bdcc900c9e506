// Copyright (c) 2025 - Cowboy AI, Inc.
//! Keyed object cache
//!
//! Plain map from store key to object. It performs no locking of its own;
//! the owning index serializes access.

use indexmap::IndexMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::trace;

use crate::domain::{Resource, ResourceId};
use crate::errors::{CacheError, CacheResult};

/// Object identified by a unique store key
pub trait Keyed {
    type Key: Copy + Eq + Hash + fmt::Debug + Into<i64>;

    /// Object kind used in error messages
    const KIND: &'static str;

    fn key(&self) -> Self::Key;
}

impl Keyed for Resource {
    type Key = ResourceId;
    const KIND: &'static str = "Resource";

    fn key(&self) -> ResourceId {
        self.id
    }
}

impl<T: Keyed> Keyed for Arc<T> {
    type Key = T::Key;
    const KIND: &'static str = T::KIND;

    fn key(&self) -> T::Key {
        self.as_ref().key()
    }
}

/// Objects keyed by their store key, in insertion order
#[derive(Debug, Clone)]
pub struct KeyedCache<T: Keyed> {
    objects: IndexMap<T::Key, T>,
}

impl<T: Keyed> Default for KeyedCache<T> {
    fn default() -> Self {
        Self {
            objects: IndexMap::new(),
        }
    }
}

impl<T: Keyed> KeyedCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.objects.get(&key)
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.objects.contains_key(&key)
    }

    pub fn all(&self) -> impl Iterator<Item = &T> {
        self.objects.values()
    }

    /// Add an object
    ///
    /// # Errors
    /// [`CacheError::DuplicateKey`] if an object with the same key is cached
    pub fn add(&mut self, object: T) -> CacheResult<()> {
        let key = object.key();
        let id: i64 = key.into();
        if self.objects.contains_key(&key) {
            return Err(CacheError::DuplicateKey { kind: T::KIND, id });
        }
        trace!(kind = T::KIND, id, "cached");
        self.objects.insert(key, object);
        Ok(())
    }

    /// Remove the object cached under `object`'s key
    ///
    /// # Errors
    /// [`CacheError::NotFound`] if nothing is cached under the key
    pub fn remove(&mut self, object: &T) -> CacheResult<T> {
        self.remove_key(object.key())
    }

    pub fn remove_key(&mut self, key: T::Key) -> CacheResult<T> {
        self.objects
            .shift_remove(&key)
            .ok_or_else(|| CacheError::NotFound {
                kind: T::KIND,
                id: key.into(),
            })
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
