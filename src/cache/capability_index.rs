// Copyright (c) 2025 - Cowboy AI, Inc.
//! Capability Index
//!
//! Secondary index over the resources carrying capabilities of one
//! [`CapabilityType`]. The index keeps one bucket of capabilities per
//! resource and derives three caches from the buckets:
//!
//! - the flat list of all capabilities in allocation order
//! - the set of resource ids owning at least one capability
//! - with a [`TechnologyStrategy`], the resource ids per technology
//!
//! Every mutation marks the caches dirty; the next read rebuilds them.
//!
//! # Allocation order
//!
//! 1. Resources with an `allocation_order` come first, lower order first
//! 2. Resources without one follow
//! 3. Ties are broken by resource id, ascending
//! 4. Capabilities of one resource keep their declaration order

use indexmap::{IndexMap, IndexSet};
use parking_lot::{RwLock, RwLockUpgradableReadGuard, RwLockWriteGuard};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::domain::{
    Capability, CapabilityId, CapabilityType, Resource, ResourceId, Technology, TechnologySet,
};
use crate::errors::{CacheError, CacheResult};

/// Capability addressed through its owning resource
#[derive(Debug, Clone)]
pub struct CapabilityHandle {
    resource: Arc<Resource>,
    position: usize,
}

impl CapabilityHandle {
    /// Handle to the capability at `position` of `resource`
    pub fn new(resource: Arc<Resource>, position: usize) -> Option<Self> {
        (position < resource.capabilities.len()).then_some(Self { resource, position })
    }

    /// Handle to the capability with `capability_id`
    pub fn find(resource: Arc<Resource>, capability_id: CapabilityId) -> Option<Self> {
        let position = resource.capability_position(capability_id)?;
        Some(Self { resource, position })
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn shared_resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    pub fn resource_id(&self) -> ResourceId {
        self.resource.id
    }

    pub fn capability(&self) -> &Capability {
        &self.resource.capabilities[self.position]
    }

    pub fn capability_id(&self) -> CapabilityId {
        self.capability().id
    }

    pub fn capability_type(&self) -> CapabilityType {
        self.capability().capability_type()
    }
}

/// Derives the technologies a capability is indexed under
pub trait TechnologyStrategy: fmt::Debug + Send + Sync {
    fn technologies(&self, resource: &Resource) -> TechnologySet;
}

/// Indexes device capabilities under every technology of the owning device
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceTechnologies;

impl TechnologyStrategy for DeviceTechnologies {
    fn technologies(&self, resource: &Resource) -> TechnologySet {
        resource.technologies().cloned().unwrap_or_default()
    }
}

fn allocation_order(left: &CapabilityHandle, right: &CapabilityHandle) -> Ordering {
    let by_order = match (left.resource().allocation_order, right.resource().allocation_order) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_order.then_with(|| left.resource_id().cmp(&right.resource_id()))
}

#[derive(Debug, Default)]
struct DerivedCache {
    built: bool,
    ordered: Vec<CapabilityHandle>,
    resource_ids: IndexSet<ResourceId>,
    by_technology: HashMap<Technology, IndexSet<ResourceId>>,
}

/// Index of the capabilities of one type
#[derive(Debug)]
pub struct CapabilityIndex {
    capability_type: CapabilityType,
    strategy: Option<Box<dyn TechnologyStrategy>>,
    buckets: IndexMap<ResourceId, Vec<CapabilityHandle>>,
    cache: RwLock<DerivedCache>,
}

impl CapabilityIndex {
    /// Index without technology awareness
    pub fn new(capability_type: CapabilityType) -> Self {
        Self {
            capability_type,
            strategy: None,
            buckets: IndexMap::new(),
            cache: RwLock::default(),
        }
    }

    /// Index maintaining per-technology resource ids
    pub fn with_strategy(capability_type: CapabilityType, strategy: Box<dyn TechnologyStrategy>) -> Self {
        Self {
            strategy: Some(strategy),
            ..Self::new(capability_type)
        }
    }

    /// Index suited for `capability_type`
    ///
    /// Device capabilities are indexed by the technologies of their device.
    pub fn for_type(capability_type: CapabilityType) -> Self {
        if capability_type.is_device_capability() {
            Self::with_strategy(capability_type, Box::new(DeviceTechnologies))
        } else {
            Self::new(capability_type)
        }
    }

    pub fn capability_type(&self) -> CapabilityType {
        self.capability_type
    }

    pub fn is_technology_aware(&self) -> bool {
        self.strategy.is_some()
    }

    /// Append a capability to its resource's bucket
    ///
    /// # Errors
    /// [`CacheError::TypeMismatch`] if the capability has a different type
    pub fn add_capability(&mut self, capability: CapabilityHandle) -> CacheResult<()> {
        let actual = capability.capability_type();
        if actual != self.capability_type {
            return Err(CacheError::TypeMismatch {
                expected: self.capability_type,
                actual,
            });
        }
        self.buckets
            .entry(capability.resource_id())
            .or_default()
            .push(capability);
        self.invalidate();
        Ok(())
    }

    /// Drop every capability of `resource_id`
    pub fn remove_capability(&mut self, resource_id: ResourceId) -> Option<Vec<CapabilityHandle>> {
        let removed = self.buckets.shift_remove(&resource_id);
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.cache.get_mut().built = false;
    }

    fn rebuild(&self, cache: &mut DerivedCache) {
        let mut ordered: Vec<CapabilityHandle> = self.buckets.values().flatten().cloned().collect();
        ordered.sort_by(allocation_order);

        cache.resource_ids = ordered.iter().map(CapabilityHandle::resource_id).collect();
        cache.by_technology.clear();
        if let Some(strategy) = &self.strategy {
            for capability in &ordered {
                for technology in strategy.technologies(capability.resource()) {
                    cache
                        .by_technology
                        .entry(technology)
                        .or_default()
                        .insert(capability.resource_id());
                }
            }
        }
        cache.ordered = ordered;
        cache.built = true;
        trace!(
            capability_type = %self.capability_type,
            capabilities = cache.ordered.len(),
            "capability index rebuilt"
        );
    }

    fn with_cache<R>(&self, read: impl FnOnce(&DerivedCache) -> R) -> R {
        {
            let guard = self.cache.read();
            if guard.built {
                return read(&*guard);
            }
        }
        let guard = self.cache.upgradable_read();
        if guard.built {
            return read(&*guard);
        }
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        self.rebuild(&mut *guard);
        let guard = RwLockWriteGuard::downgrade(guard);
        read(&*guard)
    }

    /// Capabilities in allocation order
    pub fn capabilities(&self) -> Vec<CapabilityHandle> {
        self.with_cache(|cache| cache.ordered.clone())
    }

    /// Resources owning at least one capability
    pub fn resource_ids(&self) -> HashSet<ResourceId> {
        self.with_cache(|cache| cache.resource_ids.iter().copied().collect())
    }

    /// Resources whose capability is indexed under `technology`
    ///
    /// Empty for unknown technologies and for indices without a strategy.
    pub fn device_resource_ids(&self, technology: Technology) -> HashSet<ResourceId> {
        self.with_cache(|cache| {
            cache
                .by_technology
                .get(&technology)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default()
        })
    }

    /// Number of indexed capabilities
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceInfo;
    use pretty_assertions::assert_eq;

    fn device(id: i64, order: Option<i32>, technologies: &[Technology]) -> Arc<Resource> {
        let mut builder = Resource::builder(id, format!("mcu {id}"), "admin")
            .device(DeviceInfo::new(technologies.iter().copied()))
            .capability(Capability::room_provider(id * 10, 10));
        if let Some(order) = order {
            builder = builder.allocation_order(order);
        }
        Arc::new(builder.build().unwrap())
    }

    fn index_of(resources: &[Arc<Resource>]) -> CapabilityIndex {
        let mut index = CapabilityIndex::for_type(CapabilityType::RoomProvider);
        for resource in resources {
            index
                .add_capability(CapabilityHandle::new(resource.clone(), 0).unwrap())
                .unwrap();
        }
        index
    }

    fn ids(index: &CapabilityIndex) -> Vec<i64> {
        index
            .capabilities()
            .iter()
            .map(|capability| capability.resource_id().get())
            .collect()
    }

    #[test]
    fn test_order_prefers_allocation_order_then_id() {
        let index = index_of(&[
            device(5, None, &[Technology::H323]),
            device(4, Some(2), &[Technology::H323]),
            device(3, None, &[Technology::H323]),
            device(9, Some(1), &[Technology::H323]),
        ]);
        assert_eq!(ids(&index), vec![9, 4, 3, 5]);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut index = CapabilityIndex::new(CapabilityType::AliasProvider);
        let result = index.add_capability(CapabilityHandle::new(device(1, None, &[Technology::Sip]), 0).unwrap());
        assert_eq!(
            result,
            Err(CacheError::TypeMismatch {
                expected: CapabilityType::AliasProvider,
                actual: CapabilityType::RoomProvider,
            })
        );
    }

    #[test]
    fn test_caches_follow_mutations() {
        let mut index = index_of(&[
            device(1, None, &[Technology::H323]),
            device(2, None, &[Technology::H323, Technology::Sip]),
        ]);
        assert_eq!(index.device_resource_ids(Technology::Sip), [ResourceId::new(2)].into());
        assert_eq!(index.resource_ids().len(), 2);

        index.remove_capability(ResourceId::new(2));
        assert!(index.device_resource_ids(Technology::Sip).is_empty());
        assert_eq!(ids(&index), vec![1]);
        assert!(index.device_resource_ids(Technology::Pexip).is_empty());
    }

    #[test]
    fn test_plain_index_has_no_technology_map() {
        let index = CapabilityIndex::new(CapabilityType::RoomProvider);
        assert!(!index.is_technology_aware());
        assert!(CapabilityIndex::for_type(CapabilityType::Terminal).is_technology_aware());
    }
}
