// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Index
//!
//! Top-level in-memory index of resources. It owns the keyed resource cache,
//! the device topology and one [`CapabilityIndex`] per capability type, and
//! runs the availability checks scheduling attempts rely on.
//!
//! # Concurrency
//!
//! All state sits behind one [`RwLock`]. Adding or removing a resource
//! touches the resource cache, the topology and several capability indices
//! under a single write lock, so readers never observe a half-registered
//! resource. Lookups and availability checks share the read lock; a check
//! holds it for its whole duration, so resources cannot be added or removed
//! in the middle of a check.
//!
//! # Availability
//!
//! The core check of a resource is, in order:
//!
//! 1. the resource must be allocatable
//! 2. owner-restricted attempts of non-administrators must own the resource
//! 3. committed reservations of the resource overlapping the slot are read
//!    from the store and folded through the attempt's transaction
//! 4. the transaction decides whether the remaining reservations collide
//!
//! Attempts restricted by maximum future additionally require the slot to
//! end no later than the resource's (or capability's) horizon.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, debug_span, info};

use super::{CapabilityHandle, CapabilityIndex, DeviceTopology, KeyedCache};
use crate::config::AllocationConfig;
use crate::domain::{
    AliasType, CapabilityId, CapabilityType, DateTimeSpecification, Resource, ResourceId, Slot,
    TechnologySet,
};
use crate::errors::{AvailabilityError, AvailabilityResult, CacheError, CacheResult};
use crate::scheduling::{peak_license_usage, AvailableRoom, SchedulingTransaction};

#[derive(Debug, Default)]
struct IndexState {
    resources: KeyedCache<Arc<Resource>>,
    topology: DeviceTopology,
    capabilities: HashMap<CapabilityType, CapabilityIndex>,
}

impl IndexState {
    fn register(&mut self, resource: Arc<Resource>) -> CacheResult<()> {
        if self.resources.contains(resource.id) {
            return Err(CacheError::DuplicateKey {
                kind: "Resource",
                id: resource.id.get(),
            });
        }
        self.topology.add_resource(&resource);
        for position in 0..resource.capabilities.len() {
            let Some(handle) = CapabilityHandle::new(resource.clone(), position) else {
                continue;
            };
            self.capabilities
                .entry(handle.capability_type())
                .or_insert_with_key(|capability_type| CapabilityIndex::for_type(*capability_type))
                .add_capability(handle)?;
        }
        self.resources.add(resource)
    }

    fn unregister(&mut self, resource_id: ResourceId) -> CacheResult<Arc<Resource>> {
        let Some(resource) = self.resources.get(resource_id).cloned() else {
            return Err(CacheError::NotFound {
                kind: "Resource",
                id: resource_id.get(),
            });
        };
        let types: HashSet<CapabilityType> = resource
            .capabilities
            .iter()
            .map(|capability| capability.capability_type())
            .collect();
        for capability_type in types {
            if let Some(index) = self.capabilities.get_mut(&capability_type) {
                index.remove_capability(resource_id);
            }
        }
        self.topology.remove_resource(&resource);
        self.resources.remove(&resource)
    }

    fn device_capabilities(
        &self,
        capability_type: CapabilityType,
        technologies: Option<&TechnologySet>,
    ) -> Vec<CapabilityHandle> {
        let Some(index) = self.capabilities.get(&capability_type) else {
            return Vec::new();
        };
        let capabilities = index.capabilities();
        match technologies {
            Some(technologies) if !technologies.is_empty() => capabilities
                .into_iter()
                .filter(|capability| capability.resource().supports_any(technologies))
                .collect(),
            _ => capabilities,
        }
    }
}

/// In-memory index of resources and their capabilities
#[derive(Debug, Default)]
pub struct ResourceIndex {
    state: RwLock<IndexState>,
    default_maximum_future: Option<DateTimeSpecification>,
}

impl ResourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AllocationConfig) -> Self {
        Self {
            state: RwLock::default(),
            default_maximum_future: config.default_resource_maximum_future,
        }
    }

    /// Horizon inherited by resources without their own
    pub fn default_maximum_future(&self) -> Option<&DateTimeSpecification> {
        self.default_maximum_future.as_ref()
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Register a resource and index all of its capabilities
    ///
    /// # Errors
    /// [`CacheError::DuplicateKey`] if a resource with the same id is cached
    pub fn add_resource(&self, resource: Resource) -> CacheResult<Arc<Resource>> {
        let resource = Arc::new(resource);
        let mut state = self.state.write();
        state.register(resource.clone())?;
        debug!(
            resource_id = %resource.id,
            capabilities = resource.capabilities.len(),
            "resource added to index"
        );
        Ok(resource)
    }

    /// Drop a resource and its capabilities from every index
    ///
    /// # Errors
    /// [`CacheError::NotFound`] if the resource is not cached
    pub fn remove_resource(&self, resource_id: ResourceId) -> CacheResult<Arc<Resource>> {
        let removed = self.state.write().unregister(resource_id)?;
        debug!(%resource_id, "resource removed from index");
        Ok(removed)
    }

    /// Replace a cached resource with a new version, atomically
    pub fn update_resource(&self, resource: Resource) -> CacheResult<Arc<Resource>> {
        let resource = Arc::new(resource);
        let mut state = self.state.write();
        state.unregister(resource.id)?;
        state.register(resource.clone())?;
        debug!(resource_id = %resource.id, "resource updated in index");
        Ok(resource)
    }

    /// Reset every index
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.resources.clear();
        state.topology.clear();
        state.capabilities.clear();
        info!("resource index cleared");
    }

    // ---------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------

    pub fn resource(&self, resource_id: ResourceId) -> Option<Arc<Resource>> {
        self.state.read().resources.get(resource_id).cloned()
    }

    /// All resources in registration order
    pub fn resources(&self) -> Vec<Arc<Resource>> {
        self.state.read().resources.all().cloned().collect()
    }

    pub fn contains(&self, resource_id: ResourceId) -> bool {
        self.state.read().resources.contains(resource_id)
    }

    pub fn len(&self) -> usize {
        self.state.read().resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().resources.is_empty()
    }

    /// Snapshot of the parent/child tree and device technologies
    pub fn device_topology(&self) -> DeviceTopology {
        self.state.read().topology.clone()
    }

    pub fn capability_handle(
        &self,
        resource_id: ResourceId,
        capability_id: CapabilityId,
    ) -> Option<CapabilityHandle> {
        let resource = self.resource(resource_id)?;
        CapabilityHandle::find(resource, capability_id)
    }

    /// Capabilities of `capability_type` in allocation order
    pub fn capabilities_of_type(&self, capability_type: CapabilityType) -> Vec<CapabilityHandle> {
        self.state
            .read()
            .capabilities
            .get(&capability_type)
            .map(CapabilityIndex::capabilities)
            .unwrap_or_default()
    }

    /// Capabilities of `capability_type` whose device supports any of `technologies`
    ///
    /// `None` or an empty set disables the filter.
    pub fn device_capabilities_of_type(
        &self,
        capability_type: CapabilityType,
        technologies: Option<&TechnologySet>,
    ) -> Vec<CapabilityHandle> {
        self.state
            .read()
            .device_capabilities(capability_type, technologies)
    }

    /// Resources owning `capability_type` and supporting every technology requested
    ///
    /// `None` or an empty set returns every resource owning the capability.
    pub fn resource_ids_with_capability(
        &self,
        capability_type: CapabilityType,
        technologies: Option<&TechnologySet>,
    ) -> HashSet<ResourceId> {
        let state = self.state.read();
        let Some(index) = state.capabilities.get(&capability_type) else {
            return HashSet::new();
        };
        let technologies = match technologies {
            Some(technologies) if !technologies.is_empty() => technologies,
            _ => return index.resource_ids(),
        };

        let mut result: Option<HashSet<ResourceId>> = None;
        for technology in technologies {
            let ids = index.device_resource_ids(*technology);
            let narrowed = match result {
                Some(previous) => previous.intersection(&ids).copied().collect(),
                None => ids,
            };
            if narrowed.is_empty() {
                return narrowed;
            }
            result = Some(narrowed);
        }
        result.unwrap_or_default()
    }

    /// Alias namespaces providing any of `technologies` and any of `alias_types`
    ///
    /// `None` or an empty set disables the corresponding filter.
    pub fn alias_namespaces(
        &self,
        technologies: Option<&TechnologySet>,
        alias_types: Option<&HashSet<AliasType>>,
    ) -> Vec<CapabilityHandle> {
        self.capabilities_of_type(CapabilityType::AliasProvider)
            .into_iter()
            .filter(|handle| {
                let Some(namespace) = handle.capability().alias_namespace() else {
                    return false;
                };
                let technology_ok = match technologies {
                    Some(technologies) if !technologies.is_empty() => {
                        namespace.provides_technology(handle.resource(), technologies)
                    }
                    _ => true,
                };
                let alias_type_ok = match alias_types {
                    Some(alias_types) if !alias_types.is_empty() => {
                        namespace.provides_alias_type(alias_types)
                    }
                    _ => true,
                };
                technology_ok && alias_type_ok
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Availability
    // ---------------------------------------------------------------------

    fn check_core<T>(&self, resource: &Resource, slot: &Slot, transaction: &mut T) -> AvailabilityResult<()>
    where
        T: SchedulingTransaction + ?Sized,
    {
        if !resource.allocatable {
            return Err(AvailabilityError::NotAllocatable(resource.id));
        }
        if transaction.is_owner_restricted()
            && !transaction.is_administrator()
            && !transaction.contains_created_by_user_id(resource)
        {
            return Err(AvailabilityError::NotOwner(resource.id));
        }

        let mut reservations = transaction
            .reservation_store()
            .list_resource_reservations_in_interval(resource.id, slot)?;
        transaction
            .resource_reservations()
            .apply_reservations(resource.id, slot, &mut reservations);
        transaction.detect_collisions(resource.id, slot, &reservations)
    }

    fn check_horizon<T>(
        &self,
        resource_id: ResourceId,
        horizon: Option<DateTime<Utc>>,
        slot: &Slot,
        transaction: &T,
    ) -> AvailabilityResult<()>
    where
        T: SchedulingTransaction + ?Sized,
    {
        if !transaction.is_maximum_future_and_duration_restricted() {
            return Ok(());
        }
        match horizon {
            Some(horizon) if slot.end() > horizon => {
                Err(AvailabilityError::NotAvailableInFuture { resource_id, horizon })
            }
            _ => Ok(()),
        }
    }

    fn check_resource<T>(&self, resource: &Resource, slot: &Slot, transaction: &mut T) -> AvailabilityResult<()>
    where
        T: SchedulingTransaction + ?Sized,
    {
        self.check_core(resource, slot, transaction)?;
        let horizon = resource.maximum_future_date_time(
            transaction.minimum_date_time(),
            self.default_maximum_future.as_ref(),
        );
        self.check_horizon(resource.id, horizon, slot, transaction)
    }

    fn check_capability<T>(
        &self,
        capability: &CapabilityHandle,
        slot: &Slot,
        transaction: &mut T,
    ) -> AvailabilityResult<()>
    where
        T: SchedulingTransaction + ?Sized,
    {
        let resource = capability.resource();
        self.check_core(resource, slot, transaction)?;
        let horizon = capability.capability().maximum_future_date_time(
            resource,
            transaction.minimum_date_time(),
            self.default_maximum_future.as_ref(),
        );
        self.check_horizon(resource.id, horizon, slot, transaction)
    }

    fn check_tree<T>(
        &self,
        state: &IndexState,
        resource_id: ResourceId,
        skipped: ResourceId,
        slot: &Slot,
        transaction: &mut T,
        visited: &mut HashSet<ResourceId>,
    ) -> AvailabilityResult<()>
    where
        T: SchedulingTransaction + ?Sized,
    {
        if resource_id == skipped
            || !visited.insert(resource_id)
            || transaction.contains_referenced_resource(resource_id)
        {
            return Ok(());
        }
        if let Some(resource) = state.resources.get(resource_id) {
            self.check_resource(resource, slot, transaction)?;
        }
        for child in state.topology.children_of(resource_id) {
            self.check_tree(state, *child, skipped, slot, transaction, visited)?;
        }
        Ok(())
    }

    /// Check that `resource` can be allocated in `slot`
    ///
    /// # Errors
    /// - [`AvailabilityError::NotAllocatable`] for non-allocatable resources
    /// - [`AvailabilityError::NotOwner`] when an owner-restricted attempt does not own it
    /// - [`AvailabilityError::Collision`] / [`AvailabilityError::UnderMaintenance`] for colliding reservations
    /// - [`AvailabilityError::NotAvailableInFuture`] when the slot ends after the horizon
    pub fn check_resource_available<T>(
        &self,
        resource: &Resource,
        slot: &Slot,
        transaction: &mut T,
    ) -> AvailabilityResult<()>
    where
        T: SchedulingTransaction + ?Sized,
    {
        let _span = debug_span!(
            "check_resource_available",
            transaction_id = %transaction.id(),
            resource_id = %resource.id
        )
        .entered();
        let _state = self.state.read();
        self.check_resource(resource, slot, transaction)
            .inspect_err(|error| debug!(%error, "resource not available"))
    }

    /// Check that the owning resource of `capability` is available in `slot`
    ///
    /// The horizon is the capability's own, falling back to the resource's.
    pub fn check_capability_available<T>(
        &self,
        capability: &CapabilityHandle,
        slot: &Slot,
        transaction: &mut T,
    ) -> AvailabilityResult<()>
    where
        T: SchedulingTransaction + ?Sized,
    {
        let _span = debug_span!(
            "check_capability_available",
            transaction_id = %transaction.id(),
            capability_id = %capability.capability_id()
        )
        .entered();
        let _state = self.state.read();
        self.check_capability(capability, slot, transaction)
            .inspect_err(|error| debug!(%error, "capability not available"))
    }

    /// Check `resource` and every other resource of its tree
    ///
    /// Allocating one part of a shared physical unit requires the top-most
    /// ancestor and all of its descendants to be free as well. Resources the
    /// transaction already references are treated as available.
    pub fn check_resource_available_by_parent<T>(
        &self,
        resource: &Resource,
        slot: &Slot,
        transaction: &mut T,
    ) -> AvailabilityResult<()>
    where
        T: SchedulingTransaction + ?Sized,
    {
        let _span = debug_span!(
            "check_resource_available_by_parent",
            transaction_id = %transaction.id(),
            resource_id = %resource.id
        )
        .entered();
        let state = self.state.read();
        self.check_resource(resource, slot, transaction)?;

        let root = state.topology.root_of(resource.id);
        let mut visited = HashSet::new();
        self.check_tree(&state, root, resource.id, slot, transaction, &mut visited)
            .inspect_err(|error| debug!(%error, "resource tree not available"))
    }

    pub fn is_resource_available<T>(&self, resource: &Resource, slot: &Slot, transaction: &mut T) -> bool
    where
        T: SchedulingTransaction + ?Sized,
    {
        self.check_resource_available(resource, slot, transaction).is_ok()
    }

    pub fn is_capability_available<T>(
        &self,
        capability: &CapabilityHandle,
        slot: &Slot,
        transaction: &mut T,
    ) -> bool
    where
        T: SchedulingTransaction + ?Sized,
    {
        self.check_capability_available(capability, slot, transaction).is_ok()
    }

    pub fn is_resource_available_by_parent<T>(
        &self,
        resource: &Resource,
        slot: &Slot,
        transaction: &mut T,
    ) -> bool
    where
        T: SchedulingTransaction + ?Sized,
    {
        self.check_resource_available_by_parent(resource, slot, transaction)
            .is_ok()
    }

    /// Free licenses of a room provider (or recording capability) in `slot`
    ///
    /// When the owning resource is not available every license counts as used.
    ///
    /// # Errors
    /// Only reservation store failures are reported.
    pub fn available_room<T>(
        &self,
        room_provider: &CapabilityHandle,
        slot: &Slot,
        transaction: &mut T,
    ) -> AvailabilityResult<AvailableRoom>
    where
        T: SchedulingTransaction + ?Sized,
    {
        let maximum = room_provider.capability().license_count().unwrap_or(0);
        match self.check_resource_available(room_provider.resource(), slot, transaction) {
            Ok(()) => {}
            Err(AvailabilityError::Store(message)) => return Err(AvailabilityError::Store(message)),
            Err(_) => return Ok(AvailableRoom::new(room_provider.clone(), maximum, maximum)),
        }

        let capability_id = room_provider.capability_id();
        let mut reservations = transaction
            .reservation_store()
            .list_capability_reservations_in_interval(capability_id, slot)?;
        transaction
            .capability_reservations()
            .apply_reservations(capability_id, slot, &mut reservations);
        let used = peak_license_usage(&reservations, slot);
        Ok(AvailableRoom::new(room_provider.clone(), maximum, used))
    }

    /// Room providers supporting `technologies` with at least `license_count` free licenses
    ///
    /// Candidates are returned in allocation order.
    pub fn find_available_rooms<T>(
        &self,
        slot: &Slot,
        license_count: u32,
        technologies: Option<&TechnologySet>,
        transaction: &mut T,
    ) -> AvailabilityResult<Vec<AvailableRoom>>
    where
        T: SchedulingTransaction + ?Sized,
    {
        let mut rooms = Vec::new();
        for candidate in self.device_capabilities_of_type(CapabilityType::RoomProvider, technologies) {
            let room = self.available_room(&candidate, slot, transaction)?;
            if room.available_license_count() >= license_count {
                rooms.push(room);
            }
        }
        Ok(rooms)
    }
}
