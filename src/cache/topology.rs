// Copyright (c) 2025 - Cowboy AI, Inc.
//! Device topology
//!
//! Parent/child tree over cached resources plus the technology sets of the
//! device resources. Children are derived from each resource's `parent_id`
//! and kept in insertion order, so resources may be loaded in any order.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::domain::{technology, Resource, ResourceId, TechnologySet};

#[derive(Debug, Clone, Default)]
pub struct DeviceTopology {
    devices: IndexMap<ResourceId, TechnologySet>,
    parents: HashMap<ResourceId, ResourceId>,
    children: HashMap<ResourceId, Vec<ResourceId>>,
}

impl DeviceTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&mut self, resource: &Resource) {
        if let Some(technologies) = resource.technologies() {
            self.devices.insert(resource.id, technologies.clone());
        }
        if let Some(parent_id) = resource.parent_id {
            self.parents.insert(resource.id, parent_id);
            self.children.entry(parent_id).or_default().push(resource.id);
        }
    }

    pub fn remove_resource(&mut self, resource: &Resource) {
        self.devices.shift_remove(&resource.id);
        if let Some(parent_id) = self.parents.remove(&resource.id) {
            if let Some(siblings) = self.children.get_mut(&parent_id) {
                siblings.retain(|id| *id != resource.id);
                if siblings.is_empty() {
                    self.children.remove(&parent_id);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.devices.clear();
        self.parents.clear();
        self.children.clear();
    }

    pub fn is_device(&self, resource_id: ResourceId) -> bool {
        self.devices.contains_key(&resource_id)
    }

    pub fn technologies(&self, resource_id: ResourceId) -> Option<&TechnologySet> {
        self.devices.get(&resource_id)
    }

    pub fn parent_of(&self, resource_id: ResourceId) -> Option<ResourceId> {
        self.parents.get(&resource_id).copied()
    }

    pub fn children_of(&self, resource_id: ResourceId) -> &[ResourceId] {
        self.children
            .get(&resource_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Top-most ancestor of `resource_id` (the resource itself when it has no parent)
    ///
    /// A cyclic parent chain stops at the last resource before the cycle closes.
    pub fn root_of(&self, resource_id: ResourceId) -> ResourceId {
        let mut visited = HashSet::from([resource_id]);
        let mut current = resource_id;
        while let Some(parent) = self.parent_of(current) {
            if !visited.insert(parent) {
                break;
            }
            current = parent;
        }
        current
    }

    /// Devices supporting any of `technologies`, in insertion order
    pub fn devices_supporting(&self, technologies: &TechnologySet) -> Vec<ResourceId> {
        self.devices
            .iter()
            .filter(|(_, supported)| technology::intersects(supported, technologies))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceInfo, Technology};

    fn resource(id: i64, parent: Option<i64>) -> Resource {
        let mut builder = Resource::builder(id, format!("r{id}"), "admin");
        if let Some(parent) = parent {
            builder = builder.parent(parent);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_tree_is_order_independent() {
        let mut topology = DeviceTopology::new();
        topology.add_resource(&resource(3, Some(2)));
        topology.add_resource(&resource(2, Some(1)));
        topology.add_resource(&resource(1, None));
        topology.add_resource(&resource(4, Some(1)));

        assert_eq!(topology.root_of(ResourceId::new(3)), ResourceId::new(1));
        assert_eq!(
            topology.children_of(ResourceId::new(1)),
            &[ResourceId::new(2), ResourceId::new(4)]
        );

        topology.remove_resource(&resource(4, Some(1)));
        assert_eq!(topology.children_of(ResourceId::new(1)), &[ResourceId::new(2)]);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut topology = DeviceTopology::new();
        topology.add_resource(&resource(1, Some(2)));
        topology.add_resource(&resource(2, Some(1)));
        assert_eq!(topology.root_of(ResourceId::new(1)), ResourceId::new(2));
    }

    #[test]
    fn test_devices_supporting() {
        let mut topology = DeviceTopology::new();
        let mcu = Resource::builder(1, "mcu", "admin")
            .device(DeviceInfo::new([Technology::H323]))
            .build()
            .unwrap();
        topology.add_resource(&mcu);
        topology.add_resource(&resource(2, None));

        assert!(topology.is_device(ResourceId::new(1)));
        assert!(!topology.is_device(ResourceId::new(2)));
        assert_eq!(
            topology.devices_supporting(&[Technology::H323].into()),
            vec![ResourceId::new(1)]
        );
    }
}
