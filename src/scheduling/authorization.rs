// Copyright (c) 2025 - Cowboy AI, Inc.
//! Authorization consulted by owner-restricted scheduling

use std::collections::{HashMap, HashSet};

use crate::config::AllocationConfig;
use crate::domain::{Resource, ResourceId, UserId};

/// Users owning a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOwners {
    /// Every user may act as owner
    Everyone,
    /// Explicit owners; an empty set defers to the resource's creator
    Users(HashSet<UserId>),
}

impl ResourceOwners {
    pub fn none() -> Self {
        Self::Users(HashSet::new())
    }
}

/// Authorization capability passed into scheduling transactions
pub trait Authorization: Send + Sync {
    fn is_administrator(&self, user: &UserId) -> bool;

    fn resource_owners(&self, resource: &Resource) -> ResourceOwners;
}

/// Authorization backed by a fixed administrator list and owner table
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorization {
    administrators: HashSet<UserId>,
    owners: HashMap<ResourceId, ResourceOwners>,
}

impl StaticAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Administrators taken from configuration
    pub fn from_config(config: &AllocationConfig) -> Self {
        Self {
            administrators: config.administrators.iter().cloned().collect(),
            owners: HashMap::new(),
        }
    }

    pub fn with_administrator(mut self, user: impl Into<UserId>) -> Self {
        self.administrators.insert(user.into());
        self
    }

    /// Grant ownership of a resource to `user`
    pub fn with_owner(mut self, resource_id: impl Into<ResourceId>, user: impl Into<UserId>) -> Self {
        let owners = self
            .owners
            .entry(resource_id.into())
            .or_insert_with(ResourceOwners::none);
        if let ResourceOwners::Users(users) = owners {
            users.insert(user.into());
        }
        self
    }

    /// Let every user own a resource
    pub fn with_public_resource(mut self, resource_id: impl Into<ResourceId>) -> Self {
        self.owners.insert(resource_id.into(), ResourceOwners::Everyone);
        self
    }
}

impl Authorization for StaticAuthorization {
    fn is_administrator(&self, user: &UserId) -> bool {
        self.administrators.contains(user)
    }

    fn resource_owners(&self, resource: &Resource) -> ResourceOwners {
        self.owners
            .get(&resource.id)
            .cloned()
            .unwrap_or_else(ResourceOwners::none)
    }
}
