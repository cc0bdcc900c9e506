// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource allocation configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::{DateTimeSpecification, UserId};

/// Environment variable holding the inherited maximum future (e.g. `P4M`)
pub const ENV_DEFAULT_MAXIMUM_FUTURE: &str = "ALLOCATION_DEFAULT_MAXIMUM_FUTURE";

/// Environment variable holding comma separated administrator ids
pub const ENV_ADMINISTRATORS: &str = "ALLOCATION_ADMINISTRATORS";

/// Environment variable holding the tracing filter directive
pub const ENV_LOG: &str = "ALLOCATION_LOG";

/// Resource allocation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Horizon of resources and capabilities without their own
    pub default_resource_maximum_future: Option<DateTimeSpecification>,

    /// Users allowed to allocate resources they do not own
    pub administrators: Vec<UserId>,

    /// Default tracing filter directive
    pub log_filter: String,
}

impl AllocationConfig {
    pub fn with_default_maximum_future(mut self, maximum_future: DateTimeSpecification) -> Self {
        self.default_resource_maximum_future = Some(maximum_future);
        self
    }

    pub fn with_administrator(mut self, user: impl Into<UserId>) -> Self {
        self.administrators.push(user.into());
        self
    }

    /// Load from `ALLOCATION_*` environment variables, defaulting what is unset
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_DEFAULT_MAXIMUM_FUTURE) {
            config.default_resource_maximum_future = Some(
                value
                    .parse()
                    .with_context(|| format!("{} is not a valid date/time specification", ENV_DEFAULT_MAXIMUM_FUTURE))?,
            );
        }
        if let Some(value) = lookup(ENV_ADMINISTRATORS) {
            config.administrators = value
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(UserId::from)
                .collect();
        }
        if let Some(value) = lookup(ENV_LOG) {
            config.log_filter = value;
        }
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse allocation configuration")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            default_resource_maximum_future: None,
            administrators: Vec::new(),
            log_filter: "info".to_string(),
        }
    }
}
