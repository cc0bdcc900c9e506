// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`
///
/// `default_directive` (e.g. `"info"` or `"cim_resource_allocation=debug"`)
/// applies on top of the environment filter; an invalid directive is
/// ignored. Returns `false` when a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .try_init()
        .is_ok()
}

fn env_filter(default_directive: &str) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match default_directive.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
