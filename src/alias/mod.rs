// Copyright (c) 2025 - Cowboy AI, Inc.
//! Alias namespaces, value generation and alias allocation

pub mod allocation;
pub mod namespace;
pub mod pattern;

pub use allocation::AliasAllocation;
pub use namespace::AliasNamespace;
pub use pattern::{PatternValueGenerator, ValueGenerator, ValuePattern};
