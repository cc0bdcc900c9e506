// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of the resource index and room capacity that must hold for
//! arbitrary resource sets and reservations.

mod cache_properties;
