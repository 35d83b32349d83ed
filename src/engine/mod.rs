//! # Engine Module
//!
//! Internal storage-core implementation.
//!
//! This module contains all core building blocks such as:
//! - Canonical types and terms
//! - The integer-keyed map and entity index
//! - Column storage and archetype tables
//! - The type-to-table registry
//! - Hierarchy resolution and bulk loading
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod map;
pub mod entity;
pub mod storage;
pub mod table;
pub mod registry;
pub mod hierarchy;
pub mod loader;
pub mod world;
