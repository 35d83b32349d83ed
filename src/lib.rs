//! # Entity Tables
//!
//! Archetype-based entity-component storage core: column-major tables
//! grouped by canonical type, an incrementally-growing integer-keyed map
//! for entity records, and a batch loader that creates, overwrites, and
//! migrates entities in bulk.
//!
//! ## Design Goals
//! - One table per canonical component/relationship signature
//! - Dense column storage, swap-remove row deletion
//! - Explicit absent-means-preserve bulk-load semantics
//! - Relationship terms (`ChildOf`, `InstanceOf`) as part of type identity
//!
//! All mutation flows through a single [`World`] value; the core carries no
//! interior locking.

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Core storage types

pub use engine::world::World;

pub use engine::loader::TableData;

pub use engine::storage::{
    Column,
    ColumnData,
    ColumnSource,
    Component,
    TypeErasedColumn,
};

pub use engine::table::Table;

pub use engine::registry::{
    ComponentRegistry,
    TableRegistry,
    EMPTY_TABLE,
};

pub use engine::entity::{
    EntityAllocator,
    EntityIndex,
    Record,
};

pub use engine::map::KeyMap;

pub use engine::error::{
    BulkLoadError,
    ColumnError,
    RowOutOfBoundsError,
    StagedApplyError,
    StoreResult,
    TableError,
    TypeMismatchError,
};

pub use engine::types::{
    ComponentID,
    Entity,
    EntityID,
    TableID,
    TableType,
    TypeTerm,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used storage types.
///
/// Import with:
/// ```rust
/// use entity_tables::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ColumnData,
        Component,
        Entity,
        KeyMap,
        StoreResult,
        TableData,
        TableType,
        TypeTerm,
        World,
    };
}
