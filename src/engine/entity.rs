//! Entity records, the entity index, and identity allocation.
//!
//! The [`EntityIndex`] is the single source of truth for "where does entity E
//! currently live": it maps an entity identity to a [`Record`] naming the
//! owning table and the row within it. Every table migration and every
//! swap-remove that relocates a row must publish the updated record here
//! before the operation is considered complete.
//!
//! The [`EntityAllocator`] hands out engine-generated identities. Generated
//! identities are allocated contiguously above any previously issued maximum,
//! including explicit caller-supplied identities that the allocator has been
//! told about, so a generated block never collides with live handles.

use crate::engine::map::KeyMap;
use crate::engine::types::{Entity, EntityID, TableID};

/// Location of an entity's data: a table reference plus a row index.
///
/// Exactly one record exists per live entity. Records are mutated whenever
/// the entity's type changes (table migration) or its row moves because a
/// swap-remove relocated it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    /// Table that owns the entity's row.
    pub table: TableID,
    /// Row index within the table.
    pub row: usize,
}

/// Map from entity identity to storage record.
///
/// A thin specialization of [`KeyMap`]; callers interact with entities, not
/// raw keys.
#[derive(Debug, Default, Clone)]
pub struct EntityIndex {
    records: KeyMap<Record>,
}

impl EntityIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            records: KeyMap::new(),
        }
    }

    /// Returns the record for `entity`, or `None` if the entity is not live.
    #[inline]
    pub fn lookup(&self, entity: Entity) -> Option<Record> {
        self.records.get(entity.id()).copied()
    }

    /// Publishes `record` as the current location of `entity`.
    #[inline]
    pub fn insert_or_update(&mut self, entity: Entity, record: Record) {
        self.records.set(entity.id(), record);
    }

    /// Removes the record for `entity`. Returns the prior record, if any.
    #[inline]
    pub fn erase(&mut self, entity: Entity) -> Option<Record> {
        self.records.remove(entity.id())
    }

    /// Returns `true` if `entity` has a record.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.records.has(entity.id())
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.count()
    }

    /// Returns `true` if no entities are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.count() == 0
    }
}

/// Allocates engine-generated entity identities.
///
/// ## Invariants
/// - Identities from [`EntityAllocator::reserve`] are contiguous.
/// - No identity at or below the observed maximum is ever issued.
///
/// Identity 0 is never issued; it is reserved as an invalid handle.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    next: EntityID,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityAllocator {
    /// Creates an allocator whose first issued identity is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Reserves a contiguous block of `count` identities and returns the
    /// first. A reservation of zero returns the current watermark without
    /// consuming it.
    pub fn reserve(&mut self, count: usize) -> Entity {
        let base = self.next;
        self.next += count as EntityID;
        Entity(base)
    }

    /// Raises the allocation floor above an explicit caller-supplied
    /// identity, so later generated blocks do not collide with it.
    pub fn observe(&mut self, entity: Entity) {
        if entity.id() >= self.next {
            self.next = entity.id() + 1;
        }
    }
}
