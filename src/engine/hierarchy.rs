//! Relationship resolution: containment, prefab fallback, target realization.
//!
//! Relationships are encoded in table types, not in per-entity storage, so
//! every question about hierarchy reduces to inspecting the type of the table
//! an entity lives in. Containment checks are a single term lookup; child
//! enumeration scans tables whose type carries the matching `ChildOf` term.
//!
//! `InstanceOf` additionally affects component reads: an instance that lacks
//! a component falls back to its base, transitively, so prefab values are
//! shared rather than copied. Fallback depth is bounded to keep accidental
//! `InstanceOf` cycles from hanging a read.

use crate::engine::entity::{EntityAllocator, EntityIndex, Record};
use crate::engine::error::BulkLoadError;
use crate::engine::registry::{TableRegistry, EMPTY_TABLE};
use crate::engine::types::{ComponentID, Entity, TypeTerm};

/// Maximum `InstanceOf` chain length followed during component fallback.
pub const MAX_INSTANCE_DEPTH: usize = 16;

/// Ensures `target` is a live entity, creating it in the empty-type table if
/// it has never been seen.
///
/// Relationship targets may be named before they are given any data; naming
/// one realizes it so that later loads and lookups agree on its existence.
///
/// ## Errors
/// [`BulkLoadError::UnresolvedTarget`] when `target` is the reserved invalid
/// handle (identity 0).
pub fn realize_target(
    tables: &mut TableRegistry,
    index: &mut EntityIndex,
    allocator: &mut EntityAllocator,
    target: Entity,
) -> Result<(), BulkLoadError> {
    if target.id() == 0 {
        return Err(BulkLoadError::UnresolvedTarget { target });
    }
    if index.contains(target) {
        return Ok(());
    }
    let row = tables.table_mut(EMPTY_TABLE).push_row(target);
    index.insert_or_update(
        target,
        Record {
            table: EMPTY_TABLE,
            row,
        },
    );
    allocator.observe(target);
    Ok(())
}

/// Returns the parent of `entity`, if its type carries a `ChildOf` term.
///
/// An entity has at most one parent per load; if several `ChildOf` terms are
/// present the canonically first one is reported.
pub fn parent_of(tables: &TableRegistry, index: &EntityIndex, entity: Entity) -> Option<Entity> {
    let record = index.lookup(entity)?;
    tables
        .table(record.table)
        .table_type()
        .iter()
        .find_map(|term| match term {
            TypeTerm::ChildOf(parent) => Some(parent),
            _ => None,
        })
}

/// Returns the base of `entity`, if its type carries an `InstanceOf` term.
pub fn base_of(tables: &TableRegistry, index: &EntityIndex, entity: Entity) -> Option<Entity> {
    let record = index.lookup(entity)?;
    tables
        .table(record.table)
        .table_type()
        .iter()
        .find_map(|term| match term {
            TypeTerm::InstanceOf(base) => Some(base),
            _ => None,
        })
}

/// Returns `true` if `child` is a direct child of `parent`.
pub fn is_child_of(
    tables: &TableRegistry,
    index: &EntityIndex,
    parent: Entity,
    child: Entity,
) -> bool {
    index
        .lookup(child)
        .map(|record| {
            tables
                .table(record.table)
                .table_type()
                .contains(TypeTerm::ChildOf(parent))
        })
        .unwrap_or(false)
}

/// Collects the direct children of `parent`, in table order.
pub fn children(tables: &TableRegistry, parent: Entity) -> Vec<Entity> {
    tables
        .tables()
        .filter(|table| table.table_type().contains(TypeTerm::ChildOf(parent)))
        .flat_map(|table| table.entities().iter().copied())
        .collect()
}

/// Locates the storage slot holding `component_id` for `entity`, following
/// `InstanceOf` fallback when the entity's own table lacks the component.
///
/// Returns the owning record: for an instance reading a shared prefab value,
/// the record points into the base's table. Fallback is depth-first across
/// all `InstanceOf` terms and stops at [`MAX_INSTANCE_DEPTH`].
pub fn find_component(
    tables: &TableRegistry,
    index: &EntityIndex,
    entity: Entity,
    component_id: ComponentID,
) -> Option<Record> {
    find_component_at_depth(tables, index, entity, component_id, 0)
}

fn find_component_at_depth(
    tables: &TableRegistry,
    index: &EntityIndex,
    entity: Entity,
    component_id: ComponentID,
    depth: usize,
) -> Option<Record> {
    if depth >= MAX_INSTANCE_DEPTH {
        return None;
    }
    let record = index.lookup(entity)?;
    let table = tables.table(record.table);
    if table.has_column(component_id) {
        return Some(record);
    }
    for term in table.table_type().iter() {
        if let TypeTerm::InstanceOf(base) = term {
            if let Some(found) =
                find_component_at_depth(tables, index, base, component_id, depth + 1)
            {
                return Some(found);
            }
        }
    }
    None
}
