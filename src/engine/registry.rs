//! Component registration and the type-to-table registry.
//!
//! [`ComponentRegistry`] assigns dense [`ComponentID`]s to Rust component
//! types and remembers how to build a storage column for each. Registration
//! is idempotent per type: registering the same `T` twice returns the same
//! identifier.
//!
//! [`TableRegistry`] owns every table in the world and guarantees the
//! canonical-type invariant: one table per distinct [`TableType`], created
//! lazily on first request. Table identifiers are stable for the life of the
//! world; tables are never destroyed, only emptied.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use crate::engine::error::BulkLoadError;
use crate::engine::storage::{Column, Component, TypeErasedColumn};
use crate::engine::table::Table;
use crate::engine::types::{ComponentID, TableID, TableType};

/// Identifier of the table for the empty type.
///
/// Created eagerly at registry construction; entities realized with no
/// components (relationship targets named before being given data) live here.
pub const EMPTY_TABLE: TableID = 0;

struct ComponentInfo {
    name: String,
    type_id: TypeId,
    make_column: fn() -> Box<dyn TypeErasedColumn>,
}

fn make_column<T: Component>() -> Box<dyn TypeErasedColumn> {
    Box::new(Column::<T>::new())
}

/// Registry of data-bearing component types.
///
/// ## Invariants
/// - Identifiers are dense, starting at 0, in registration order.
/// - Each Rust type maps to exactly one identifier.
#[derive(Default)]
pub struct ComponentRegistry {
    infos: Vec<ComponentInfo>,
    by_type: HashMap<TypeId, ComponentID>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under `name` and returns its identifier.
    ///
    /// Registering an already-registered type returns the existing
    /// identifier; the stored name is not changed.
    pub fn register<T: Component>(&mut self, name: &str) -> ComponentID {
        let type_id = TypeId::of::<T>();
        if let Some(&id) = self.by_type.get(&type_id) {
            return id;
        }
        let id = self.infos.len() as ComponentID;
        self.infos.push(ComponentInfo {
            name: name.to_owned(),
            type_id,
            make_column: make_column::<T>,
        });
        self.by_type.insert(type_id, id);
        debug!(component = name, id, "registered component");
        id
    }

    /// Returns the identifier previously assigned to `T`, if any.
    pub fn id_of<T: Component>(&self) -> Option<ComponentID> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the registered name for `id`.
    pub fn name(&self, id: ComponentID) -> Option<&str> {
        self.infos.get(id as usize).map(|info| info.name.as_str())
    }

    /// Returns the element `TypeId` for `id`.
    pub fn type_id(&self, id: ComponentID) -> Option<TypeId> {
        self.infos.get(id as usize).map(|info| info.type_id)
    }

    /// Returns `true` if `id` names a registered component.
    #[inline]
    pub fn contains(&self, id: ComponentID) -> bool {
        (id as usize) < self.infos.len()
    }

    /// Builds an empty storage column for `id`.
    pub fn new_column(&self, id: ComponentID) -> Option<Box<dyn TypeErasedColumn>> {
        self.infos.get(id as usize).map(|info| (info.make_column)())
    }

    /// Number of registered components.
    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Returns `true` if no components are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

/// Owner of every table, keyed by canonical type.
///
/// ## Invariants
/// - Exactly one table exists per distinct canonical type.
/// - Table 0 is the empty-type table and always exists.
/// - Identifiers index into the table list and never change.
pub struct TableRegistry {
    tables: Vec<Table>,
    by_type: HashMap<TableType, TableID>,
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRegistry {
    /// Creates a registry holding only the empty-type table.
    pub fn new() -> Self {
        let empty = TableType::default();
        let mut by_type = HashMap::new();
        by_type.insert(empty.clone(), EMPTY_TABLE);
        Self {
            tables: vec![Table::new(EMPTY_TABLE, empty, Vec::new())],
            by_type,
        }
    }

    /// Resolves `table_type` to its table, creating the table on first use.
    ///
    /// ## Errors
    /// [`BulkLoadError::UnknownComponent`] when the type names a component
    /// that was never registered. No table is created in that case.
    pub fn table_for(
        &mut self,
        table_type: &TableType,
        components: &ComponentRegistry,
    ) -> Result<TableID, BulkLoadError> {
        if let Some(&id) = self.by_type.get(table_type) {
            return Ok(id);
        }

        let mut columns = Vec::with_capacity(table_type.components().count());
        for component_id in table_type.components() {
            let column = components
                .new_column(component_id)
                .ok_or(BulkLoadError::UnknownComponent { component_id })?;
            columns.push((component_id, column));
        }

        let id = self.tables.len() as TableID;
        debug!(table = id, terms = table_type.len(), "created table");
        self.tables.push(Table::new(id, table_type.clone(), columns));
        self.by_type.insert(table_type.clone(), id);
        Ok(id)
    }

    /// The table with identifier `id`.
    ///
    /// Identifiers originate from this registry and are never retired, so
    /// indexing is safe for any id the registry has handed out.
    #[inline]
    pub fn table(&self, id: TableID) -> &Table {
        &self.tables[id as usize]
    }

    /// Mutable access to the table with identifier `id`.
    #[inline]
    pub fn table_mut(&mut self, id: TableID) -> &mut Table {
        &mut self.tables[id as usize]
    }

    /// Mutable access to two distinct tables at once, for migration.
    pub fn pair_mut(&mut self, a: TableID, b: TableID) -> (&mut Table, &mut Table) {
        debug_assert_ne!(a, b);
        let (a, b) = (a as usize, b as usize);
        if a < b {
            let (head, tail) = self.tables.split_at_mut(b);
            (&mut head[a], &mut tail[0])
        } else {
            let (head, tail) = self.tables.split_at_mut(a);
            (&mut tail[0], &mut head[b])
        }
    }

    /// Iterates every table, including empty ones.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    /// Number of tables, the empty-type table included.
    #[inline]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Always `false`: the empty-type table exists from construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}
