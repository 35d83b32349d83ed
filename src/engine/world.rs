//! The world: single owner of all storage state.
//!
//! [`World`] owns the component registry, the table registry, the entity
//! index, and the identity allocator, and is the only public mutation
//! surface. Every bulk load, staged or direct, flows through it, which is
//! what lets the core stay free of interior locking: one `&mut World` is one
//! writer.
//!
//! ## Staging
//!
//! A request can be applied immediately with [`World::set_with_data`] or
//! enqueued with [`World::stage`] and applied later by
//! [`World::apply_staged`] in enqueue order. Staged requests perform no
//! validation and no allocation until application; the world is observably
//! unchanged between staging and applying.

use std::any::Any;

use tracing::debug;

use crate::engine::entity::{EntityAllocator, EntityIndex, Record};
use crate::engine::error::{StagedApplyError, StoreResult};
use crate::engine::hierarchy;
use crate::engine::loader::{set_with_data, TableData};
use crate::engine::registry::{ComponentRegistry, TableRegistry};
use crate::engine::storage::{Column, Component};
use crate::engine::table::Table;
use crate::engine::types::{ComponentID, Entity, TableType, TypeTerm};

/// Entity-component storage: tables, index, registries, and staged requests.
pub struct World {
    components: ComponentRegistry,
    tables: TableRegistry,
    index: EntityIndex,
    allocator: EntityAllocator,
    staged: Vec<TableData>,
    context: Option<Box<dyn Any + Send>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world holding only the empty-type table.
    pub fn new() -> Self {
        Self {
            components: ComponentRegistry::new(),
            tables: TableRegistry::new(),
            index: EntityIndex::new(),
            allocator: EntityAllocator::new(),
            staged: Vec::new(),
            context: None,
        }
    }

    /// Registers component type `T` under `name`. Idempotent per type.
    pub fn register_component<T: Component>(&mut self, name: &str) -> ComponentID {
        self.components.register::<T>(name)
    }

    /// Returns the identifier previously assigned to `T`, if registered.
    pub fn component_id<T: Component>(&self) -> Option<ComponentID> {
        self.components.id_of::<T>()
    }

    /// Applies one bulk-load request immediately.
    ///
    /// Returns the entity of the first row. See the loader docs for the
    /// per-row create/overwrite/migrate outcomes and the validation contract.
    pub fn set_with_data(&mut self, data: &TableData) -> StoreResult<Entity> {
        set_with_data(
            &self.components,
            &mut self.tables,
            &mut self.index,
            &mut self.allocator,
            data,
        )
    }

    /// Enqueues a request for later application. The world is unchanged
    /// until [`World::apply_staged`] runs.
    pub fn stage(&mut self, data: TableData) {
        self.staged.push(data);
    }

    /// Number of requests currently staged.
    #[inline]
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Applies every staged request in enqueue order.
    ///
    /// Returns the first-row entity of each request, in order. On error,
    /// earlier requests stay applied, the failing request is dropped, and
    /// the requests after it are put back in the queue for a later attempt;
    /// the error names the failing request by queue position.
    pub fn apply_staged(&mut self) -> Result<Vec<Entity>, StagedApplyError> {
        let mut staged = std::mem::take(&mut self.staged);
        debug!(requests = staged.len(), "applying staged requests");
        let mut first_entities = Vec::with_capacity(staged.len());
        for index in 0..staged.len() {
            match self.set_with_data(&staged[index]) {
                Ok(first) => first_entities.push(first),
                Err(error) => {
                    self.staged = staged.split_off(index + 1);
                    debug!(index, retained = self.staged.len(), "staged request failed");
                    return Err(StagedApplyError { index, error });
                }
            }
        }
        Ok(first_entities)
    }

    /// Returns `true` if `entity` has a record in this world.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.index.contains(entity)
    }

    /// Number of live entities, realized relationship targets included.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.index.len()
    }

    /// Reads `entity`'s value of component `T`.
    ///
    /// Falls back along `InstanceOf` chains: an instance that lacks the
    /// component reads the shared value stored on its base. Returns `None`
    /// when the entity is not alive, `T` is unregistered, or no value is
    /// reachable.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let component_id = self.components.id_of::<T>()?;
        let record = hierarchy::find_component(&self.tables, &self.index, entity, component_id)?;
        self.tables
            .table(record.table)
            .get::<T>(component_id, record.row)
    }

    /// Mutable access to `entity`'s own value of component `T`.
    ///
    /// No prefab fallback: shared base values cannot be mutated through an
    /// instance. Returns `None` when the entity's own table lacks `T`.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let component_id = self.components.id_of::<T>()?;
        let record = self.index.lookup(entity)?;
        self.tables
            .table_mut(record.table)
            .get_mut::<T>(component_id, record.row)
    }

    /// Returns `true` if `entity`'s own type contains `term`.
    ///
    /// Term presence does not follow `InstanceOf` fallback; only the
    /// entity's own table type is inspected.
    pub fn has(&self, entity: Entity, term: TypeTerm) -> bool {
        self.index
            .lookup(entity)
            .map(|record| self.tables.table(record.table).table_type().contains(term))
            .unwrap_or(false)
    }

    /// Returns `true` if `entity`'s own type contains component `T`.
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components
            .id_of::<T>()
            .map(|id| self.has(entity, TypeTerm::Component(id)))
            .unwrap_or(false)
    }

    /// Returns `true` if `child` is a direct child of `parent`.
    pub fn contains(&self, parent: Entity, child: Entity) -> bool {
        hierarchy::is_child_of(&self.tables, &self.index, parent, child)
    }

    /// The parent of `entity`, if it has a `ChildOf` term.
    pub fn parent_of(&self, entity: Entity) -> Option<Entity> {
        hierarchy::parent_of(&self.tables, &self.index, entity)
    }

    /// The base of `entity`, if it has an `InstanceOf` term.
    pub fn base_of(&self, entity: Entity) -> Option<Entity> {
        hierarchy::base_of(&self.tables, &self.index, entity)
    }

    /// Collects the direct children of `parent`.
    pub fn children(&self, parent: Entity) -> Vec<Entity> {
        hierarchy::children(&self.tables, parent)
    }

    /// Counts entities whose type contains every term in `terms`.
    ///
    /// An empty term list matches every table and returns the total entity
    /// count.
    pub fn count(&self, terms: &[TypeTerm]) -> usize {
        let requested = TableType::from_terms(terms);
        self.tables
            .tables()
            .filter(|table| table.table_type().is_superset_of(&requested))
            .map(|table| table.row_count())
            .sum()
    }

    /// Reads a whole column of `T` from every table matching `terms`, in
    /// table order, calling `visit` once per table with the entities and the
    /// column slice.
    pub fn for_each_column<T, F>(&self, terms: &[TypeTerm], mut visit: F)
    where
        T: Component,
        F: FnMut(&[Entity], &[T]),
    {
        let Some(component_id) = self.components.id_of::<T>() else {
            return;
        };
        let requested = TableType::from_terms(terms);
        for table in self.tables.tables() {
            if !table.table_type().is_superset_of(&requested) {
                continue;
            }
            let Some(column) = table.column(component_id) else {
                continue;
            };
            if let Some(column) = column.as_any().downcast_ref::<Column<T>>() {
                visit(table.entities(), column.as_slice());
            }
        }
    }

    /// Removes `entity` and its row. Returns `false` if it was not alive.
    ///
    /// The freed row is filled by swap-remove; the displaced entity's record
    /// is republished before this returns.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let Some(record) = self.index.erase(entity) else {
            return false;
        };
        let table = self.tables.table_mut(record.table);
        // The record was just taken from the index, so the row is valid.
        if let Ok(Some(displaced)) = table.remove_row(record.row) {
            self.index.insert_or_update(
                displaced,
                Record {
                    table: record.table,
                    row: record.row,
                },
            );
        }
        true
    }

    /// Iterates every table, the empty-type table included.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.tables()
    }

    /// Number of tables.
    #[inline]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Attaches an arbitrary caller-owned context object to the world.
    pub fn set_context<T: Any + Send>(&mut self, context: T) {
        self.context = Some(Box::new(context));
    }

    /// Borrows the attached context, if it is a `T`.
    pub fn context<T: Any + Send>(&self) -> Option<&T> {
        self.context.as_ref()?.downcast_ref::<T>()
    }

    /// Mutably borrows the attached context, if it is a `T`.
    pub fn context_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.context.as_mut()?.downcast_mut::<T>()
    }
}
