//! Archetype tables: column-major storage for one canonical type.
//!
//! A [`Table`] stores every entity whose signature equals its [`TableType`].
//! Rows are dense: the entity list and every column hold exactly `row_count`
//! elements at all times, and row *i* across all of them describes the same
//! entity. Relationship terms participate in the table's type but get no
//! column.
//!
//! Row removal is swap-with-last. When the removed row was not the last one,
//! [`Table::remove_row`] reports the entity that was relocated into the freed
//! slot so the caller can republish its record before anything else observes
//! the table.

use crate::engine::error::{ColumnError, RowOutOfBoundsError, TableError};
use crate::engine::storage::{Column, Component, TypeErasedColumn};
use crate::engine::types::{ComponentID, Entity, TableID, TableType};

/// One archetype table: the entity list plus one column per data-bearing
/// component of the table's type.
///
/// ## Invariants
/// - `entities.len()` equals every column's length at operation boundaries.
/// - Columns appear in canonical type order (ascending component id).
/// - Entity uniqueness within a table is the entity index's responsibility;
///   the table itself never inspects identities.
pub struct Table {
    id: TableID,
    table_type: TableType,
    entities: Vec<Entity>,
    columns: Vec<(ComponentID, Box<dyn TypeErasedColumn>)>,
}

impl Table {
    /// Creates an empty table for `table_type` with the given columns.
    ///
    /// The caller (the table registry) supplies one column per data-bearing
    /// component of the type, in canonical order.
    pub fn new(
        id: TableID,
        table_type: TableType,
        columns: Vec<(ComponentID, Box<dyn TypeErasedColumn>)>,
    ) -> Self {
        debug_assert_eq!(table_type.components().count(), columns.len());
        Self {
            id,
            table_type,
            entities: Vec::new(),
            columns,
        }
    }

    /// The table's registry identifier.
    #[inline]
    pub fn id(&self) -> TableID {
        self.id
    }

    /// The table's canonical type.
    #[inline]
    pub fn table_type(&self) -> &TableType {
        &self.table_type
    }

    /// Number of rows (entities) stored.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the table holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The entities stored in this table, in row order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the entity at `row`, if in bounds.
    #[inline]
    pub fn entity_at(&self, row: usize) -> Option<Entity> {
        self.entities.get(row).copied()
    }

    /// Returns `true` if the table has a column for `component_id`.
    #[inline]
    pub fn has_column(&self, component_id: ComponentID) -> bool {
        self.column_position(component_id).is_some()
    }

    /// Type-erased view of the column for `component_id`.
    pub fn column(&self, component_id: ComponentID) -> Option<&dyn TypeErasedColumn> {
        self.column_position(component_id)
            .map(|i| self.columns[i].1.as_ref())
    }

    /// Mutable type-erased view of the column for `component_id`.
    pub fn column_mut(&mut self, component_id: ComponentID) -> Option<&mut dyn TypeErasedColumn> {
        let position = self.column_position(component_id)?;
        Some(self.columns[position].1.as_mut())
    }

    /// Typed read of one component value.
    ///
    /// Returns `None` when the table has no column for `component_id`, when
    /// `row` is out of bounds, or when `T` is not the column's element type.
    pub fn get<T: Component>(&self, component_id: ComponentID, row: usize) -> Option<&T> {
        self.column(component_id)?
            .as_any()
            .downcast_ref::<Column<T>>()?
            .get(row)
    }

    /// Typed mutable access to one component value.
    pub fn get_mut<T: Component>(
        &mut self,
        component_id: ComponentID,
        row: usize,
    ) -> Option<&mut T> {
        self.column_mut(component_id)?
            .as_any_mut()
            .downcast_mut::<Column<T>>()?
            .get_mut(row)
    }

    /// The full column for `component_id` as a typed slice.
    pub fn column_slice<T: Component>(&self, component_id: ComponentID) -> Option<&[T]> {
        Some(
            self.column(component_id)?
                .as_any()
                .downcast_ref::<Column<T>>()?
                .as_slice(),
        )
    }

    /// Appends a row for `entity` with every column holding its element
    /// type's default value. Returns the new row index.
    pub fn push_row(&mut self, entity: Entity) -> usize {
        let row = self.entities.len();
        self.entities.push(entity);
        for (_, column) in &mut self.columns {
            column.push_default();
        }
        row
    }

    /// Removes `row` by moving the last row into its place, across the entity
    /// list and every column.
    ///
    /// Returns the entity that now occupies `row` (the former last row), or
    /// `None` when the removed row was already last. The caller must
    /// republish the returned entity's record before the removal is
    /// considered complete.
    pub fn remove_row(&mut self, row: usize) -> Result<Option<Entity>, TableError> {
        let length = self.entities.len();
        if row >= length {
            return Err(ColumnError::RowOutOfBounds(RowOutOfBoundsError { row, length }).into());
        }
        self.entities.swap_remove(row);
        for (_, column) in &mut self.columns {
            column.swap_remove(row)?;
        }
        if row + 1 == length {
            Ok(None)
        } else {
            Ok(Some(self.entities[row]))
        }
    }

    /// Removes every row. Column capacity is retained.
    pub fn clear(&mut self) {
        self.entities.clear();
        for (_, column) in &mut self.columns {
            column.clear();
        }
    }

    /// Verifies that every column's length matches the entity list.
    ///
    /// Misalignment indicates an internal bug; this check is cheap and is run
    /// by the bulk loader after each mutation batch.
    pub fn check_alignment(&self) -> Result<(), TableError> {
        let expected = self.entities.len();
        for (_, column) in &self.columns {
            if column.len() != expected {
                return Err(TableError::MisalignedColumns {
                    table: self.id,
                    expected,
                    got: column.len(),
                });
            }
        }
        Ok(())
    }

    #[inline]
    fn column_position(&self, component_id: ComponentID) -> Option<usize> {
        // Columns are in canonical (ascending id) order.
        self.columns
            .binary_search_by_key(&component_id, |(id, _)| *id)
            .ok()
    }
}
