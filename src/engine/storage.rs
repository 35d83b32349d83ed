//! Column storage and type-erased access for table data.
//!
//! This module implements [`Column<T>`], the contiguous column-major storage
//! container behind every data-bearing component, plus the type-erased
//! interfaces that let tables and the bulk loader manipulate heterogeneous
//! columns without knowing `T` at compile time:
//!
//! - [`TypeErasedColumn`]: the dynamically-typed column interface used by
//!   tables (`Box<dyn TypeErasedColumn>` per component).
//! - [`ColumnSource`]: the read side of a caller-supplied value buffer, used
//!   by the bulk loader to write individual elements across the type-erased
//!   boundary.
//! - [`ColumnData`]: the presence-or-absence of a buffer for one component
//!   in a bulk load, as an explicit enum so the preserve-vs-overwrite
//!   decision is a checked branch rather than a null test.
//!
//! ## Storage model
//!
//! A column is a plain `Vec<T>`: one contiguous array, row *i* of every
//! column in a table describing the same entity. Removal is swap-with-last,
//! so row indices are not stable; the caller is responsible for republishing
//! the record of the displaced entity.
//!
//! ## Type erasure
//!
//! Typed access goes through `as_any`/`as_any_mut` downcasting, guarded by
//! `element_type_id`. Cross-column operations (`clone_value_from`, buffer
//! writes) verify the element type and report [`TypeMismatchError`] on
//! disagreement rather than panicking.

use std::any::{type_name, Any, TypeId};

use crate::engine::error::{ColumnError, RowOutOfBoundsError, TypeMismatchError};

/// Marker for types storable in a column.
///
/// `Default` supplies the implementation-default value written when a bulk
/// load creates an entity without providing data for a component. `Clone` is
/// required because migration carries values forward while the source row is
/// still live.
pub trait Component: 'static + Send + Sync + Clone + Default {}

impl<T: 'static + Send + Sync + Clone + Default> Component for T {}

/// Dynamically-typed interface over a single table column.
///
/// ## Invariants
/// - `len()` equals the owning table's row count at every operation boundary.
/// - Typed access succeeds only when the requested type matches the column's
///   element type; mismatches return an error, never transmute.
pub trait TypeErasedColumn: Send + Sync {
    /// Number of rows stored.
    fn len(&self) -> usize;

    /// Returns `true` if the column has no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `TypeId` of the element type.
    fn element_type_id(&self) -> TypeId;

    /// Human-readable element type name, for diagnostics.
    fn element_type_name(&self) -> &'static str;

    /// Immutable type-erased view for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable type-erased view for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Appends one row holding the element type's default value.
    fn push_default(&mut self);

    /// Removes `row` by moving the last row into its place.
    ///
    /// Returns the index the filling row was moved from (`Some(old_last)`),
    /// or `None` when the removed row was already last.
    fn swap_remove(&mut self, row: usize) -> Result<Option<usize>, ColumnError>;

    /// Overwrites `self[dst_row]` with a clone of `source[src_row]`.
    ///
    /// Used during migration to carry a value forward into the destination
    /// table while the source row is still intact.
    fn clone_value_from(
        &mut self,
        source: &dyn TypeErasedColumn,
        src_row: usize,
        dst_row: usize,
    ) -> Result<(), ColumnError>;

    /// Removes all rows. Capacity is retained.
    fn clear(&mut self);

    /// Creates an empty column of the same element type.
    fn new_empty(&self) -> Box<dyn TypeErasedColumn>;
}

/// Contiguous storage for one component across all rows of a table.
#[derive(Debug, Clone, Default)]
pub struct Column<T: Component> {
    values: Vec<T>,
}

impl<T: Component> Column<T> {
    /// Creates an empty column.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Returns the value at `row`, if in bounds.
    #[inline]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.values.get(row)
    }

    /// Returns a mutable reference to the value at `row`, if in bounds.
    #[inline]
    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.values.get_mut(row)
    }

    /// The whole column as a slice, for bulk reads.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// The whole column as a mutable slice, for bulk writes.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Appends a value.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }
}

impl<T: Component> TypeErasedColumn for Column<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn push_default(&mut self) {
        self.values.push(T::default());
    }

    fn swap_remove(&mut self, row: usize) -> Result<Option<usize>, ColumnError> {
        let length = self.values.len();
        if row >= length {
            return Err(RowOutOfBoundsError { row, length }.into());
        }
        self.values.swap_remove(row);
        if row + 1 == length {
            Ok(None)
        } else {
            Ok(Some(length - 1))
        }
    }

    fn clone_value_from(
        &mut self,
        source: &dyn TypeErasedColumn,
        src_row: usize,
        dst_row: usize,
    ) -> Result<(), ColumnError> {
        let source = source
            .as_any()
            .downcast_ref::<Column<T>>()
            .ok_or(TypeMismatchError {
                expected: TypeId::of::<T>(),
                actual: source.element_type_id(),
            })?;
        let value = source
            .get(src_row)
            .ok_or(RowOutOfBoundsError {
                row: src_row,
                length: source.len(),
            })?
            .clone();
        let length = self.values.len();
        *self.values.get_mut(dst_row).ok_or(RowOutOfBoundsError {
            row: dst_row,
            length,
        })? = value;
        Ok(())
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn new_empty(&self) -> Box<dyn TypeErasedColumn> {
        Box::new(Column::<T>::new())
    }
}

/// Read side of a caller-supplied value buffer for one component.
///
/// Implemented for `Vec<T>`; the bulk loader moves elements across the
/// type-erased boundary one row at a time, pairing each source index with a
/// destination row.
pub trait ColumnSource: Send + Sync {
    /// Number of values in the buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `TypeId` of the buffered element type.
    fn element_type_id(&self) -> TypeId;

    /// Overwrites `column[dst_row]` with a clone of `self[src_index]`.
    fn write_to(
        &self,
        column: &mut dyn TypeErasedColumn,
        src_index: usize,
        dst_row: usize,
    ) -> Result<(), ColumnError>;

    /// Appends a clone of `self[src_index]` to `column`.
    fn push_to(
        &self,
        column: &mut dyn TypeErasedColumn,
        src_index: usize,
    ) -> Result<(), ColumnError>;
}

impl<T: Component> ColumnSource for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn write_to(
        &self,
        column: &mut dyn TypeErasedColumn,
        src_index: usize,
        dst_row: usize,
    ) -> Result<(), ColumnError> {
        let value = self
            .get(src_index)
            .ok_or(RowOutOfBoundsError {
                row: src_index,
                length: Vec::len(self),
            })?
            .clone();
        let column_type = column.element_type_id();
        let column = column
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .ok_or(TypeMismatchError {
                expected: column_type,
                actual: TypeId::of::<T>(),
            })?;
        let length = column.len();
        *column.get_mut(dst_row).ok_or(RowOutOfBoundsError {
            row: dst_row,
            length,
        })? = value;
        Ok(())
    }

    fn push_to(
        &self,
        column: &mut dyn TypeErasedColumn,
        src_index: usize,
    ) -> Result<(), ColumnError> {
        let value = self
            .get(src_index)
            .ok_or(RowOutOfBoundsError {
                row: src_index,
                length: Vec::len(self),
            })?
            .clone();
        let column_type = column.element_type_id();
        let column = column
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .ok_or(TypeMismatchError {
                expected: column_type,
                actual: TypeId::of::<T>(),
            })?;
        column.push(value);
        Ok(())
    }
}

/// Presence or absence of a value buffer for one component in a bulk load.
///
/// `Missing` means "no new data supplied for this component on this call":
/// existing values are preserved on overwrite and defaults are written for
/// freshly created entities. `Values` always overwrites.
pub enum ColumnData {
    /// No buffer supplied; preserve or default.
    Missing,
    /// A buffer of row-count values; overwrite.
    Values(Box<dyn ColumnSource>),
}

impl ColumnData {
    /// Wraps a typed value buffer.
    pub fn values<T: Component>(values: Vec<T>) -> Self {
        ColumnData::Values(Box::new(values))
    }

    /// Returns `true` when no buffer was supplied.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, ColumnData::Missing)
    }
}
