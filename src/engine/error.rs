//! Error types for table storage and bulk loading.
//!
//! This module declares focused, composable error types used across the
//! storage core. Each error models a single failure mode and carries enough
//! context to make failures actionable, while providing `From<T>` conversions
//! into the aggregate types like [`BulkLoadError`] so call sites can use `?`.
//!
//! ## Taxonomy
//! * **Contract violations**: malformed bulk-load input (length mismatches,
//!   data supplied for dataless terms, unresolvable relationship targets).
//!   These are rejected before any table is mutated.
//! * **Internal invariant violations**: misaligned column lengths or stale
//!   records. These indicate a bug in the core, not caller error.
//!
//! Lookup misses (absent key, missing component) are not errors; they are
//! expressed as `Option` at the API boundary.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is short, imperative, suitable for operator logs.
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::any::TypeId;
use std::fmt;

use crate::engine::types::{ComponentID, Entity, TableID};

/// Returned when a column write targets a slot whose element type does not
/// match the provided value's type.
///
/// Surfaced by type-erased column storage when a caller pairs a component
/// identifier with a buffer of the wrong element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// Element type declared by the destination column.
    pub expected: TypeId,

    /// Element type of the value provided by the caller.
    pub actual: TypeId,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column type mismatch: expected {:?}, actual {:?}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for TypeMismatchError {}

/// Returned when a row index addresses storage outside the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOutOfBoundsError {
    /// Row index that was addressed.
    pub row: usize,

    /// Number of valid rows at the time of the access.
    pub length: usize,
}

impl fmt::Display for RowOutOfBoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} out of bounds (length {})", self.row, self.length)
    }
}

impl std::error::Error for RowOutOfBoundsError {}

/// Aggregate error for single-column operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnError {
    /// The dynamic type of a value did not match the column's element type.
    TypeMismatch(TypeMismatchError),

    /// A row index addressed storage outside valid bounds.
    RowOutOfBounds(RowOutOfBoundsError),
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnError::TypeMismatch(e) => write!(f, "{e}"),
            ColumnError::RowOutOfBounds(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ColumnError {}

impl From<TypeMismatchError> for ColumnError {
    fn from(e: TypeMismatchError) -> Self {
        ColumnError::TypeMismatch(e)
    }
}

impl From<RowOutOfBoundsError> for ColumnError {
    fn from(e: RowOutOfBoundsError) -> Self {
        ColumnError::RowOutOfBounds(e)
    }
}

/// Errors raised by table row operations.
///
/// ## Notes
/// `MisalignedColumns` indicates a serious internal invariant violation:
/// every column of a table must hold exactly `row_count` elements at all
/// times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The table has no column for the requested component.
    MissingColumn {
        /// Component whose column was requested.
        component_id: ComponentID,
    },

    /// Column lengths disagreed with the table's row count.
    MisalignedColumns {
        /// Table whose columns diverged.
        table: TableID,
        /// Expected row count.
        expected: usize,
        /// Length observed on the offending column.
        got: usize,
    },

    /// A column-level operation failed.
    Column(ColumnError),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::MissingColumn { component_id } => {
                write!(f, "table has no column for component {}", component_id)
            }
            TableError::MisalignedColumns {
                table,
                expected,
                got,
            } => write!(
                f,
                "table {} columns misaligned: expected {} rows, got {}",
                table, expected, got
            ),
            TableError::Column(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<ColumnError> for TableError {
    fn from(e: ColumnError) -> Self {
        TableError::Column(e)
    }
}

/// High-level error for bulk set-with-data requests.
///
/// Contract violations are detected during validation, before any table is
/// mutated; a failed call leaves the world unchanged. Internal variants can
/// surface after mutation has begun and are not rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkLoadError {
    /// The explicit entity array length did not match the row count.
    EntityLengthMismatch {
        /// Requested row count.
        row_count: usize,
        /// Length of the supplied entity array.
        entities: usize,
    },

    /// A supplied column buffer length did not match the row count.
    ColumnLengthMismatch {
        /// Component the buffer was paired with.
        component_id: ComponentID,
        /// Requested row count.
        row_count: usize,
        /// Length of the offending buffer.
        values: usize,
    },

    /// A supplied buffer's element type did not match the registered
    /// component type.
    ColumnTypeMismatch {
        /// Component the buffer was paired with.
        component_id: ComponentID,
    },

    /// A data buffer was supplied for a term that carries no data.
    DataForDatalessTerm,

    /// A relationship term referenced a target that cannot be realized.
    UnresolvedTarget {
        /// The offending target handle.
        target: Entity,
    },

    /// A component identifier was never registered with the world.
    UnknownComponent {
        /// The unregistered identifier.
        component_id: ComponentID,
    },

    /// A table-level operation failed after validation.
    Table(TableError),
}

impl fmt::Display for BulkLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkLoadError::EntityLengthMismatch {
                row_count,
                entities,
            } => write!(
                f,
                "entity array length {} does not match row count {}",
                entities, row_count
            ),
            BulkLoadError::ColumnLengthMismatch {
                component_id,
                row_count,
                values,
            } => write!(
                f,
                "column buffer for component {} has {} values; expected {}",
                component_id, values, row_count
            ),
            BulkLoadError::ColumnTypeMismatch { component_id } => write!(
                f,
                "column buffer for component {} has the wrong element type",
                component_id
            ),
            BulkLoadError::DataForDatalessTerm => {
                f.write_str("data buffer supplied for a dataless term")
            }
            BulkLoadError::UnresolvedTarget { target } => {
                write!(f, "relationship target {} cannot be realized", target)
            }
            BulkLoadError::UnknownComponent { component_id } => {
                write!(f, "component {} is not registered", component_id)
            }
            BulkLoadError::Table(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BulkLoadError {}

impl From<TableError> for BulkLoadError {
    fn from(e: TableError) -> Self {
        BulkLoadError::Table(e)
    }
}

impl From<ColumnError> for BulkLoadError {
    fn from(e: ColumnError) -> Self {
        BulkLoadError::Table(TableError::Column(e))
    }
}

/// Returned when applying the staged queue fails partway through.
///
/// `index` names the offending request by its position in the queue at the
/// time of the call. Requests before it were applied; requests after it are
/// retained for a later attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedApplyError {
    /// Queue position of the request that failed.
    pub index: usize,

    /// The failure raised by that request.
    pub error: BulkLoadError,
}

impl fmt::Display for StagedApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "staged request {} failed: {}", self.index, self.error)
    }
}

impl std::error::Error for StagedApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result alias used across the storage core.
pub type StoreResult<T> = Result<T, BulkLoadError>;
