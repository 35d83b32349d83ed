//! Bulk loading: create, overwrite, and migrate entities in batches.
//!
//! [`TableData`] is the request format: a row count, an optional explicit
//! entity list, and a set of type terms each paired with a value buffer or an
//! explicit absence. [`set_with_data`] applies one request against the world
//! in a single pass per row.
//!
//! ## Per-row outcome
//!
//! The requested terms canonicalize to one destination table. Each row then
//! takes exactly one path depending on where its entity currently lives:
//!
//! - **Create**: the entity is unknown. A row is appended to the destination
//!   with defaults, then provided buffers overwrite their columns.
//! - **Overwrite**: the entity already lives in the destination table.
//!   Provided buffers overwrite in place; absent columns keep their values.
//! - **Migrate**: the entity lives in a different table. A destination row is
//!   built by carrying forward every shared component the request does not
//!   overwrite, then writing the provided buffers; the source row is removed
//!   last and the displaced entity's record republished.
//!
//! ## Validation
//!
//! The whole request is validated before any table is touched: length
//! mismatches, unregistered components, buffers paired with dataless terms,
//! buffer element-type mismatches, and invalid relationship targets all
//! reject the call with the world unchanged.

use smallvec::SmallVec;
use tracing::trace;

use crate::engine::entity::{EntityAllocator, EntityIndex, Record};
use crate::engine::error::{BulkLoadError, StoreResult, TableError};
use crate::engine::hierarchy::realize_target;
use crate::engine::registry::{ComponentRegistry, TableRegistry};
use crate::engine::storage::{ColumnData, ColumnSource, Component};
use crate::engine::table::Table;
use crate::engine::types::{ComponentID, Entity, TableID, TableType, TypeTerm};

/// One bulk-load request: `row_count` rows of data for a set of terms.
///
/// Built with the `with_*` methods; the term list in any order describes the
/// destination type. A term without a buffer means "no new data": defaults
/// for created entities, preserved values for existing ones. Tag and
/// relationship terms never carry buffers.
pub struct TableData {
    row_count: usize,
    entities: Option<Vec<Entity>>,
    columns: Vec<(TypeTerm, ColumnData)>,
}

impl TableData {
    /// Starts a request for `row_count` rows.
    pub fn new(row_count: usize) -> Self {
        Self {
            row_count,
            entities: None,
            columns: Vec::new(),
        }
    }

    /// Supplies explicit entity identities, one per row.
    ///
    /// Without this, identities are allocated contiguously by the world.
    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = Some(entities);
        self
    }

    /// Adds a data-bearing component term with a buffer of values, one per
    /// row.
    pub fn with_column<T: Component>(
        mut self,
        component_id: ComponentID,
        values: Vec<T>,
    ) -> Self {
        self.columns
            .push((TypeTerm::Component(component_id), ColumnData::values(values)));
        self
    }

    /// Adds a component term without data; created rows get the default
    /// value, existing rows keep theirs.
    pub fn with_component(mut self, component_id: ComponentID) -> Self {
        self.columns
            .push((TypeTerm::Component(component_id), ColumnData::Missing));
        self
    }

    /// Adds a dataless term (`Tag`, `ChildOf`, or `InstanceOf`).
    pub fn with_term(mut self, term: TypeTerm) -> Self {
        self.columns.push((term, ColumnData::Missing));
        self
    }

    /// Number of rows the request describes.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    fn table_type(&self) -> TableType {
        let terms: Vec<TypeTerm> = self.columns.iter().map(|(term, _)| *term).collect();
        TableType::from_terms(&terms)
    }

    fn validate(&self, components: &ComponentRegistry) -> StoreResult<()> {
        if let Some(entities) = &self.entities {
            if entities.len() != self.row_count {
                return Err(BulkLoadError::EntityLengthMismatch {
                    row_count: self.row_count,
                    entities: entities.len(),
                });
            }
        }
        for (term, data) in &self.columns {
            match *term {
                TypeTerm::Component(component_id) => {
                    if !components.contains(component_id) {
                        return Err(BulkLoadError::UnknownComponent { component_id });
                    }
                    if let ColumnData::Values(source) = data {
                        if source.len() != self.row_count {
                            return Err(BulkLoadError::ColumnLengthMismatch {
                                component_id,
                                row_count: self.row_count,
                                values: source.len(),
                            });
                        }
                        // Element type disagreement is caller error; catch it
                        // before any table is mutated.
                        if components.type_id(component_id) != Some(source.element_type_id()) {
                            return Err(BulkLoadError::ColumnTypeMismatch { component_id });
                        }
                    }
                }
                TypeTerm::Tag(target)
                | TypeTerm::ChildOf(target)
                | TypeTerm::InstanceOf(target) => {
                    if !data.is_missing() {
                        return Err(BulkLoadError::DataForDatalessTerm);
                    }
                    if target.id() == 0 {
                        return Err(BulkLoadError::UnresolvedTarget { target });
                    }
                }
            }
        }
        Ok(())
    }

    fn provided(&self) -> SmallVec<[(ComponentID, &dyn ColumnSource); 8]> {
        self.columns
            .iter()
            .filter_map(|(term, data)| match (term, data) {
                (TypeTerm::Component(id), ColumnData::Values(source)) => {
                    Some((*id, source.as_ref()))
                }
                _ => None,
            })
            .collect()
    }
}

/// Applies one bulk-load request and returns the entity of the first row.
///
/// ## Behavior
/// See the module docs for the per-row outcomes. Explicit identities may mix
/// all three outcomes within one call; generated identities always create.
/// A zero-row request only resolves (and creates, if needed) the destination
/// table and returns the invalid handle.
///
/// ## Errors
/// Contract violations reject the call before any mutation. Table-level
/// failures after validation surface as [`BulkLoadError::Table`].
pub fn set_with_data(
    components: &ComponentRegistry,
    tables: &mut TableRegistry,
    index: &mut EntityIndex,
    allocator: &mut EntityAllocator,
    data: &TableData,
) -> StoreResult<Entity> {
    data.validate(components)?;

    let table_type = data.table_type();
    for term in table_type.iter() {
        if let Some(target) = term.dataless_target() {
            realize_target(tables, index, allocator, target)?;
        }
    }

    let destination = tables.table_for(&table_type, components)?;
    if data.row_count == 0 {
        return Ok(Entity(0));
    }

    let provided = data.provided();
    let base = match &data.entities {
        Some(_) => Entity(0),
        None => allocator.reserve(data.row_count),
    };
    let entity_for = |row: usize| match &data.entities {
        Some(entities) => entities[row],
        None => Entity(base.id() + row as u64),
    };

    trace!(
        rows = data.row_count,
        table = destination,
        explicit = data.entities.is_some(),
        "applying bulk load"
    );

    for src_index in 0..data.row_count {
        let entity = entity_for(src_index);
        match index.lookup(entity) {
            None => {
                let table = tables.table_mut(destination);
                let row = table.push_row(entity);
                write_provided(table, &provided, src_index, row)?;
                index.insert_or_update(
                    entity,
                    Record {
                        table: destination,
                        row,
                    },
                );
                allocator.observe(entity);
            }
            Some(record) if record.table == destination => {
                let table = tables.table_mut(destination);
                write_provided(table, &provided, src_index, record.row)?;
            }
            Some(record) => {
                migrate_row(
                    tables,
                    index,
                    &provided,
                    entity,
                    record,
                    destination,
                    src_index,
                )?;
                allocator.observe(entity);
            }
        }
    }

    tables.table(destination).check_alignment()?;
    Ok(entity_for(0))
}

/// Moves one entity's row from its current table into `destination`.
///
/// Order matters: the destination row is fully built (carry-forward, then
/// provided buffers) while the source row is still live, the source row is
/// removed, the displaced entity's record is republished, and only then is
/// the migrated entity's record published.
fn migrate_row(
    tables: &mut TableRegistry,
    index: &mut EntityIndex,
    provided: &[(ComponentID, &dyn ColumnSource)],
    entity: Entity,
    record: Record,
    destination: TableID,
    src_index: usize,
) -> StoreResult<()> {
    let (source_table, dest_table) = tables.pair_mut(record.table, destination);
    let row = dest_table.push_row(entity);

    let carried: SmallVec<[ComponentID; 8]> = dest_table
        .table_type()
        .components()
        .filter(|id| !provided.iter().any(|(pid, _)| pid == id))
        .filter(|id| source_table.has_column(*id))
        .collect();
    for component_id in carried {
        let source_column = source_table
            .column(component_id)
            .ok_or(TableError::MissingColumn { component_id })?;
        dest_table
            .column_mut(component_id)
            .ok_or(TableError::MissingColumn { component_id })?
            .clone_value_from(source_column, record.row, row)
            .map_err(TableError::Column)?;
    }
    write_provided(dest_table, provided, src_index, row)?;

    let displaced = source_table.remove_row(record.row)?;
    if let Some(displaced) = displaced {
        index.insert_or_update(
            displaced,
            Record {
                table: record.table,
                row: record.row,
            },
        );
    }
    index.insert_or_update(
        entity,
        Record {
            table: destination,
            row,
        },
    );
    Ok(())
}

fn write_provided(
    table: &mut Table,
    provided: &[(ComponentID, &dyn ColumnSource)],
    src_index: usize,
    row: usize,
) -> StoreResult<()> {
    for (component_id, source) in provided {
        let column = table
            .column_mut(*component_id)
            .ok_or(TableError::MissingColumn {
                component_id: *component_id,
            })?;
        source
            .write_to(column, src_index, row)
            .map_err(TableError::Column)?;
    }
    Ok(())
}
