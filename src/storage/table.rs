// Copyright 2026 Tilestore Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! DataTable - the central coordinator of the table engine
//!
//! A table is a horizontal sequence of tile groups plus its index set,
//! foreign keys, clustering state and sampling state. The insert hot path
//! claims a slot in the last tile group, appending a fresh group when it
//! fills; layout transformation rebuilds one tile group under its
//! existing id according to the current default partition.
//!
//! The sampling half of the table (row sampling, sample materialization,
//! cardinalities) lives in the `sample` module.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::core::{Error, ItemPointer, Oid, Result, Schema, Tuple, INVALID_OID};
use crate::storage::backend::Backend;
use crate::storage::catalog::Catalog;
use crate::storage::clusterer::{AccessSample, Clusterer};
use crate::storage::config::{LayoutType, TableOptions, HYBRID_FALLBACK_COLUMN_COUNT};
use crate::storage::index::{Index, IndexType};
use crate::storage::tile_group::{ColumnMap, TileGroup};
use crate::storage::transaction::TransactionManager;

/// Buffered access samples are capped; the oldest are dropped beyond this
const MAX_BUFFERED_SAMPLES: usize = 1024;

/// A foreign-key record owned by the referencing table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Constraint name
    pub constraint_name: String,
    /// Referenced (sink) table oid
    pub sink_table_id: Oid,
    /// Referencing columns in this table
    pub source_column_ids: Vec<Oid>,
    /// Referenced columns in the sink table
    pub sink_column_ids: Vec<Oid>,
}

/// Sampling state guarded by the sample mutex
pub(super) struct SampleState {
    /// Ordered, deduplicated sampled row locations
    pub(super) pointers: Vec<ItemPointer>,
    /// Oid of the materialized sample tile group, INVALID_OID when none
    pub(super) tile_group_id: Oid,
    /// Sample column id -> distinct-value count
    pub(super) cardinality_map: FxHashMap<Oid, usize>,
}

/// An in-memory relational table stored as tile groups
pub struct DataTable {
    pub(super) schema: Schema,
    pub(super) name: String,
    pub(super) database_id: Oid,
    pub(super) table_id: Oid,
    pub(super) options: TableOptions,
    pub(super) catalog: Arc<Catalog>,
    pub(super) txn_manager: Arc<dyn TransactionManager>,
    pub(super) backend: Arc<dyn Backend>,

    /// Ordered tile-group ids; the last entry is the only insert target
    pub(super) tile_groups: Mutex<Vec<Oid>>,
    indexes: RwLock<Vec<Arc<dyn Index>>>,
    foreign_keys: RwLock<Vec<ForeignKey>>,
    has_primary_key: AtomicBool,
    unique_constraint_count: AtomicUsize,

    /// Approximate tuple count; bulk loads may apply fractional deltas
    approx_tuple_count: Mutex<f64>,
    dirty: AtomicBool,
    /// Exact count of tuples inserted through the insert path
    exact_tuple_count: AtomicU64,

    /// Column map applied to new HYBRID tile groups and used as the
    /// transformation target
    default_partition: RwLock<ColumnMap>,
    cluster_samples: Mutex<Vec<AccessSample>>,

    /// Table column -> sample column, inlined columns only, in column order
    pub(super) inline_column_map: BTreeMap<Oid, Oid>,
    /// Per table column: whether it is mapped into samples
    pub(super) sample_column_mask: Vec<bool>,
    /// Pure-columnar map of the sample tile group
    pub(super) sample_column_map: ColumnMap,
    /// One single-column schema per sampled column
    pub(super) sample_schemas: Vec<Schema>,
    pub(super) sample: Mutex<SampleState>,
}

impl DataTable {
    /// Create a table and its first tile group
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        schema: Schema,
        name: impl Into<String>,
        database_id: Oid,
        table_id: Oid,
        options: TableOptions,
        catalog: Arc<Catalog>,
        txn_manager: Arc<dyn TransactionManager>,
        backend: Arc<dyn Backend>,
    ) -> Result<Self> {
        let column_count = schema.column_count();

        // Only inlined columns map into the optimizer sample; the sample
        // tile group is pure columnar with one tile per sampled column.
        let mut inline_column_map = BTreeMap::new();
        let mut sample_column_mask = Vec::with_capacity(column_count);
        let mut sample_column_map = ColumnMap::default();
        let mut sample_schemas = Vec::new();
        let mut sample_column: Oid = 0;
        for column in 0..column_count {
            if schema.is_inlined(column) {
                inline_column_map.insert(column as Oid, sample_column);
                sample_column_mask.push(true);
                sample_column_map.insert(sample_column, (sample_column, 0));
                sample_schemas.push(Schema::single(schema.column(column).clone()));
                sample_column += 1;
            } else {
                debug!(column, "column is not inlined; not mapped into sample");
                sample_column_mask.push(false);
            }
        }

        let table = Self {
            default_partition: RwLock::new(row_layout(column_count)),
            schema,
            name: name.into(),
            database_id,
            table_id,
            options,
            catalog,
            txn_manager,
            backend,
            tile_groups: Mutex::new(Vec::new()),
            indexes: RwLock::new(Vec::new()),
            foreign_keys: RwLock::new(Vec::new()),
            has_primary_key: AtomicBool::new(false),
            unique_constraint_count: AtomicUsize::new(0),
            approx_tuple_count: Mutex::new(0.0),
            dirty: AtomicBool::new(false),
            exact_tuple_count: AtomicU64::new(0),
            cluster_samples: Mutex::new(Vec::new()),
            inline_column_map,
            sample_column_mask,
            sample_column_map,
            sample_schemas,
            sample: Mutex::new(SampleState {
                pointers: Vec::new(),
                tile_group_id: INVALID_OID,
                cardinality_map: FxHashMap::default(),
            }),
        };

        table.add_default_tile_group()?;
        Ok(table)
    }

    // =========================================================================
    // Tuple helper operations
    // =========================================================================

    /// NULL-constraint check against the schema
    fn check_constraints(&self, tuple: &Tuple) -> Result<()> {
        if tuple.column_count() != self.schema.column_count() {
            return Err(Error::TupleColumnsNotMatch {
                expected: self.schema.column_count(),
                got: tuple.column_count(),
            });
        }
        for column in 0..self.schema.column_count() {
            if tuple.is_null(column) && !self.schema.allow_null(column) {
                return Err(Error::not_null_constraint(
                    self.schema.column(column).name.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Claim a slot for the tuple, appending a tile group when the last
    /// one is full
    fn get_tuple_slot(&self, tuple: &Tuple, check_constraints: bool) -> Result<ItemPointer> {
        if check_constraints {
            self.check_constraints(tuple)?;
        }

        loop {
            let tile_group_id = {
                let groups = self.tile_groups.lock();
                *groups
                    .last()
                    .ok_or_else(|| Error::internal("table has no tile groups"))?
            };
            let tile_group = self
                .catalog
                .tile_group(tile_group_id)
                .ok_or_else(|| Error::internal("last tile group missing from catalog"))?;

            if let Some(slot) = tile_group.insert_tuple(tuple)? {
                return Ok(ItemPointer::new(tile_group_id, slot));
            }

            // Full; try to append. Another thread may already have done
            // so, in which case the append backs off and we retry.
            self.add_default_tile_group()?;
        }
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert a tuple, maintaining every index
    ///
    /// Returns [`ItemPointer::INVALID`] when an index refuses the key; the
    /// claimed slot becomes a tombstone reclaimable only by compaction.
    pub fn insert_tuple(&self, tuple: &Tuple) -> Result<ItemPointer> {
        let location = self.get_tuple_slot(tuple, true)?;

        if !self.insert_in_indexes(tuple, location) {
            warn!(%location, "index constraint violated");
            return Ok(ItemPointer::INVALID);
        }

        self.increase_number_of_tuples_by(1.0);
        self.exact_tuple_count.fetch_add(1, Ordering::SeqCst);
        for index in self.indexes.read().iter() {
            index.increase_tuple_count(1);
        }

        Ok(location)
    }

    /// Insert a new version of an existing tuple (constraint-checked)
    ///
    /// Touches secondary indexes only: the primary index is maintained by
    /// the transaction manager during version-chain updates.
    pub fn insert_version(&self, tuple: &Tuple) -> Result<ItemPointer> {
        let location = self.get_tuple_slot(tuple, true)?;

        if !self.insert_in_secondary_indexes(tuple, location) {
            warn!(%location, "index constraint violated");
            return Ok(ItemPointer::INVALID);
        }

        self.increase_number_of_tuples_by(1.0);
        self.exact_tuple_count.fetch_add(1, Ordering::SeqCst);
        Ok(location)
    }

    /// Insert an empty version placeholder (no constraint checks)
    pub fn insert_empty_version(&self, tuple: &Tuple) -> Result<ItemPointer> {
        let location = self.get_tuple_slot(tuple, false)?;

        if !self.insert_in_secondary_indexes(tuple, location) {
            warn!(%location, "index constraint violated");
            return Ok(ItemPointer::INVALID);
        }

        self.increase_number_of_tuples_by(1.0);
        self.exact_tuple_count.fetch_add(1, Ordering::SeqCst);
        Ok(location)
    }

    /// Insert the key projection into every index
    ///
    /// Uniqueness is each index's own responsibility; there is no
    /// visibility pre-check here.
    fn insert_in_indexes(&self, tuple: &Tuple, location: ItemPointer) -> bool {
        for index in self.indexes.read().iter().rev() {
            let key = tuple.project(index.indexed_columns());
            if !index.insert_entry(&key, location) {
                warn!(index = index.name(), "index refused key");
                return false;
            }
        }
        true
    }

    /// Insert the key projection into non-constraint indexes only
    fn insert_in_secondary_indexes(&self, tuple: &Tuple, location: ItemPointer) -> bool {
        for index in self.indexes.read().iter().rev() {
            if index.index_type() != IndexType::Default {
                continue;
            }
            let key = tuple.project(index.indexed_columns());
            if !index.insert_entry(&key, location) {
                warn!(index = index.name(), "index refused key");
                return false;
            }
        }
        true
    }

    // =========================================================================
    // Stats
    // =========================================================================

    /// Increase the approximate tuple count
    pub fn increase_number_of_tuples_by(&self, amount: f64) {
        *self.approx_tuple_count.lock() += amount;
        self.dirty.store(true, Ordering::Release);
    }

    /// Decrease the approximate tuple count
    pub fn decrease_number_of_tuples_by(&self, amount: f64) {
        *self.approx_tuple_count.lock() -= amount;
        self.dirty.store(true, Ordering::Release);
    }

    /// Set the approximate tuple count
    pub fn set_number_of_tuples(&self, count: f64) {
        *self.approx_tuple_count.lock() = count;
        self.dirty.store(true, Ordering::Release);
    }

    /// The approximate tuple count
    pub fn number_of_tuples(&self) -> f64 {
        *self.approx_tuple_count.lock()
    }

    /// The exact count of tuples inserted through the insert path
    #[inline]
    pub fn exact_tuple_count(&self) -> u64 {
        self.exact_tuple_count.load(Ordering::SeqCst)
    }

    /// Whether the stats have changed since the last reset
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Reset the dirty flag
    pub fn reset_dirty(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    // =========================================================================
    // Tile groups
    // =========================================================================

    /// The column map a fresh tile group gets under `layout`
    pub fn tile_group_layout(&self, layout: LayoutType) -> ColumnMap {
        let column_count = self.schema.column_count();
        match layout {
            LayoutType::Row => row_layout(column_count),
            LayoutType::Column => {
                let mut map = ColumnMap::default();
                for column in 0..column_count {
                    map.insert(column as Oid, (column as Oid, 0));
                }
                map
            }
            LayoutType::Hybrid => {
                if column_count < HYBRID_FALLBACK_COLUMN_COUNT {
                    row_layout(column_count)
                } else {
                    self.default_partition.read().clone()
                }
            }
        }
    }

    /// Allocate and append a tile group with the configured layout
    ///
    /// Backs off returning `INVALID_OID` when the current last tile group
    /// still has free slots (another thread appended first).
    pub fn add_default_tile_group(&self) -> Result<Oid> {
        let column_map = self.tile_group_layout(self.options.layout_mode);
        let tile_group_id = self.catalog.next_oid();
        let schemas = build_tile_schemas(&self.schema, &column_map)?;
        let tile_group = Arc::new(TileGroup::new(
            self.database_id,
            self.table_id,
            tile_group_id,
            schemas,
            column_map,
            self.options.tuples_per_tilegroup,
            Arc::clone(&self.backend),
            self.options.pool_chunk_size,
        )?);

        let mut groups = self.tile_groups.lock();

        if let Some(&last_id) = groups.last() {
            let last = self
                .catalog
                .tile_group(last_id)
                .ok_or_else(|| Error::internal("last tile group missing from catalog"))?;
            if last.next_tuple_slot() < last.allocated_tuple_count() {
                debug!(
                    tile_group_id = last_id,
                    "slots remain in last tile group; not appending"
                );
                return Ok(INVALID_OID);
            }
        }

        debug!(tile_group_id, "appending tile group");
        groups.push(tile_group_id);
        self.catalog.add_tile_group(tile_group_id, tile_group);
        Ok(tile_group_id)
    }

    /// Append a ROW-layout tile group under a caller-chosen oid
    /// (recovery path); no free-slot check is performed
    pub fn add_tile_group_with_oid(&self, tile_group_id: Oid) -> Result<()> {
        let column_map = row_layout(self.schema.column_count());
        let schemas = vec![self.schema.clone()];
        let tile_group = Arc::new(TileGroup::new(
            self.database_id,
            self.table_id,
            tile_group_id,
            schemas,
            column_map,
            self.options.tuples_per_tilegroup,
            Arc::clone(&self.backend),
            self.options.pool_chunk_size,
        )?);

        let mut groups = self.tile_groups.lock();
        groups.push(tile_group_id);
        self.catalog.add_tile_group(tile_group_id, tile_group);
        Ok(())
    }

    /// Number of tile groups
    pub fn tile_group_count(&self) -> usize {
        self.tile_groups.lock().len()
    }

    /// The tile-group id at the given offset
    pub fn tile_group_id_at(&self, offset: usize) -> Option<Oid> {
        self.tile_groups.lock().get(offset).copied()
    }

    /// Resolve the tile group at the given offset through the catalog
    pub fn tile_group(&self, offset: usize) -> Option<Arc<TileGroup>> {
        let id = self.tile_group_id_at(offset)?;
        self.catalog.tile_group(id)
    }

    /// Resolve a tile group by id through the catalog
    pub fn tile_group_by_id(&self, tile_group_id: Oid) -> Option<Arc<TileGroup>> {
        self.catalog.tile_group(tile_group_id)
    }

    // =========================================================================
    // Layout transformation
    // =========================================================================

    /// Rebuild the tile group at `offset` according to the default
    /// partition
    ///
    /// Returns `None` when the offset is unknown or the layout difference
    /// is below `theta`. The rebuilt group keeps its id, capacity and
    /// header; the catalog entry is replaced atomically, so readers
    /// holding the old group keep using it safely until drop.
    pub fn transform_tile_group(
        &self,
        offset: usize,
        theta: f64,
    ) -> Result<Option<Arc<TileGroup>>> {
        let tile_group_id = match self.tile_group_id_at(offset) {
            Some(id) => id,
            None => {
                warn!(offset, "tile group offset not found in table");
                return Ok(None);
            }
        };
        let tile_group = self
            .catalog
            .tile_group(tile_group_id)
            .ok_or_else(|| Error::internal("tile group missing from catalog"))?;

        let default_partition = self.default_partition.read().clone();
        let diff = tile_group.schema_difference(&default_partition);
        if diff < theta {
            return Ok(None);
        }

        let schemas = transform_tile_schemas(&tile_group, &default_partition)?;
        let new_tile_group = Arc::new(TileGroup::new(
            tile_group.database_id(),
            tile_group.table_id(),
            tile_group.tile_group_id(),
            schemas,
            default_partition,
            tile_group.allocated_tuple_count(),
            Arc::clone(&self.backend),
            self.options.pool_chunk_size,
        )?);

        copy_transformed(&tile_group, &new_tile_group)?;

        debug!(tile_group_id, diff, "transformed tile group layout");
        self.catalog
            .add_tile_group(tile_group_id, Arc::clone(&new_tile_group));
        Ok(Some(new_tile_group))
    }

    // =========================================================================
    // Clustering
    // =========================================================================

    /// Buffer an access sample for the next partition update
    pub fn record_sample(&self, sample: AccessSample) {
        let mut samples = self.cluster_samples.lock();
        if samples.len() >= MAX_BUFFERED_SAMPLES {
            samples.remove(0);
        }
        samples.push(sample);
    }

    /// Feed the buffered samples to the clusterer and install its
    /// partitioning as the default partition
    pub fn update_default_partition(&self) {
        let mut clusterer = Clusterer::new(
            self.options.cluster_count,
            self.schema.column_count(),
            self.options.new_sample_weight,
        );

        {
            let mut samples = self.cluster_samples.lock();
            if samples.is_empty() {
                return;
            }
            for sample in samples.iter() {
                clusterer.process_sample(sample);
            }
            samples.clear();
        }

        let partition = clusterer.partitioning(self.options.max_tiles);
        *self.default_partition.write() = partition;
    }

    /// The current default partition
    pub fn default_partition(&self) -> ColumnMap {
        self.default_partition.read().clone()
    }

    /// Install an explicit default partition (transformation target)
    pub fn set_default_partition(&self, partition: ColumnMap) {
        *self.default_partition.write() = partition;
    }

    /// Per-tile column counts of the default partition
    pub fn column_map_stats(&self) -> BTreeMap<Oid, usize> {
        let mut stats = BTreeMap::new();
        for &(tile, _) in self.default_partition.read().values() {
            *stats.entry(tile).or_insert(0) += 1;
        }
        stats
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    /// Register an index
    pub fn add_index(&self, index: Arc<dyn Index>) {
        match index.index_type() {
            IndexType::PrimaryKey => {
                self.has_primary_key.store(true, Ordering::Release);
            }
            IndexType::Unique => {
                self.unique_constraint_count.fetch_add(1, Ordering::SeqCst);
            }
            IndexType::Default => {}
        }
        self.indexes.write().push(index);
    }

    /// The index at the given offset
    pub fn index(&self, offset: usize) -> Option<Arc<dyn Index>> {
        self.indexes.read().get(offset).cloned()
    }

    /// Find an index by oid
    pub fn index_with_oid(&self, index_oid: Oid) -> Option<Arc<dyn Index>> {
        self.indexes
            .read()
            .iter()
            .find(|index| index.oid() == index_oid)
            .cloned()
    }

    /// Drop an index by oid
    pub fn drop_index_with_oid(&self, index_oid: Oid) {
        self.indexes.write().retain(|index| index.oid() != index_oid);
    }

    /// Number of registered indexes
    pub fn index_count(&self) -> usize {
        self.indexes.read().len()
    }

    /// Whether a primary-key index is registered
    pub fn has_primary_key(&self) -> bool {
        self.has_primary_key.load(Ordering::Acquire)
    }

    /// Number of unique constraints
    pub fn unique_constraint_count(&self) -> usize {
        self.unique_constraint_count.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Foreign keys
    // =========================================================================

    /// Register a foreign-key record
    pub fn add_foreign_key(&self, key: ForeignKey) {
        self.foreign_keys.write().push(key);
    }

    /// The foreign key at the given offset
    pub fn foreign_key(&self, offset: usize) -> Option<ForeignKey> {
        self.foreign_keys.read().get(offset).cloned()
    }

    /// Drop the foreign key at the given offset
    pub fn drop_foreign_key(&self, offset: usize) {
        let mut keys = self.foreign_keys.write();
        if offset < keys.len() {
            keys.remove(offset);
        }
    }

    /// Number of foreign keys
    pub fn foreign_key_count(&self) -> usize {
        self.foreign_keys.read().len()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The table schema
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Table name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning database oid
    #[inline]
    pub fn database_id(&self) -> Oid {
        self.database_id
    }

    /// This table's oid
    #[inline]
    pub fn table_id(&self) -> Oid {
        self.table_id
    }

    /// The table's options
    #[inline]
    pub fn options(&self) -> &TableOptions {
        &self.options
    }
}

impl fmt::Display for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "table '{}' ({} tile groups)", self.name, self.tile_group_count())?;
        let mut total = 0;
        for offset in 0..self.tile_group_count() {
            if let Some(group) = self.tile_group(offset) {
                total += group.next_tuple_slot();
                write!(f, "{}", group)?;
            }
        }
        writeln!(f, "tuple count: {}", total)
    }
}

impl Drop for DataTable {
    fn drop(&mut self) {
        for &id in self.tile_groups.lock().iter() {
            self.catalog.drop_tile_group(id);
        }
        let sample = self.sample.lock();
        if sample.tile_group_id != INVALID_OID {
            self.catalog.drop_tile_group(sample.tile_group_id);
        }
    }
}

/// The ROW layout: every column in tile 0, in table order
pub(super) fn row_layout(column_count: usize) -> ColumnMap {
    let mut map = ColumnMap::default();
    for column in 0..column_count {
        map.insert(column as Oid, (0, column as Oid));
    }
    map
}

/// Regroup a table schema into per-tile schemas according to a column map
///
/// Tiles are ordered by tile ordinal; within a tile, columns sit at their
/// mapped positions. Fails when the map is not a dense bijection.
pub(super) fn build_tile_schemas(schema: &Schema, column_map: &ColumnMap) -> Result<Vec<Schema>> {
    let mut placed: BTreeMap<(Oid, Oid), Oid> = BTreeMap::new();
    for (&column, &placement) in column_map.iter() {
        if placed.insert(placement, column).is_some() {
            return Err(Error::internal("column map is not a bijection"));
        }
    }

    let mut tiles: BTreeMap<Oid, Vec<crate::core::Column>> = BTreeMap::new();
    for (&(tile, _), &column) in placed.iter() {
        tiles
            .entry(tile)
            .or_default()
            .push(schema.column(column as usize).clone());
    }
    Ok(tiles.into_values().map(Schema::new).collect())
}

/// Derive the transformed tile group's schema list by routing every
/// column of the target map through the old group's layout
fn transform_tile_schemas(tile_group: &TileGroup, column_map: &ColumnMap) -> Result<Vec<Schema>> {
    let mut placed: BTreeMap<(Oid, Oid), crate::core::Column> = BTreeMap::new();
    for (&column, &(new_tile, new_column)) in column_map.iter() {
        let (old_tile, old_column) = tile_group
            .locate_tile_and_column(column)
            .ok_or_else(|| Error::internal("column missing from source tile group"))?;
        let definition = tile_group.tile_schemas()[old_tile as usize]
            .column(old_column as usize)
            .clone();
        if placed.insert((new_tile, new_column), definition).is_some() {
            return Err(Error::internal("column map is not a bijection"));
        }
    }

    let mut tiles: BTreeMap<Oid, Vec<crate::core::Column>> = BTreeMap::new();
    for ((tile, _), definition) in placed {
        tiles.entry(tile).or_default().push(definition);
    }
    Ok(tiles.into_values().map(Schema::new).collect())
}

/// Copy a tile group's cells column-at-a-time and its header bit-for-bit
fn copy_transformed(old: &TileGroup, new: &TileGroup) -> Result<()> {
    debug_assert_eq!(old.column_map().len(), new.column_map().len());
    let tuple_count = old.allocated_tuple_count();

    for &column in old.column_map().keys() {
        let (old_tile, old_column) = old
            .locate_tile_and_column(column)
            .ok_or_else(|| Error::internal("column missing from source tile group"))?;
        let (new_tile, new_column) = new
            .locate_tile_and_column(column)
            .ok_or_else(|| Error::internal("column missing from transformed tile group"))?;
        for row in 0..tuple_count {
            let value = old
                .tile(old_tile as usize)
                .value_at(row, old_column as usize)?;
            new.tile(new_tile as usize)
                .set_value_at(row, new_column as usize, &value)?;
        }
    }

    new.header().copy_from(old.header());
    Ok(())
}
