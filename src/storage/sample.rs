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

//! Row sampling for the optimizer
//!
//! The sampler reservoir-samples visible row locations, materializes them
//! into a purpose-built columnar tile group (one tile per sampled inlined
//! column) and computes per-column cardinalities by hashing the sampled
//! values into a set. All of the sample lifecycle runs under the table's
//! sample mutex; retaking a sample drops the previous materialization.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::core::{Error, ItemPointer, Oid, Result, INVALID_OID};
use crate::storage::table::DataTable;
use crate::storage::tile_group::TileGroup;

/// Sampling gives up after this many rounds of draws
const MAX_SAMPLE_ROUNDS: usize = 10;

impl DataTable {
    /// Sample up to `sample_size` visible rows
    ///
    /// Draws uniform row ids from a seeded PRNG and keeps the visible
    /// ones in an ordered, deduplicated set; a fixed round cap bounds the
    /// work under pathological visibility instead of rejection-sampling
    /// forever. When the request covers the whole table the rows are
    /// enumerated directly and visibility is skipped (the read-only
    /// optimizer transaction sees them all).
    ///
    /// Returns the achieved sample size, which may be less than requested.
    pub fn sample_rows(&self, sample_size: usize) -> Result<usize> {
        debug!(sample_size, "starting new row sample");
        let mut state = self.sample.lock();

        // retaking a sample invalidates everything derived from the old one
        state.pointers.clear();
        if state.tile_group_id != INVALID_OID {
            debug!("dropping previously materialized sample tile group");
            self.catalog.drop_tile_group(state.tile_group_id);
            state.tile_group_id = INVALID_OID;
        }
        state.cardinality_map.clear();

        let total = self.exact_tuple_count() as usize;
        let tuples_per_tilegroup = self.options.tuples_per_tilegroup;
        let mut row_ids: BTreeSet<usize> = BTreeSet::new();

        if sample_size >= total {
            for row in 0..total {
                row_ids.insert(row);
            }
        } else {
            let mut rng = StdRng::seed_from_u64(self.options.sample_seed);
            let mut round = 0;
            while row_ids.len() < sample_size && round < MAX_SAMPLE_ROUNDS {
                for _ in 0..sample_size {
                    let row = rng.gen_range(0..total);
                    let offset = row / tuples_per_tilegroup;
                    let slot = (row % tuples_per_tilegroup) as Oid;
                    let tile_group = self
                        .tile_group(offset)
                        .ok_or_else(|| Error::internal("sampled row in missing tile group"))?;
                    if self.txn_manager.visible(tile_group.header(), slot) {
                        row_ids.insert(row);
                    }
                    if row_ids.len() >= sample_size {
                        break;
                    }
                }
                round += 1;
            }
        }

        // convert ordered row ids into item pointers through the id
        // vector, so later layout transformations cannot strand them
        let groups = self.tile_groups.lock();
        for &row in &row_ids {
            let offset = row / tuples_per_tilegroup;
            let slot = (row % tuples_per_tilegroup) as Oid;
            let tile_group_id = *groups
                .get(offset)
                .ok_or_else(|| Error::internal("sampled row in missing tile group"))?;
            state.pointers.push(ItemPointer::new(tile_group_id, slot));
        }

        Ok(row_ids.len())
    }

    /// Materialize the current sample into a columnar sample tile group
    ///
    /// The sample tile group has one single-column tile per sampled
    /// (inlined) column and exactly as many slots as the sample has rows.
    /// Any previously materialized sample tile group is dropped first.
    pub fn materialize_sample(&self) -> Result<()> {
        let mut state = self.sample.lock();
        if state.pointers.is_empty() {
            debug!("sample not taken yet; nothing to materialize");
            return Ok(());
        }

        if state.tile_group_id != INVALID_OID {
            debug!("dropping previously materialized sample tile group");
            self.catalog.drop_tile_group(state.tile_group_id);
            state.tile_group_id = INVALID_OID;
        }

        let tile_group_id = self.catalog.next_oid();
        let sample_group = Arc::new(TileGroup::new(
            self.database_id,
            self.table_id,
            tile_group_id,
            self.sample_schemas.clone(),
            self.sample_column_map.clone(),
            state.pointers.len(),
            Arc::clone(&self.backend),
            self.options.pool_chunk_size,
        )?);

        state.tile_group_id = tile_group_id;
        self.catalog
            .add_tile_group(tile_group_id, Arc::clone(&sample_group));

        // walk the sampled pointers, copying each inlined column value
        // from its source tile into the claimed sample slot
        for pointer in &state.pointers {
            let source = self
                .catalog
                .tile_group(pointer.block)
                .ok_or_else(|| Error::internal("sampled tile group missing from catalog"))?;
            let sample_row = sample_group
                .header()
                .claim_next_slot()
                .ok_or_else(|| Error::internal("sample tile group full"))?;

            for (&table_column, &sample_column) in &self.inline_column_map {
                let value = source.value_at(pointer.offset as usize, table_column)?;
                let (tile, tile_column) = sample_group
                    .locate_tile_and_column(sample_column)
                    .ok_or_else(|| Error::internal("sample column missing from map"))?;
                // pure columnar: one column per tile
                debug_assert_eq!(tile, sample_column);
                debug_assert_eq!(tile_column, 0);
                sample_group.tile(tile as usize).set_value_at(
                    sample_row as usize,
                    tile_column as usize,
                    &value,
                )?;
            }
        }

        Ok(())
    }

    /// Count distinct values of a sample column by hashing into a set
    ///
    /// Stores the count in the cardinality map. A no-op when no sample
    /// has been materialized or the column is unknown.
    pub fn compute_sample_cardinality(&self, sample_column: Oid) -> Result<()> {
        let mut state = self.sample.lock();
        if state.tile_group_id == INVALID_OID {
            warn!("no materialized sample; cannot compute cardinality");
            return Ok(());
        }
        let sample_group = self
            .catalog
            .tile_group(state.tile_group_id)
            .ok_or_else(|| Error::internal("sample tile group missing from catalog"))?;

        let (tile, tile_column) = match sample_group.locate_tile_and_column(sample_column) {
            Some(position) => position,
            None => {
                warn!(sample_column, "sample column not found");
                return Ok(());
            }
        };
        debug_assert_eq!(tile_column, 0);

        let mut distinct: FxHashSet<u64> = FxHashSet::default();
        for row in 0..state.pointers.len() {
            let value = sample_group
                .tile(tile as usize)
                .value_at(row, tile_column as usize)?;
            distinct.insert(value.mix_hash());
        }

        state.cardinality_map.insert(sample_column, distinct.len());
        Ok(())
    }

    /// Compute the cardinality of a table column through the sample
    ///
    /// A no-op with a warning when the column is not sampled (non-inlined
    /// or unknown).
    pub fn compute_table_cardinality(&self, table_column: Oid) -> Result<()> {
        match self.inline_column_map.get(&table_column) {
            Some(&sample_column) => self.compute_sample_cardinality(sample_column),
            None => {
                warn!(table_column, "table column not sampled (non-inlined?)");
                Ok(())
            }
        }
    }

    /// The computed cardinality of a sample column, 0 when unknown
    pub fn sample_cardinality(&self, sample_column: Oid) -> usize {
        self.sample
            .lock()
            .cardinality_map
            .get(&sample_column)
            .copied()
            .unwrap_or(0)
    }

    /// Whether a table column is mapped into samples
    pub fn is_column_sampled(&self, table_column: Oid) -> bool {
        self.sample_column_mask
            .get(table_column as usize)
            .copied()
            .unwrap_or(false)
    }

    /// The computed cardinality of a table column, 0 when not sampled
    pub fn table_cardinality(&self, table_column: Oid) -> usize {
        match self.inline_column_map.get(&table_column) {
            Some(&sample_column) => self.sample_cardinality(sample_column),
            None => 0,
        }
    }

    /// Number of rows in the current sample
    pub fn optimizer_sample_size(&self) -> usize {
        self.sample.lock().pointers.len()
    }

    /// The sampled row locations, in row order
    pub fn optimizer_sample(&self) -> Vec<ItemPointer> {
        self.sample.lock().pointers.clone()
    }

    /// The materialized sample tile group, if any
    pub fn sample_tile_group(&self) -> Option<Arc<TileGroup>> {
        let state = self.sample.lock();
        if state.tile_group_id == INVALID_OID {
            return None;
        }
        self.catalog.tile_group(state.tile_group_id)
    }
}
