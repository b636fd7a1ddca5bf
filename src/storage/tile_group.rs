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

//! Tile group - a horizontal shard of a table, vertically partitioned
//! into tiles
//!
//! ```text
//! < <Tile 0> <Tile 1> .. <Tile n> >
//! ```
//!
//! A tile group has a fixed tuple capacity shared by all its tiles and a
//! column map that routes every table column to its `(tile, column)`
//! position. MVCC state lives in the [`TileGroupHeader`].

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{
    CommitId, Error, ItemPointer, Oid, Result, Schema, Tuple, Value, INVALID_TXN_ID, MAX_COMMIT_ID,
};
use crate::storage::backend::Backend;
use crate::storage::tile::Tile;
use crate::storage::tile_group_header::TileGroupHeader;

/// Mapping from table column ordinal to `(tile ordinal, column-in-tile)`
pub type ColumnMap = FxHashMap<Oid, (Oid, Oid)>;

/// A group of tiles holding the same row range of a table
pub struct TileGroup {
    database_id: Oid,
    table_id: Oid,
    tile_group_id: Oid,
    tile_schemas: Vec<Schema>,
    tiles: Vec<Tile>,
    header: TileGroupHeader,
    column_map: ColumnMap,
    capacity: usize,
}

impl TileGroup {
    /// Build a tile group with one tile per entry in `schemas`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        database_id: Oid,
        table_id: Oid,
        tile_group_id: Oid,
        schemas: Vec<Schema>,
        column_map: ColumnMap,
        capacity: usize,
        backend: Arc<dyn Backend>,
        pool_chunk_size: usize,
    ) -> Result<Self> {
        let mut tiles = Vec::with_capacity(schemas.len());
        for schema in &schemas {
            tiles.push(Tile::new(
                schema.clone(),
                capacity,
                Arc::clone(&backend),
                pool_chunk_size,
            )?);
        }

        Ok(Self {
            database_id,
            table_id,
            tile_group_id,
            tile_schemas: schemas,
            tiles,
            header: TileGroupHeader::new(capacity),
            column_map,
            capacity,
        })
    }

    /// Insert a tuple at the next available slot, or `None` when full
    ///
    /// The slot claim is wait-free; cell writes go through the column map.
    /// The claimed slot keeps its empty-slot MVCC sentinel values until
    /// the transaction layer stamps ownership.
    pub fn insert_tuple(&self, tuple: &Tuple) -> Result<Option<Oid>> {
        if tuple.column_count() != self.column_map.len() {
            return Err(Error::TupleColumnsNotMatch {
                expected: self.column_map.len(),
                got: tuple.column_count(),
            });
        }

        let slot = match self.header.claim_next_slot() {
            Some(slot) => slot,
            None => return Ok(None),
        };

        self.copy_tuple(tuple, slot)?;
        Ok(Some(slot))
    }

    /// Write a tuple at a specific slot, stamping `begin_cid = commit_id`
    ///
    /// Recovery and checkpoint paths use this; the claim watermark is
    /// raised to cover the slot.
    pub fn insert_tuple_at(&self, slot: Oid, tuple: &Tuple, commit_id: CommitId) -> Result<()> {
        if !self.header.claim_slot_at(slot) {
            debug_assert!(false, "slot {} out of bounds", slot);
            return Err(Error::OutOfBounds {
                what: "slot",
                got: slot as usize,
                limit: self.capacity,
            });
        }
        self.copy_tuple(tuple, slot)?;
        self.header.set_version(
            slot,
            INVALID_TXN_ID,
            commit_id,
            MAX_COMMIT_ID,
            ItemPointer::INVALID,
        );
        Ok(())
    }

    fn copy_tuple(&self, tuple: &Tuple, slot: Oid) -> Result<()> {
        for column in 0..tuple.column_count() {
            let (tile, tile_column) = self
                .locate_tile_and_column(column as Oid)
                .ok_or_else(|| Error::internal(format!("column {} not in column map", column)))?;
            self.tiles[tile as usize].set_value_at(
                slot as usize,
                tile_column as usize,
                tuple.value(column),
            )?;
        }
        Ok(())
    }

    /// Resolve a table column to its `(tile, column-in-tile)` position
    #[inline]
    pub fn locate_tile_and_column(&self, column: Oid) -> Option<(Oid, Oid)> {
        self.column_map.get(&column).copied()
    }

    /// Read a value by table column ordinal, routing through the column map
    pub fn value_at(&self, row: usize, column: Oid) -> Result<Value> {
        let (tile, tile_column) = self
            .locate_tile_and_column(column)
            .ok_or_else(|| Error::internal(format!("column {} not in column map", column)))?;
        self.tiles[tile as usize].value_at(row, tile_column as usize)
    }

    /// Fraction of columns whose `(tile, column)` placement differs from
    /// `target_map`
    ///
    /// Gates layout transformation: 0.0 means identical layouts.
    pub fn schema_difference(&self, target_map: &ColumnMap) -> f64 {
        if self.column_map.is_empty() {
            return 0.0;
        }
        let differing = self
            .column_map
            .iter()
            .filter(|(column, placement)| target_map.get(column) != Some(placement))
            .count();
        differing as f64 / self.column_map.len() as f64
    }

    /// The tile at the given ordinal
    #[inline]
    pub fn tile(&self, tile_offset: usize) -> &Tile {
        &self.tiles[tile_offset]
    }

    /// Number of tiles
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Per-tile schemas, in tile order
    #[inline]
    pub fn tile_schemas(&self) -> &[Schema] {
        &self.tile_schemas
    }

    /// The MVCC header
    #[inline]
    pub fn header(&self) -> &TileGroupHeader {
        &self.header
    }

    /// The column map
    #[inline]
    pub fn column_map(&self) -> &ColumnMap {
        &self.column_map
    }

    /// Slots claimed so far
    #[inline]
    pub fn next_tuple_slot(&self) -> usize {
        self.header.next_tuple_slot()
    }

    /// Total tuple slots allocated at creation
    #[inline]
    pub fn allocated_tuple_count(&self) -> usize {
        self.capacity
    }

    /// This tile group's globally unique id
    #[inline]
    pub fn tile_group_id(&self) -> Oid {
        self.tile_group_id
    }

    /// Owning database oid
    #[inline]
    pub fn database_id(&self) -> Oid {
        self.database_id
    }

    /// Owning table oid
    #[inline]
    pub fn table_id(&self) -> Oid {
        self.table_id
    }
}

impl fmt::Display for TileGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "tile group {} ({}/{} slots, {} tiles)",
            self.tile_group_id,
            self.next_tuple_slot(),
            self.capacity,
            self.tiles.len()
        )?;
        for (i, schema) in self.tile_schemas.iter().enumerate() {
            let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
            writeln!(f, "  tile {}: [{}]", i, names.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};
    use crate::storage::backend::HeapBackend;

    fn row_layout_group(capacity: usize) -> TileGroup {
        let schema = Schema::new(vec![
            Column::new("a", DataType::Integer, false),
            Column::new("b", DataType::Integer, false),
        ]);
        let mut column_map = ColumnMap::default();
        column_map.insert(0, (0, 0));
        column_map.insert(1, (0, 1));
        TileGroup::new(
            1,
            1,
            7,
            vec![schema],
            column_map,
            capacity,
            Arc::new(HeapBackend::new()),
            4096,
        )
        .unwrap()
    }

    fn two_tile_group(capacity: usize) -> TileGroup {
        let mut column_map = ColumnMap::default();
        column_map.insert(0, (0, 0));
        column_map.insert(1, (1, 0));
        TileGroup::new(
            1,
            1,
            8,
            vec![
                Schema::single(Column::new("a", DataType::Integer, false)),
                Schema::single(Column::new("b", DataType::Text, true)),
            ],
            column_map,
            capacity,
            Arc::new(HeapBackend::new()),
            4096,
        )
        .unwrap()
    }

    #[test]
    fn test_insert_until_full() {
        let group = row_layout_group(2);
        let t = Tuple::new(vec![Value::integer(1), Value::integer(2)]);
        assert_eq!(group.insert_tuple(&t).unwrap(), Some(0));
        assert_eq!(group.insert_tuple(&t).unwrap(), Some(1));
        assert_eq!(group.insert_tuple(&t).unwrap(), None);
        assert_eq!(group.next_tuple_slot(), 2);
    }

    #[test]
    fn test_insert_routes_through_column_map() {
        let group = two_tile_group(4);
        let t = Tuple::new(vec![Value::integer(10), Value::text("x")]);
        let slot = group.insert_tuple(&t).unwrap().unwrap();
        assert_eq!(group.value_at(slot as usize, 0).unwrap(), Value::integer(10));
        assert_eq!(group.value_at(slot as usize, 1).unwrap(), Value::text("x"));
        // column 1 physically lives in tile 1, column 0
        assert_eq!(group.locate_tile_and_column(1), Some((1, 0)));
        assert_eq!(
            group.tile(1).value_at(slot as usize, 0).unwrap(),
            Value::text("x")
        );
    }

    #[test]
    fn test_column_count_mismatch() {
        let group = row_layout_group(2);
        let err = group
            .insert_tuple(&Tuple::new(vec![Value::integer(1)]))
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_insert_at_stamps_commit_id() {
        let group = row_layout_group(4);
        let t = Tuple::new(vec![Value::integer(5), Value::integer(6)]);
        group.insert_tuple_at(2, &t, 42).unwrap();
        assert_eq!(group.next_tuple_slot(), 3);
        assert_eq!(group.header().begin_commit_id(2), 42);
        assert_eq!(group.value_at(2, 0).unwrap(), Value::integer(5));
    }

    #[test]
    fn test_schema_difference() {
        let group = two_tile_group(2);

        let same = group.column_map().clone();
        assert_eq!(group.schema_difference(&same), 0.0);

        let mut half = ColumnMap::default();
        half.insert(0, (0, 0));
        half.insert(1, (0, 1));
        assert_eq!(group.schema_difference(&half), 0.5);

        let mut all = ColumnMap::default();
        all.insert(0, (1, 0));
        all.insert(1, (0, 0));
        assert_eq!(group.schema_difference(&all), 1.0);
    }
}
