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

//! Row sampling and cardinality integration tests.

use std::sync::Arc;

use tilestore::core::{Column, DataType, Schema, Tuple, Value};
use tilestore::storage::{Catalog, CommittedEverything, DataTable, HeapBackend, TableOptions};

/// 1000 rows: column 0 = row index, column 1 = row % 7, column 2 = text
fn populated_table() -> DataTable {
    let schema = Schema::new(vec![
        Column::new("seq", DataType::Integer, false),
        Column::new("bucket", DataType::Integer, false),
        Column::new("label", DataType::Text, true),
    ]);
    let table = DataTable::new(
        schema,
        "sampled",
        1,
        2,
        TableOptions::default().with_tuples_per_tilegroup(128),
        Arc::new(Catalog::new()),
        Arc::new(CommittedEverything::new()),
        Arc::new(HeapBackend::new()),
    )
    .unwrap();

    for i in 0..1000i64 {
        table
            .insert_tuple(&Tuple::new(vec![
                Value::integer(i),
                Value::integer(i % 7),
                Value::text(format!("row-{}", i)),
            ]))
            .unwrap();
    }
    table
}

#[test]
fn full_sample_covers_every_row() {
    let table = populated_table();
    let size = table.sample_rows(1000).unwrap();
    assert_eq!(size, 1000);
    assert_eq!(table.optimizer_sample_size(), 1000);

    // oversized requests clamp to the table size
    let size = table.sample_rows(5000).unwrap();
    assert_eq!(size, 1000);

    table.materialize_sample().unwrap();
    table.compute_table_cardinality(0).unwrap();
    table.compute_table_cardinality(1).unwrap();

    assert_eq!(table.table_cardinality(0), 1000);
    assert_eq!(table.table_cardinality(1), 7);
}

#[test]
fn partial_sample_bounds_cardinality() {
    let table = populated_table();
    let size = table.sample_rows(100).unwrap();
    assert_eq!(size, 100);

    table.materialize_sample().unwrap();
    table.compute_table_cardinality(0).unwrap();
    table.compute_table_cardinality(1).unwrap();

    // the sequence column is unique per row: one distinct value per pick
    assert_eq!(table.table_cardinality(0), size);
    // the bucket column has 7 distinct values in the whole table
    let bucket = table.table_cardinality(1);
    assert!(bucket >= 1 && bucket <= 7);
}

#[test]
fn non_inlined_columns_are_excluded() {
    let table = populated_table();
    table.sample_rows(1000).unwrap();
    table.materialize_sample().unwrap();

    // the text column is not mapped into the sample
    assert!(table.is_column_sampled(0));
    assert!(!table.is_column_sampled(2));
    table.compute_table_cardinality(2).unwrap();
    assert_eq!(table.table_cardinality(2), 0);

    // the sample tile group is pure columnar over the two inlined columns
    let sample_group = table.sample_tile_group().unwrap();
    assert_eq!(sample_group.tile_count(), 2);
    assert_eq!(sample_group.allocated_tuple_count(), 1000);
    assert_eq!(sample_group.next_tuple_slot(), 1000);
}

#[test]
fn sample_values_match_source_rows() {
    let table = populated_table();
    table.sample_rows(1000).unwrap();
    table.materialize_sample().unwrap();

    let sample_group = table.sample_tile_group().unwrap();
    // full sample in row order: sample row i mirrors table row i
    for row in [0usize, 1, 499, 999] {
        assert_eq!(
            sample_group.value_at(row, 0).unwrap(),
            Value::integer(row as i64)
        );
        assert_eq!(
            sample_group.value_at(row, 1).unwrap(),
            Value::integer((row % 7) as i64)
        );
    }
}

#[test]
fn retaking_a_sample_drops_old_state() {
    let table = populated_table();
    table.sample_rows(100).unwrap();
    table.materialize_sample().unwrap();
    table.compute_table_cardinality(1).unwrap();
    assert!(table.table_cardinality(1) > 0);
    let first_group_id = table.sample_tile_group().unwrap().tile_group_id();

    // retake: the old materialization and cardinalities are gone
    table.sample_rows(50).unwrap();
    assert_eq!(table.table_cardinality(1), 0);
    assert!(table.sample_tile_group().is_none());

    // re-materialization allocates a fresh tile group id
    table.materialize_sample().unwrap();
    let second_group_id = table.sample_tile_group().unwrap().tile_group_id();
    assert_ne!(first_group_id, second_group_id);

    // materializing again replaces the sample tile group
    table.materialize_sample().unwrap();
    assert_ne!(
        table.sample_tile_group().unwrap().tile_group_id(),
        second_group_id
    );
}

#[test]
fn sampling_is_deterministic_given_seed() {
    let build = || {
        let table = populated_table();
        table.sample_rows(64).unwrap();
        table.optimizer_sample()
    };
    assert_eq!(build(), build());
}

#[test]
fn cardinality_before_materialization_is_zero() {
    let table = populated_table();
    table.sample_rows(10).unwrap();
    // no materialized sample: computing is a no-op, lookups return 0
    table.compute_table_cardinality(0).unwrap();
    assert_eq!(table.table_cardinality(0), 0);
    // unknown columns never error
    table.compute_table_cardinality(99).unwrap();
    assert_eq!(table.table_cardinality(99), 0);
}

#[test]
fn empty_table_samples_nothing() {
    let schema = Schema::new(vec![Column::new("v", DataType::Integer, false)]);
    let table = DataTable::new(
        schema,
        "empty",
        1,
        3,
        TableOptions::default(),
        Arc::new(Catalog::new()),
        Arc::new(CommittedEverything::new()),
        Arc::new(HeapBackend::new()),
    )
    .unwrap();

    assert_eq!(table.sample_rows(10).unwrap(), 0);
    table.materialize_sample().unwrap();
    assert!(table.sample_tile_group().is_none());
}
