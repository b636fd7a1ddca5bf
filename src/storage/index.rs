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

//! Index interface consumed by the table engine
//!
//! Index data structures themselves live outside the engine; the table
//! only projects key columns, builds a key tuple and calls
//! [`Index::insert_entry`]. Uniqueness is the index's own responsibility:
//! the insert path performs no visibility pre-check for primary or unique
//! indexes, and a refusal surfaces to the caller as an invalid
//! `ItemPointer`.
//!
//! [`OrderedIndex`] is the in-crate reference implementation backing the
//! insert/scan round-trip tests.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::arena::Pool;
use crate::core::{ItemPointer, Oid, Result, Schema, Tuple, Value};
use crate::storage::backend::{Backend, HeapBackend};

/// Constraint class of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// Primary key: unique, at most one per table
    PrimaryKey,
    /// Unique secondary index
    Unique,
    /// Non-unique secondary index
    Default,
}

/// Abstract index over a projection of a table's columns
pub trait Index: Send + Sync {
    /// Catalog oid of this index
    fn oid(&self) -> Oid;

    /// Index name
    fn name(&self) -> &str;

    /// Constraint class
    fn index_type(&self) -> IndexType;

    /// Schema of the key tuples this index accepts
    fn key_schema(&self) -> &Schema;

    /// Table column ordinals the key is projected from, in key order
    fn indexed_columns(&self) -> &[Oid];

    /// The arena the index allocates key storage from
    fn pool(&self) -> &Pool;

    /// Insert an entry; returns false if the index refuses the key
    /// (duplicate under a unique constraint)
    fn insert_entry(&self, key: &Tuple, location: ItemPointer) -> bool;

    /// All locations stored under the given key
    fn scan_key(&self, key: &Tuple) -> Vec<ItemPointer>;

    /// Bump the index's tuple counter
    fn increase_tuple_count(&self, amount: u64);

    /// Entries inserted so far
    fn tuple_count(&self) -> u64;
}

/// Key wrapper imposing a total order over value lists
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexKey(Vec<Value>);

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.compare(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered in-memory index: the reference [`Index`] implementation
pub struct OrderedIndex {
    oid: Oid,
    name: String,
    index_type: IndexType,
    key_schema: Schema,
    indexed_columns: Vec<Oid>,
    pool: Pool,
    entries: RwLock<BTreeMap<IndexKey, Vec<ItemPointer>>>,
    tuple_count: AtomicU64,
}

impl OrderedIndex {
    /// Create an index over the given key projection
    pub fn new(
        oid: Oid,
        name: impl Into<String>,
        index_type: IndexType,
        key_schema: Schema,
        indexed_columns: Vec<Oid>,
    ) -> Result<Self> {
        let backend: Arc<dyn Backend> = Arc::new(HeapBackend::new());
        let pool = Pool::new(backend)?;
        Ok(Self {
            oid,
            name: name.into(),
            index_type,
            key_schema,
            indexed_columns,
            pool,
            entries: RwLock::new(BTreeMap::new()),
            tuple_count: AtomicU64::new(0),
        })
    }

    /// Copy a key's varlen components into the index pool so stored keys
    /// own their bytes independently of the source tuple
    fn canonical_key(&self, key: &Tuple) -> IndexKey {
        let values = key
            .values()
            .iter()
            .map(|v| match v {
                Value::Text(s) => match self.pool.intern(s.as_bytes()) {
                    Ok(varlen) => match self.pool.read(varlen) {
                        Ok(bytes) => Value::text(String::from_utf8_lossy(&bytes).into_owned()),
                        Err(_) => v.clone(),
                    },
                    Err(_) => v.clone(),
                },
                _ => v.clone(),
            })
            .collect();
        IndexKey(values)
    }
}

impl Index for OrderedIndex {
    fn oid(&self) -> Oid {
        self.oid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn index_type(&self) -> IndexType {
        self.index_type
    }

    fn key_schema(&self) -> &Schema {
        &self.key_schema
    }

    fn indexed_columns(&self) -> &[Oid] {
        &self.indexed_columns
    }

    fn pool(&self) -> &Pool {
        &self.pool
    }

    fn insert_entry(&self, key: &Tuple, location: ItemPointer) -> bool {
        let key = self.canonical_key(key);
        let mut entries = self.entries.write();
        let slot = entries.entry(key).or_default();
        if !slot.is_empty()
            && matches!(self.index_type, IndexType::PrimaryKey | IndexType::Unique)
        {
            return false;
        }
        slot.push(location);
        true
    }

    fn scan_key(&self, key: &Tuple) -> Vec<ItemPointer> {
        let key = IndexKey(key.values().to_vec());
        self.entries
            .read()
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    fn increase_tuple_count(&self, amount: u64) {
        self.tuple_count.fetch_add(amount, AtomicOrdering::Relaxed);
    }

    fn tuple_count(&self) -> u64 {
        self.tuple_count.load(AtomicOrdering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    fn int_key_schema() -> Schema {
        Schema::single(Column::new("k", DataType::Integer, false))
    }

    fn key(v: i64) -> Tuple {
        Tuple::new(vec![Value::integer(v)])
    }

    #[test]
    fn test_insert_and_scan() {
        let index = OrderedIndex::new(1, "idx_k", IndexType::Default, int_key_schema(), vec![0])
            .unwrap();
        assert!(index.insert_entry(&key(5), ItemPointer::new(1, 0)));
        assert!(index.insert_entry(&key(5), ItemPointer::new(1, 1)));
        assert_eq!(
            index.scan_key(&key(5)),
            vec![ItemPointer::new(1, 0), ItemPointer::new(1, 1)]
        );
        assert!(index.scan_key(&key(6)).is_empty());
    }

    #[test]
    fn test_unique_index_refuses_duplicates() {
        let index = OrderedIndex::new(2, "pk", IndexType::PrimaryKey, int_key_schema(), vec![0])
            .unwrap();
        assert!(index.insert_entry(&key(1), ItemPointer::new(1, 0)));
        assert!(!index.insert_entry(&key(1), ItemPointer::new(1, 1)));
        assert_eq!(index.scan_key(&key(1)), vec![ItemPointer::new(1, 0)]);
    }

    #[test]
    fn test_text_keys() {
        let schema = Schema::single(Column::new("name", DataType::Text, false));
        let index = OrderedIndex::new(3, "idx_name", IndexType::Unique, schema, vec![1]).unwrap();
        let k = Tuple::new(vec![Value::text("bob")]);
        assert!(index.insert_entry(&k, ItemPointer::new(2, 4)));
        assert_eq!(index.scan_key(&k), vec![ItemPointer::new(2, 4)]);
        assert!(index.pool().allocated_bytes() > 0);
    }

    #[test]
    fn test_tuple_count() {
        let index = OrderedIndex::new(4, "idx", IndexType::Default, int_key_schema(), vec![0])
            .unwrap();
        assert_eq!(index.tuple_count(), 0);
        index.increase_tuple_count(2);
        assert_eq!(index.tuple_count(), 2);
    }
}
