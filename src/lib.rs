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

//! # Tilestore - hybrid row/column in-memory storage engine
//!
//! Tilestore stores relational tables as a sequence of *tile groups*
//! (horizontal shards), each vertically partitioned into *tiles* (column
//! bundles) by a column map. The engine supports concurrent insertion
//! with wait-free slot claims, per-tile-group layout transformation under
//! stable tuple identities, secondary-index maintenance, an online
//! clustering loop that proposes layouts from access samples, and a
//! row-sampling path that materializes columnar samples for per-column
//! cardinality estimation.
//!
//! The crate's second half is a memo-based plan binder: a lazy
//! pattern-matching enumerator over equivalence groups of logical
//! operators, with on-demand, idempotent rule exploration.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use tilestore::core::{Column, DataType, Schema, Tuple, Value};
//! use tilestore::storage::{
//!     Catalog, CommittedEverything, DataTable, HeapBackend, TableOptions,
//! };
//!
//! let schema = Schema::new(vec![
//!     Column::new("id", DataType::Integer, false),
//!     Column::new("name", DataType::Text, true),
//! ]);
//! let table = DataTable::new(
//!     schema,
//!     "users",
//!     1,
//!     1,
//!     TableOptions::default(),
//!     Arc::new(Catalog::new()),
//!     Arc::new(CommittedEverything::new()),
//!     Arc::new(HeapBackend::new()),
//! )
//! .unwrap();
//!
//! let location = table
//!     .insert_tuple(&Tuple::new(vec![Value::integer(1), Value::text("alice")]))
//!     .unwrap();
//! assert!(location.is_valid());
//! ```
//!
//! ## Modules
//!
//! - [`core`] - identifiers, errors, values, schemas, tuples
//! - [`common`] - the arena pool
//! - [`storage`] - the tile-based table engine
//! - [`optimizer`] - the memo and binding iterators

pub mod common;
pub mod core;
pub mod optimizer;
pub mod storage;

// Re-export main types for convenience
pub use core::{
    Column, CommitId, DataType, Error, ItemPointer, Oid, Result, Schema, Tuple, TxnId, Value,
    INVALID_OID, INVALID_TXN_ID, MAX_COMMIT_ID,
};

// Re-export common utilities
pub use common::{Pool, VarlenRef};

// Re-export storage types
pub use storage::{
    AccessSample, Backend, Catalog, Clusterer, ColumnMap, CommittedEverything, DataTable,
    ForeignKey, HeapBackend, Index, IndexType, LayoutType, LogRecord, LogRecordType, OrderedIndex,
    TableOptions, Tile, TileGroup, TileGroupHeader, TransactionManager,
};

// Re-export optimizer types
pub use optimizer::{
    GroupBindingIterator, GroupId, ItemBindingIterator, Memo, OpPlanNode, OpType, Operator,
    Optimizer, Pattern, Rule,
};
