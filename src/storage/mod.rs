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

//! The hybrid-layout table engine
//!
//! Tables are stored as a horizontal sequence of tile groups, each
//! vertically partitioned into tiles by a column map. The engine supports
//! concurrent insertion, per-tile-group layout transformation driven by
//! an online clusterer, secondary-index maintenance and the row-sampling
//! path the optimizer uses to compute per-column cardinalities.

pub mod backend;
pub mod catalog;
pub mod clusterer;
pub mod config;
pub mod index;
pub mod log_record;
pub mod sample;
pub mod table;
pub mod tile;
pub mod tile_group;
pub mod tile_group_header;
pub mod transaction;

pub use backend::{Backend, HeapBackend};
pub use catalog::Catalog;
pub use clusterer::{AccessSample, Clusterer};
pub use config::{
    LayoutType, TableOptions, DEFAULT_CLUSTER_COUNT, DEFAULT_MAX_TILES, DEFAULT_NEW_SAMPLE_WEIGHT,
    DEFAULT_POOL_CHUNK_SIZE, DEFAULT_TUPLES_PER_TILEGROUP,
};
pub use index::{Index, IndexType, OrderedIndex};
pub use log_record::{
    deserialize_tuple, deserialize_value, serialize_tuple, serialize_value, LogRecord,
    LogRecordHeader, LogRecordType, LOG_RECORD_HEADER_SIZE,
};
pub use table::{DataTable, ForeignKey};
pub use tile::Tile;
pub use tile_group::{ColumnMap, TileGroup};
pub use tile_group_header::TileGroupHeader;
pub use transaction::{CommittedEverything, TransactionManager, TxnHandle};
