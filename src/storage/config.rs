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

//! Table engine configuration
//!

/// Physical layout applied to freshly allocated tile groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutType {
    /// All columns in a single tile
    #[default]
    Row,
    /// One column per tile
    Column,
    /// The partitioning currently proposed by the clusterer
    Hybrid,
}

/// Default number of tuple slots per tile group
pub const DEFAULT_TUPLES_PER_TILEGROUP: usize = 1000;

/// Default arena pool chunk size: 1 MiB
pub const DEFAULT_POOL_CHUNK_SIZE: usize = 1024 * 1024;

/// Default number of k-means clusters
pub const DEFAULT_CLUSTER_COUNT: usize = 4;

/// Default exponential-moving-average weight of a new access sample
pub const DEFAULT_NEW_SAMPLE_WEIGHT: f64 = 0.01;

/// Default maximum number of tiles a clustered layout may produce
pub const DEFAULT_MAX_TILES: usize = 2;

/// Default seed for the row sampler's PRNG
pub const DEFAULT_SAMPLE_SEED: u64 = 0x7453_6d70_6c72;

/// Tables with fewer columns than this fall back to ROW under HYBRID
pub const HYBRID_FALLBACK_COLUMN_COUNT: usize = 10;

/// Tuning knobs for a [`DataTable`](crate::storage::DataTable)
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Tuple slots per tile group
    /// Default: 1000
    pub tuples_per_tilegroup: usize,

    /// Layout applied to new tile groups
    /// Default: Row
    pub layout_mode: LayoutType,

    /// Chunk size of the varlen pools owned by this table's tiles
    /// Default: 1 MiB
    pub pool_chunk_size: usize,

    /// Number of clusters the access-pattern clusterer maintains
    /// Default: 4
    pub cluster_count: usize,

    /// EMA weight given to each new access sample
    /// Default: 0.01
    pub new_sample_weight: f64,

    /// Maximum tiles in a clustered partitioning
    /// Default: 2
    pub max_tiles: usize,

    /// Seed of the row sampler's PRNG
    pub sample_seed: u64,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            tuples_per_tilegroup: DEFAULT_TUPLES_PER_TILEGROUP,
            layout_mode: LayoutType::Row,
            pool_chunk_size: DEFAULT_POOL_CHUNK_SIZE,
            cluster_count: DEFAULT_CLUSTER_COUNT,
            new_sample_weight: DEFAULT_NEW_SAMPLE_WEIGHT,
            max_tiles: DEFAULT_MAX_TILES,
            sample_seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl TableOptions {
    /// Creates options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the tile-group capacity
    pub fn with_tuples_per_tilegroup(mut self, count: usize) -> Self {
        self.tuples_per_tilegroup = count;
        self
    }

    /// Builder method to set the layout mode
    pub fn with_layout_mode(mut self, mode: LayoutType) -> Self {
        self.layout_mode = mode;
        self
    }

    /// Builder method to set the pool chunk size
    pub fn with_pool_chunk_size(mut self, bytes: usize) -> Self {
        self.pool_chunk_size = bytes;
        self
    }

    /// Builder method to set the cluster count
    pub fn with_cluster_count(mut self, count: usize) -> Self {
        self.cluster_count = count;
        self
    }

    /// Builder method to set the new-sample weight
    pub fn with_new_sample_weight(mut self, weight: f64) -> Self {
        self.new_sample_weight = weight;
        self
    }

    /// Builder method to set the maximum tile count
    pub fn with_max_tiles(mut self, count: usize) -> Self {
        self.max_tiles = count;
        self
    }

    /// Builder method to set the sampler seed
    pub fn with_sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = TableOptions::default();
        assert_eq!(options.tuples_per_tilegroup, 1000);
        assert_eq!(options.layout_mode, LayoutType::Row);
        assert_eq!(options.pool_chunk_size, 1024 * 1024);
        assert_eq!(options.cluster_count, 4);
        assert_eq!(options.new_sample_weight, 0.01);
        assert_eq!(options.max_tiles, 2);
    }

    #[test]
    fn test_options_builder() {
        let options = TableOptions::new()
            .with_tuples_per_tilegroup(2)
            .with_layout_mode(LayoutType::Hybrid)
            .with_max_tiles(4)
            .with_sample_seed(42);
        assert_eq!(options.tuples_per_tilegroup, 2);
        assert_eq!(options.layout_mode, LayoutType::Hybrid);
        assert_eq!(options.max_tiles, 4);
        assert_eq!(options.sample_seed, 42);
    }
}
