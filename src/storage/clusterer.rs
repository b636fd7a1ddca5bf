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

//! Online k-means clusterer over column-access patterns
//!
//! Queries report which columns they touched as an [`AccessSample`]. The
//! clusterer maintains `k` centroids in column-access space and, on
//! demand, projects its clusters to a tile partitioning: columns with
//! similar access affinity across the dominant clusters co-reside in the
//! same tile. The partitioning is deterministic given the clusterer's
//! state and is always a bijection over the table's columns.

use crate::core::Oid;
use crate::storage::tile_group::ColumnMap;

/// A column-access frequency vector
#[derive(Debug, Clone, PartialEq)]
pub struct AccessSample {
    columns: Vec<f64>,
}

impl AccessSample {
    /// Create a sample from per-column access weights
    pub fn new(columns: Vec<f64>) -> Self {
        Self { columns }
    }

    /// Dimension (column count)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.columns.len()
    }

    /// Per-column weights
    #[inline]
    pub fn columns(&self) -> &[f64] {
        &self.columns
    }

    /// Scale to unit L2 norm; a zero vector stays zero
    pub fn normalize(&mut self) {
        let norm = self.columns.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut self.columns {
                *v /= norm;
            }
        }
    }

    /// Squared L2 distance to another sample
    pub fn distance_squared(&self, other: &AccessSample) -> f64 {
        self.columns
            .iter()
            .zip(other.columns.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

/// Online k-means over access samples
pub struct Clusterer {
    centroids: Vec<AccessSample>,
    weights: Vec<f64>,
    column_count: usize,
    new_sample_weight: f64,
}

impl Clusterer {
    /// Create a clusterer with `cluster_count` zero-initialized centroids
    pub fn new(cluster_count: usize, column_count: usize, new_sample_weight: f64) -> Self {
        Self {
            centroids: (0..cluster_count)
                .map(|_| AccessSample::new(vec![0.0; column_count]))
                .collect(),
            weights: vec![0.0; cluster_count],
            column_count,
            new_sample_weight,
        }
    }

    /// Number of clusters
    #[inline]
    pub fn cluster_count(&self) -> usize {
        self.centroids.len()
    }

    /// The centroid of a cluster
    #[inline]
    pub fn centroid(&self, cluster: usize) -> &AccessSample {
        &self.centroids[cluster]
    }

    /// Fold a sample into the nearest centroid
    ///
    /// The sample is normalized, assigned to the closest centroid by L2
    /// distance (lowest index wins ties) and folded in by exponential
    /// moving average with the configured weight.
    pub fn process_sample(&mut self, sample: &AccessSample) {
        if self.centroids.is_empty() || sample.dimension() != self.column_count {
            return;
        }
        let mut sample = sample.clone();
        sample.normalize();

        let mut nearest = 0;
        let mut nearest_distance = f64::INFINITY;
        for (i, centroid) in self.centroids.iter().enumerate() {
            let d = centroid.distance_squared(&sample);
            if d < nearest_distance {
                nearest_distance = d;
                nearest = i;
            }
        }

        let w = self.new_sample_weight;
        for (c, s) in self.centroids[nearest]
            .columns
            .iter_mut()
            .zip(sample.columns.iter())
        {
            *c = (1.0 - w) * *c + w * s;
        }
        self.weights[nearest] += w;
    }

    /// Project the clusters to a column map using at most `max_tiles` tiles
    ///
    /// Centroids are ranked by membership weight (index breaks ties); the
    /// top `max_tiles` each propose a tile, every column joins the ranked
    /// centroid with the highest affinity for it, and empty tiles are
    /// compacted away so tile ordinals stay dense. Deterministic given
    /// the clusterer state.
    pub fn partitioning(&self, max_tiles: usize) -> ColumnMap {
        let mut column_map = ColumnMap::default();
        if self.column_count == 0 {
            return column_map;
        }

        // fall back to a single tile when there is nothing to rank
        if self.centroids.is_empty() || max_tiles <= 1 {
            for column in 0..self.column_count {
                column_map.insert(column as Oid, (0, column as Oid));
            }
            return column_map;
        }

        let mut ranked: Vec<usize> = (0..self.centroids.len()).collect();
        ranked.sort_by(|&a, &b| {
            self.weights[b]
                .partial_cmp(&self.weights[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        ranked.truncate(max_tiles);

        // per ranked tile, the columns assigned to it, ascending
        let mut tiles: Vec<Vec<usize>> = vec![Vec::new(); ranked.len()];
        for column in 0..self.column_count {
            let mut best = 0;
            let mut best_affinity = f64::NEG_INFINITY;
            for (tile, &cluster) in ranked.iter().enumerate() {
                let affinity = self.centroids[cluster].columns[column];
                if affinity > best_affinity {
                    best_affinity = affinity;
                    best = tile;
                }
            }
            tiles[best].push(column);
        }

        let mut tile_ordinal: Oid = 0;
        for members in tiles.iter().filter(|members| !members.is_empty()) {
            for (position, &column) in members.iter().enumerate() {
                column_map.insert(column as Oid, (tile_ordinal, position as Oid));
            }
            tile_ordinal += 1;
        }
        column_map
    }
}
