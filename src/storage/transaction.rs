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

//! Transaction manager interface
//!
//! The table engine does not implement concurrency control; it consumes a
//! visibility predicate and a committed-id service through this trait.
//! The row sampler asks it whether a slot is visible before taking the
//! row as a sample.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::{CommitId, Oid, TxnId};
use crate::storage::tile_group_header::TileGroupHeader;

/// Handle to an open transaction
pub type TxnHandle = TxnId;

/// Concurrency-control interface consumed by the table engine
pub trait TransactionManager: Send + Sync {
    /// Whether the tuple at `slot` is visible to the calling context
    fn visible(&self, header: &TileGroupHeader, slot: Oid) -> bool;

    /// The most recently issued commit id
    fn current_commit_id(&self) -> CommitId;

    /// Open a transaction
    fn begin_transaction(&self) -> TxnHandle;

    /// Commit a transaction, returning its commit id
    fn commit(&self, txn: TxnHandle) -> CommitId;
}

/// Transaction manager for read-only workloads: every claimed slot is
/// visible
///
/// The optimizer's sampling path runs under a read-only transaction that
/// observes all committed rows; this implementation models that and backs
/// the engine's tests.
pub struct CommittedEverything {
    next_txn_id: AtomicU64,
    next_commit_id: AtomicU64,
}

impl CommittedEverything {
    /// Create a manager with fresh id counters
    pub fn new() -> Self {
        Self {
            next_txn_id: AtomicU64::new(1),
            next_commit_id: AtomicU64::new(1),
        }
    }
}

impl Default for CommittedEverything {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionManager for CommittedEverything {
    fn visible(&self, header: &TileGroupHeader, slot: Oid) -> bool {
        (slot as usize) < header.next_tuple_slot()
    }

    fn current_commit_id(&self) -> CommitId {
        self.next_commit_id.load(Ordering::SeqCst)
    }

    fn begin_transaction(&self) -> TxnHandle {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    fn commit(&self, _txn: TxnHandle) -> CommitId {
        self.next_commit_id.fetch_add(1, Ordering::SeqCst)
    }
}
