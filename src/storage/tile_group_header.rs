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

//! Tile group header - per-slot MVCC metadata
//!
//! One record per tuple slot: the owning transaction id, the begin/end
//! commit-id window, and the next-version pointer of the version chain.
//! Slot claim is wait-free (an atomic fetch-and-increment that never
//! overshoots the capacity); all per-slot fields are atomics so the
//! transaction layer can stamp a slot without taking a lock.
//!
//! Visibility itself is the transaction manager's call: it reads this
//! metadata through
//! [`TransactionManager::visible`](crate::storage::transaction::TransactionManager::visible).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::core::{CommitId, ItemPointer, Oid, TxnId, INVALID_TXN_ID, MAX_COMMIT_ID};

/// MVCC metadata of a single tuple slot
struct SlotMeta {
    txn_id: AtomicU64,
    begin_cid: AtomicU64,
    end_cid: AtomicU64,
    next_version: AtomicU64,
}

impl SlotMeta {
    /// An empty slot: no owner, begin commit id at infinity
    fn empty() -> Self {
        Self {
            txn_id: AtomicU64::new(INVALID_TXN_ID),
            begin_cid: AtomicU64::new(MAX_COMMIT_ID),
            end_cid: AtomicU64::new(MAX_COMMIT_ID),
            next_version: AtomicU64::new(ItemPointer::INVALID.pack()),
        }
    }
}

/// Per-slot MVCC metadata for one tile group
pub struct TileGroupHeader {
    capacity: usize,
    next_slot: AtomicUsize,
    slots: Box<[SlotMeta]>,
}

impl TileGroupHeader {
    /// Create a header with `capacity` empty slots
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_slot: AtomicUsize::new(0),
            slots: (0..capacity).map(|_| SlotMeta::empty()).collect(),
        }
    }

    /// Number of tuple slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Claim the next free slot, or `None` when the tile group is full
    ///
    /// Wait-free: a compare-and-swap increment that never moves the
    /// counter past the capacity, so `next_tuple_slot() <= capacity()`
    /// holds at every instant.
    pub fn claim_next_slot(&self) -> Option<Oid> {
        self.next_slot
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .ok()
            .map(|n| n as Oid)
    }

    /// Number of slots claimed so far
    #[inline]
    pub fn next_tuple_slot(&self) -> usize {
        self.next_slot.load(Ordering::SeqCst)
    }

    /// Raise the claim watermark to cover `slot` (recovery writes at a
    /// caller-chosen slot instead of claiming the next one)
    pub fn claim_slot_at(&self, slot: Oid) -> bool {
        let slot = slot as usize;
        if slot >= self.capacity {
            return false;
        }
        self.next_slot
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.max(slot + 1))
            })
            .ok();
        true
    }

    /// Stamp a slot's full version metadata
    pub fn set_version(
        &self,
        slot: Oid,
        txn_id: TxnId,
        begin_cid: CommitId,
        end_cid: CommitId,
        next_version: ItemPointer,
    ) {
        debug_assert!(begin_cid <= end_cid);
        let meta = &self.slots[slot as usize];
        meta.txn_id.store(txn_id, Ordering::Release);
        meta.begin_cid.store(begin_cid, Ordering::Release);
        meta.end_cid.store(end_cid, Ordering::Release);
        meta.next_version
            .store(next_version.pack(), Ordering::Release);
    }

    /// The transaction id stamped on a slot
    #[inline]
    pub fn txn_id(&self, slot: Oid) -> TxnId {
        self.slots[slot as usize].txn_id.load(Ordering::Acquire)
    }

    /// The begin commit id of a slot
    #[inline]
    pub fn begin_commit_id(&self, slot: Oid) -> CommitId {
        self.slots[slot as usize].begin_cid.load(Ordering::Acquire)
    }

    /// The end commit id of a slot
    #[inline]
    pub fn end_commit_id(&self, slot: Oid) -> CommitId {
        self.slots[slot as usize].end_cid.load(Ordering::Acquire)
    }

    /// The next-version pointer of a slot
    #[inline]
    pub fn next_version(&self, slot: Oid) -> ItemPointer {
        ItemPointer::unpack(self.slots[slot as usize].next_version.load(Ordering::Acquire))
    }

    /// Set only the begin commit id (recovery and checkpoint paths)
    #[inline]
    pub fn set_begin_commit_id(&self, slot: Oid, begin_cid: CommitId) {
        self.slots[slot as usize]
            .begin_cid
            .store(begin_cid, Ordering::Release);
    }

    /// Set only the end commit id
    #[inline]
    pub fn set_end_commit_id(&self, slot: Oid, end_cid: CommitId) {
        self.slots[slot as usize]
            .end_cid
            .store(end_cid, Ordering::Release);
    }

    /// Set only the next-version pointer
    #[inline]
    pub fn set_next_version(&self, slot: Oid, next_version: ItemPointer) {
        self.slots[slot as usize]
            .next_version
            .store(next_version.pack(), Ordering::Release);
    }

    /// Whether a slot has never been stamped by any transaction
    #[inline]
    pub fn is_empty_slot(&self, slot: Oid) -> bool {
        self.txn_id(slot) == INVALID_TXN_ID && self.begin_commit_id(slot) == MAX_COMMIT_ID
    }

    /// Number of claimed slots stamped by the given transaction
    pub fn active_tuple_count(&self, txn_id: TxnId) -> usize {
        (0..self.next_tuple_slot())
            .filter(|&slot| self.txn_id(slot as Oid) == txn_id)
            .count()
    }

    /// Copy another header bit-for-bit, including the claim watermark
    ///
    /// Used by layout transformation, which rebuilds the tiles but must
    /// preserve every slot's MVCC state under the same tile-group id.
    pub fn copy_from(&self, other: &TileGroupHeader) {
        debug_assert_eq!(self.capacity, other.capacity);
        for slot in 0..self.capacity.min(other.capacity) {
            let src = &other.slots[slot];
            let dst = &self.slots[slot];
            dst.txn_id
                .store(src.txn_id.load(Ordering::Acquire), Ordering::Release);
            dst.begin_cid
                .store(src.begin_cid.load(Ordering::Acquire), Ordering::Release);
            dst.end_cid
                .store(src.end_cid.load(Ordering::Acquire), Ordering::Release);
            dst.next_version
                .store(src.next_version.load(Ordering::Acquire), Ordering::Release);
        }
        self.next_slot
            .store(other.next_tuple_slot(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_claim_until_full() {
        let header = TileGroupHeader::new(3);
        assert_eq!(header.claim_next_slot(), Some(0));
        assert_eq!(header.claim_next_slot(), Some(1));
        assert_eq!(header.claim_next_slot(), Some(2));
        assert_eq!(header.claim_next_slot(), None);
        // saturation does not move the watermark
        assert_eq!(header.next_tuple_slot(), 3);
        assert_eq!(header.claim_next_slot(), None);
        assert_eq!(header.next_tuple_slot(), 3);
    }

    #[test]
    fn test_concurrent_claims_are_unique() {
        let header = Arc::new(TileGroupHeader::new(64));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let header = Arc::clone(&header);
                thread::spawn(move || {
                    let mut claimed = Vec::new();
                    while let Some(slot) = header.claim_next_slot() {
                        claimed.push(slot);
                    }
                    claimed
                })
            })
            .collect();

        let mut all: Vec<Oid> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..64).collect::<Vec<_>>());
        assert_eq!(header.next_tuple_slot(), 64);
    }

    #[test]
    fn test_empty_slot_sentinel() {
        let header = TileGroupHeader::new(2);
        assert!(header.is_empty_slot(0));
        header.set_version(0, 9, 5, 10, ItemPointer::INVALID);
        assert!(!header.is_empty_slot(0));
        assert_eq!(header.txn_id(0), 9);
        assert_eq!(header.begin_commit_id(0), 5);
        assert_eq!(header.end_commit_id(0), 10);
        assert!(header.is_empty_slot(1));
    }

    #[test]
    fn test_active_tuple_count_per_txn() {
        let header = TileGroupHeader::new(4);
        header.claim_next_slot();
        header.claim_next_slot();
        header.claim_next_slot();
        header.set_version(0, 7, 1, MAX_COMMIT_ID, ItemPointer::INVALID);
        header.set_version(1, 8, 1, MAX_COMMIT_ID, ItemPointer::INVALID);
        header.set_version(2, 7, 2, MAX_COMMIT_ID, ItemPointer::INVALID);
        assert_eq!(header.active_tuple_count(7), 2);
        assert_eq!(header.active_tuple_count(8), 1);
        assert_eq!(header.active_tuple_count(9), 0);
    }

    #[test]
    fn test_copy_from_preserves_everything() {
        let src = TileGroupHeader::new(4);
        src.claim_next_slot();
        src.claim_next_slot();
        src.set_version(0, 7, 1, 2, ItemPointer::new(3, 4));
        src.set_version(1, 8, 3, MAX_COMMIT_ID, ItemPointer::INVALID);

        let dst = TileGroupHeader::new(4);
        dst.copy_from(&src);
        assert_eq!(dst.next_tuple_slot(), 2);
        assert_eq!(dst.txn_id(0), 7);
        assert_eq!(dst.next_version(0), ItemPointer::new(3, 4));
        assert_eq!(dst.begin_commit_id(1), 3);
        assert!(dst.is_empty_slot(2));
    }
}
