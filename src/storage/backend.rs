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

//! Memory backend interface
//!
//! Tiles and arena pools obtain their buffers through a [`Backend`] so the
//! storage engine stays independent of where the memory comes from. The
//! default [`HeapBackend`] allocates zeroed buffers on the process heap
//! and can enforce a capacity limit, which makes allocation failure
//! reachable in tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::{Error, Result};

/// Allocation backend consumed by pools and tiles
///
/// `allocate` hands out a zeroed buffer; the buffer's memory returns to
/// the backend when it is dropped, and `release` reports the returned
/// size so the backend can keep its accounting straight.
pub trait Backend: Send + Sync {
    /// Allocate a zeroed buffer of `size` bytes
    fn allocate(&self, size: usize) -> Result<Box<[u8]>>;

    /// Record that `size` bytes allocated from this backend were dropped
    fn release(&self, size: usize);

    /// Bytes currently accounted as allocated
    fn allocated_bytes(&self) -> usize;
}

/// Heap-backed [`Backend`] with an optional capacity limit
pub struct HeapBackend {
    limit: usize,
    allocated: AtomicUsize,
}

impl HeapBackend {
    /// Create an unlimited heap backend
    pub fn new() -> Self {
        Self {
            limit: usize::MAX,
            allocated: AtomicUsize::new(0),
        }
    }

    /// Create a heap backend that refuses allocations past `limit` bytes
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            limit,
            allocated: AtomicUsize::new(0),
        }
    }
}

impl Default for HeapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for HeapBackend {
    fn allocate(&self, size: usize) -> Result<Box<[u8]>> {
        let mut current = self.allocated.load(Ordering::Relaxed);
        loop {
            if current.saturating_add(size) > self.limit {
                return Err(Error::OutOfMemory { requested: size });
            }
            match self.allocated.compare_exchange_weak(
                current,
                current + size,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
        Ok(vec![0u8; size].into_boxed_slice())
    }

    fn release(&self, size: usize) {
        self.allocated.fetch_sub(size, Ordering::Relaxed);
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_backend_accounting() {
        let backend = HeapBackend::new();
        let buf = backend.allocate(128).unwrap();
        assert_eq!(buf.len(), 128);
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(backend.allocated_bytes(), 128);
        backend.release(128);
        assert_eq!(backend.allocated_bytes(), 0);
    }

    #[test]
    fn test_heap_backend_limit() {
        let backend = HeapBackend::with_capacity_limit(100);
        let _buf = backend.allocate(80).unwrap();
        let err = backend.allocate(40).unwrap_err();
        assert_eq!(err, Error::OutOfMemory { requested: 40 });
        // freeing makes room again
        backend.release(80);
        assert!(backend.allocate(40).is_ok());
    }
}
