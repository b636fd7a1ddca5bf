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

//! Arena pool - a bump allocator over fixed-size chunks
//!
//! The pool provides fast allocation and no per-block deallocation: the
//! only way to release memory is to free every chunk at once with
//! [`Pool::purge`]. Requests larger than the chunk size get a dedicated
//! oversize chunk. Tiles use a pool as their variable-length heap; indexes
//! use one for key storage.
//!
//! All operations serialize on a single mutex.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{Error, Result};
use crate::storage::backend::Backend;

/// Default chunk size: 1 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Alignment of every returned region
const ALLOC_ALIGN: usize = 8;

/// Marks a [`VarlenRef`] chunk index as referring to an oversize chunk
const OVERSIZE_FLAG: u32 = 1 << 31;

/// Handle to a region allocated from a [`Pool`]
///
/// The handle stays valid until the pool is purged or dropped. It is 12
/// bytes and fixed-width, so tiles store it inline in place of the
/// out-of-line payload it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarlenRef {
    chunk: u32,
    offset: u32,
    len: u32,
}

impl VarlenRef {
    /// Byte length of the referenced region
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true for a zero-length region
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Encode into the fixed-width inline representation
    pub fn to_bytes(&self) -> [u8; 12] {
        let mut buf = [0u8; 12];
        buf[0..4].copy_from_slice(&self.chunk.to_le_bytes());
        buf[4..8].copy_from_slice(&self.offset.to_le_bytes());
        buf[8..12].copy_from_slice(&self.len.to_le_bytes());
        buf
    }

    /// Decode from the fixed-width inline representation
    pub fn from_bytes(buf: &[u8; 12]) -> Self {
        Self {
            chunk: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            offset: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            len: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
        }
    }
}

/// A chunk of backend memory with a bump offset
struct Chunk {
    data: Box<[u8]>,
    offset: usize,
}

impl Chunk {
    fn new(data: Box<[u8]>) -> Self {
        Self { data, offset: 0 }
    }
}

struct PoolInner {
    chunks: Vec<Chunk>,
    oversize: Vec<Chunk>,
}

/// A memory pool that provides fast allocation and purge-only release
///
/// Allocation advances an offset in the current chunk, pulling a fresh
/// chunk from the backend when the remainder is insufficient. Individual
/// block deallocation is unsupported.
pub struct Pool {
    backend: Arc<dyn Backend>,
    chunk_size: usize,
    inner: Mutex<PoolInner>,
}

impl Pool {
    /// Create a pool with the default chunk size
    pub fn new(backend: Arc<dyn Backend>) -> Result<Self> {
        Self::with_chunk_size(backend, DEFAULT_CHUNK_SIZE)
    }

    /// Create a pool with an explicit chunk size, eagerly allocating the
    /// first chunk
    pub fn with_chunk_size(backend: Arc<dyn Backend>, chunk_size: usize) -> Result<Self> {
        let first = backend.allocate(chunk_size)?;
        Ok(Self {
            backend,
            chunk_size,
            inner: Mutex::new(PoolInner {
                chunks: vec![Chunk::new(first)],
                oversize: Vec::new(),
            }),
        })
    }

    /// The configured chunk size
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Allocate an 8-byte-aligned region of `size` bytes
    ///
    /// Fails with `OutOfMemory` only when the backend refuses a chunk.
    pub fn allocate(&self, size: usize) -> Result<VarlenRef> {
        let mut inner = self.inner.lock();

        // Oversize requests get a dedicated chunk that purge frees whole.
        if size > self.chunk_size {
            let data = self.backend.allocate(size)?;
            inner.oversize.push(Chunk::new(data));
            return Ok(VarlenRef {
                chunk: (inner.oversize.len() - 1) as u32 | OVERSIZE_FLAG,
                offset: 0,
                len: size as u32,
            });
        }

        let mut aligned = align_up(inner.chunks.last().map_or(0, |c| c.offset));
        if aligned + size > self.chunk_size {
            let data = self.backend.allocate(self.chunk_size)?;
            inner.chunks.push(Chunk::new(data));
            aligned = 0;
        }

        let chunk_index = inner.chunks.len() - 1;
        let chunk = &mut inner.chunks[chunk_index];
        chunk.offset = aligned + size;

        Ok(VarlenRef {
            chunk: chunk_index as u32,
            offset: aligned as u32,
            len: size as u32,
        })
    }

    /// Allocate an 8-byte-aligned region initialized to zeros
    ///
    /// Fresh backend chunks are already zeroed; this also covers regions
    /// handed out from the first chunk after a purge.
    pub fn allocate_zeroed(&self, size: usize) -> Result<VarlenRef> {
        let varlen = self.allocate(size)?;
        let mut inner = self.inner.lock();
        let chunk = Self::chunk_mut(&mut inner, varlen.chunk)?;
        let start = varlen.offset as usize;
        chunk.data[start..start + size].fill(0);
        Ok(varlen)
    }

    /// Allocate a region and copy `bytes` into it
    pub fn intern(&self, bytes: &[u8]) -> Result<VarlenRef> {
        let varlen = self.allocate(bytes.len())?;
        self.write(varlen, bytes)?;
        Ok(varlen)
    }

    /// Copy `bytes` into the referenced region
    pub fn write(&self, varlen: VarlenRef, bytes: &[u8]) -> Result<()> {
        if bytes.len() != varlen.len() {
            return Err(Error::internal(format!(
                "varlen write of {} bytes into region of {}",
                bytes.len(),
                varlen.len()
            )));
        }
        let mut inner = self.inner.lock();
        let chunk = Self::chunk_mut(&mut inner, varlen.chunk)?;
        let start = varlen.offset as usize;
        if start + bytes.len() > chunk.data.len() {
            return Err(Error::corrupt("varlen reference past chunk end"));
        }
        chunk.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Copy the referenced region out of the pool
    pub fn read(&self, varlen: VarlenRef) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock();
        let chunk = Self::chunk_mut(&mut inner, varlen.chunk)?;
        let start = varlen.offset as usize;
        let end = start + varlen.len();
        if end > chunk.data.len() {
            return Err(Error::corrupt("varlen reference past chunk end"));
        }
        Ok(chunk.data[start..end].to_vec())
    }

    /// Free every chunk except the first and reset its offset
    ///
    /// All outstanding [`VarlenRef`] handles are invalidated.
    pub fn purge(&self) {
        let mut inner = self.inner.lock();
        for chunk in inner.chunks.drain(1..) {
            self.backend.release(chunk.data.len());
        }
        for chunk in inner.oversize.drain(..) {
            self.backend.release(chunk.data.len());
        }
        if let Some(first) = inner.chunks.first_mut() {
            first.offset = 0;
        }
    }

    /// Total backend bytes currently held by this pool
    pub fn allocated_bytes(&self) -> usize {
        let inner = self.inner.lock();
        inner
            .chunks
            .iter()
            .chain(inner.oversize.iter())
            .map(|c| c.data.len())
            .sum()
    }

    fn chunk_mut(inner: &mut PoolInner, index: u32) -> Result<&mut Chunk> {
        let (list, idx) = if index & OVERSIZE_FLAG != 0 {
            (&mut inner.oversize, (index & !OVERSIZE_FLAG) as usize)
        } else {
            (&mut inner.chunks, index as usize)
        };
        list.get_mut(idx)
            .ok_or_else(|| Error::corrupt("varlen reference to unknown chunk"))
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        for chunk in inner.chunks.iter().chain(inner.oversize.iter()) {
            self.backend.release(chunk.data.len());
        }
    }
}

#[inline]
fn align_up(offset: usize) -> usize {
    (offset + ALLOC_ALIGN - 1) & !(ALLOC_ALIGN - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::HeapBackend;

    fn pool_with_chunk(chunk_size: usize) -> Pool {
        Pool::with_chunk_size(Arc::new(HeapBackend::new()), chunk_size).unwrap()
    }

    #[test]
    fn test_allocate_is_aligned() {
        let pool = pool_with_chunk(256);
        let a = pool.allocate(3).unwrap();
        let b = pool.allocate(5).unwrap();
        assert_eq!(a.offset % 8, 0);
        assert_eq!(b.offset % 8, 0);
        assert_ne!(a.offset, b.offset);
    }

    #[test]
    fn test_allocate_advances_to_new_chunk() {
        let pool = pool_with_chunk(64);
        // fill the first chunk
        pool.allocate(60).unwrap();
        let b = pool.allocate(16).unwrap();
        assert_eq!(b.chunk, 1);
        assert_eq!(b.offset, 0);
        assert_eq!(pool.allocated_bytes(), 128);
    }

    #[test]
    fn test_oversize_allocation() {
        let pool = pool_with_chunk(64);
        let big = pool.allocate(1000).unwrap();
        assert_eq!(big.len(), 1000);
        let data = vec![7u8; 1000];
        pool.write(big, &data).unwrap();
        assert_eq!(pool.read(big).unwrap(), data);
        // oversize chunks do not consume the bump chunk
        let small = pool.allocate(8).unwrap();
        assert_eq!(small.chunk, 0);
    }

    #[test]
    fn test_intern_roundtrip() {
        let pool = pool_with_chunk(256);
        let varlen = pool.intern(b"hello world").unwrap();
        assert_eq!(pool.read(varlen).unwrap(), b"hello world");
    }

    #[test]
    fn test_purge_keeps_first_chunk() {
        let pool = pool_with_chunk(64);
        pool.allocate(60).unwrap();
        pool.allocate(60).unwrap();
        pool.allocate(1000).unwrap();
        assert!(pool.allocated_bytes() > 64);

        pool.purge();
        assert_eq!(pool.allocated_bytes(), 64);

        // the first chunk is reusable from offset 0
        let varlen = pool.allocate(16).unwrap();
        assert_eq!(varlen.chunk, 0);
        assert_eq!(varlen.offset, 0);
    }

    #[test]
    fn test_allocate_zeroed_after_purge() {
        let pool = pool_with_chunk(64);
        let varlen = pool.intern(&[0xAB; 16]).unwrap();
        assert_eq!(pool.read(varlen).unwrap(), vec![0xAB; 16]);

        pool.purge();
        let varlen = pool.allocate_zeroed(16).unwrap();
        assert_eq!(pool.read(varlen).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn test_out_of_memory_surfaces() {
        let backend = Arc::new(HeapBackend::with_capacity_limit(128));
        let pool = Pool::with_chunk_size(Arc::clone(&backend) as _, 64).unwrap();
        pool.allocate(60).unwrap();
        // second chunk fits the limit, third does not
        pool.allocate(60).unwrap();
        let err = pool.allocate(60).unwrap_err();
        assert!(err.is_out_of_memory());
    }

    #[test]
    fn test_varlen_ref_bytes_roundtrip() {
        let varlen = VarlenRef {
            chunk: 3 | OVERSIZE_FLAG,
            offset: 16,
            len: 1000,
        };
        assert_eq!(VarlenRef::from_bytes(&varlen.to_bytes()), varlen);
    }
}
