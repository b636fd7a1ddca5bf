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

//! Core type definitions for tilestore
//!
//! This module defines the fundamental identifiers and types: object ids,
//! transaction and commit ids, tuple locations, and column data types.

use std::fmt;

/// Object identifier for catalog entities (tables, tile groups, indexes, columns)
pub type Oid = u32;

/// Sentinel for a missing or unresolved object id
pub const INVALID_OID: Oid = Oid::MAX;

/// Transaction identifier
pub type TxnId = u64;

/// Sentinel transaction id of a slot no transaction has claimed
pub const INVALID_TXN_ID: TxnId = 0;

/// Commit identifier (monotonic commit timestamp)
pub type CommitId = u64;

/// "Infinity" commit id; the begin commit id of an empty slot
pub const MAX_COMMIT_ID: CommitId = CommitId::MAX;

/// The durable identity of a tuple instance: `(tile_group_id, slot)`
///
/// An `ItemPointer` is never dereferenced directly. The tile-group id is
/// always resolved through the catalog manager so pointers stay valid
/// across layout transformations, which replace the tile group registered
/// under the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemPointer {
    /// Tile group id
    pub block: Oid,
    /// Slot within the tile group
    pub offset: Oid,
}

impl ItemPointer {
    /// The invalid pointer returned when an insert is refused
    pub const INVALID: ItemPointer = ItemPointer {
        block: INVALID_OID,
        offset: INVALID_OID,
    };

    /// Create a new item pointer
    #[inline]
    pub fn new(block: Oid, offset: Oid) -> Self {
        Self { block, offset }
    }

    /// Returns true if both components are valid
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.block != INVALID_OID && self.offset != INVALID_OID
    }

    /// Pack into a single u64 for atomic storage (block in the high half)
    #[inline]
    pub fn pack(&self) -> u64 {
        ((self.block as u64) << 32) | self.offset as u64
    }

    /// Unpack from the u64 representation produced by [`ItemPointer::pack`]
    #[inline]
    pub fn unpack(raw: u64) -> Self {
        Self {
            block: (raw >> 32) as Oid,
            offset: raw as Oid,
        }
    }
}

impl fmt::Display for ItemPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block, self.offset)
    }
}

/// Column data types supported by the engine
///
/// Integer, Float, Boolean and Timestamp are stored inline in tiles at a
/// fixed width. Text is stored out of line in the tile's varlen pool with
/// a fixed-width reference inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DataType {
    /// NULL data type, used for unknown/unspecified types
    #[default]
    Null = 0,

    /// 64-bit signed integer
    Integer = 1,

    /// 64-bit floating point number
    Float = 2,

    /// Boolean true/false
    Boolean = 3,

    /// Timestamp with timezone (stored as UTC microseconds)
    Timestamp = 4,

    /// UTF-8 text string, stored out of line
    Text = 5,
}

impl DataType {
    /// Returns true if values of this type are stored inline in a tile
    ///
    /// Non-inlined columns are excluded from optimizer samples.
    #[inline]
    pub fn is_inlined(&self) -> bool {
        !matches!(self, DataType::Text)
    }

    /// Width in bytes of the inline payload for this type
    ///
    /// Non-inlined types store a fixed-width varlen reference instead.
    pub fn inline_width(&self) -> usize {
        match self {
            DataType::Null => 0,
            DataType::Integer | DataType::Float | DataType::Timestamp => 8,
            DataType::Boolean => 1,
            // chunk + offset + length of the varlen reference
            DataType::Text => 12,
        }
    }

    /// Returns the type ID as u8 for serialization
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Create DataType from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DataType::Null),
            1 => Some(DataType::Integer),
            2 => Some(DataType::Float),
            3 => Some(DataType::Boolean),
            4 => Some(DataType::Timestamp),
            5 => Some(DataType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Null => write!(f, "NULL"),
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_pointer_validity() {
        assert!(!ItemPointer::INVALID.is_valid());
        assert!(ItemPointer::new(1, 0).is_valid());
        assert!(!ItemPointer::new(INVALID_OID, 0).is_valid());
        assert!(!ItemPointer::new(1, INVALID_OID).is_valid());
    }

    #[test]
    fn test_item_pointer_pack_roundtrip() {
        let ptr = ItemPointer::new(0xDEAD_BEEF, 42);
        assert_eq!(ItemPointer::unpack(ptr.pack()), ptr);
        assert_eq!(
            ItemPointer::unpack(ItemPointer::INVALID.pack()),
            ItemPointer::INVALID
        );
    }

    #[test]
    fn test_data_type_inlined() {
        assert!(DataType::Integer.is_inlined());
        assert!(DataType::Boolean.is_inlined());
        assert!(DataType::Timestamp.is_inlined());
        assert!(!DataType::Text.is_inlined());
    }

    #[test]
    fn test_data_type_u8_roundtrip() {
        for dt in [
            DataType::Null,
            DataType::Integer,
            DataType::Float,
            DataType::Boolean,
            DataType::Timestamp,
            DataType::Text,
        ] {
            assert_eq!(DataType::from_u8(dt.as_u8()), Some(dt));
        }
        assert_eq!(DataType::from_u8(200), None);
    }
}
