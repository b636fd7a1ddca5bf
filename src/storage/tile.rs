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

//! Tile - a contiguous fixed-width column-bundle buffer
//!
//! A tile stores `capacity` rows of a vertical slice of a table. Every
//! cell is fixed-width: a null marker byte followed by the inline payload.
//! Out-of-line values (text) are copied into the tile's varlen pool and a
//! fixed-width [`VarlenRef`] is stored inline instead.

use std::sync::Arc;

use chrono::DateTime;
use parking_lot::RwLock;

use crate::common::arena::{Pool, VarlenRef};
use crate::core::{DataType, Error, Result, Schema, Value};
use crate::storage::backend::Backend;

/// Width in bytes of a cell for the given column type (null marker + payload)
#[inline]
fn cell_width(data_type: DataType) -> usize {
    1 + data_type.inline_width()
}

/// A 2-D buffer of `capacity x column_count` fixed-width cells plus an
/// associated variable-length pool for out-of-line values
pub struct Tile {
    schema: Schema,
    capacity: usize,
    tuple_width: usize,
    column_offsets: Vec<usize>,
    data: RwLock<Box<[u8]>>,
    data_size: usize,
    pool: Pool,
    backend: Arc<dyn Backend>,
}

impl Tile {
    /// Allocate a tile for `capacity` rows of `schema`
    pub fn new(
        schema: Schema,
        capacity: usize,
        backend: Arc<dyn Backend>,
        pool_chunk_size: usize,
    ) -> Result<Self> {
        let mut column_offsets = Vec::with_capacity(schema.column_count());
        let mut tuple_width = 0;
        for column in schema.columns() {
            column_offsets.push(tuple_width);
            tuple_width += cell_width(column.data_type);
        }

        let data_size = capacity * tuple_width;
        let data = backend.allocate(data_size)?;
        let pool = Pool::with_chunk_size(Arc::clone(&backend), pool_chunk_size)?;

        Ok(Self {
            schema,
            capacity,
            tuple_width,
            column_offsets,
            data: RwLock::new(data),
            data_size,
            pool,
            backend,
        })
    }

    /// The tile's schema (the vertical slice it stores)
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of row slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The tile's varlen pool
    #[inline]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Read the value at `(row, column)`
    pub fn value_at(&self, row: usize, column: usize) -> Result<Value> {
        let start = self.cell_offset(row, column)?;
        let data_type = self.schema.data_type(column);
        let data = self.data.read();

        if data[start] != 0 {
            return Ok(Value::null(data_type));
        }
        let payload = &data[start + 1..start + cell_width(data_type)];

        match data_type {
            DataType::Integer => Ok(Value::integer(i64::from_le_bytes(
                payload.try_into().unwrap(),
            ))),
            DataType::Float => Ok(Value::float(f64::from_le_bytes(
                payload.try_into().unwrap(),
            ))),
            DataType::Boolean => Ok(Value::boolean(payload[0] != 0)),
            DataType::Timestamp => {
                let micros = i64::from_le_bytes(payload.try_into().unwrap());
                let ts = DateTime::from_timestamp_micros(micros)
                    .ok_or_else(|| Error::corrupt("timestamp out of range"))?;
                Ok(Value::timestamp(ts))
            }
            DataType::Text => {
                let varlen = VarlenRef::from_bytes(payload.try_into().unwrap());
                // The read must not hold the cell lock: pool has its own.
                drop(data);
                let bytes = self.pool.read(varlen)?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| Error::corrupt("invalid utf-8 in varlen pool"))?;
                Ok(Value::text_arc(Arc::from(text.as_str())))
            }
            DataType::Null => Ok(Value::null(DataType::Null)),
        }
    }

    /// Write `value` at `(row, column)`
    ///
    /// Out-of-line payloads are interned into the tile's pool first, so
    /// the cell write itself is a fixed-width copy.
    pub fn set_value_at(&self, row: usize, column: usize, value: &Value) -> Result<()> {
        let start = self.cell_offset(row, column)?;
        let data_type = self.schema.data_type(column);

        if !value.is_null() && value.data_type() != data_type {
            return Err(Error::type_mismatch(
                data_type.to_string(),
                value.data_type().to_string(),
            ));
        }

        let width = cell_width(data_type);
        let mut cell = vec![0u8; width];
        match value {
            Value::Null(_) => cell[0] = 1,
            Value::Integer(i) => cell[1..].copy_from_slice(&i.to_le_bytes()),
            Value::Float(f) => cell[1..].copy_from_slice(&f.to_le_bytes()),
            Value::Boolean(b) => cell[1] = *b as u8,
            Value::Timestamp(ts) => cell[1..].copy_from_slice(&ts.timestamp_micros().to_le_bytes()),
            Value::Text(s) => {
                let varlen = self.pool.intern(s.as_bytes())?;
                cell[1..].copy_from_slice(&varlen.to_bytes());
            }
        }

        let mut data = self.data.write();
        data[start..start + width].copy_from_slice(&cell);
        Ok(())
    }

    #[inline]
    fn cell_offset(&self, row: usize, column: usize) -> Result<usize> {
        if row >= self.capacity {
            debug_assert!(false, "row {} out of bounds", row);
            return Err(Error::OutOfBounds {
                what: "row",
                got: row,
                limit: self.capacity,
            });
        }
        if column >= self.schema.column_count() {
            debug_assert!(false, "column {} out of bounds", column);
            return Err(Error::OutOfBounds {
                what: "column",
                got: column,
                limit: self.schema.column_count(),
            });
        }
        Ok(row * self.tuple_width + self.column_offsets[column])
    }
}

impl Drop for Tile {
    fn drop(&mut self) {
        self.backend.release(self.data_size);
    }
}
