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

//! Log record layout consumed by the surrounding logger
//!
//! Every record is `header [+ serialized tuple]`, little-endian:
//!
//! ```text
//! record_type:  u8
//! database_oid: u32
//! table_oid:    u32
//! txn_id:       u64
//! item_pointer: u32 (block), u32 (offset)
//! ```
//!
//! INSERT and UPDATE records carry the tuple serializer's bytes as the
//! body; DELETE records are header-only. The engine does not write a log
//! itself; it produces these records bit-exactly for whoever does.

use crate::core::{DataType, Error, ItemPointer, Oid, Result, Tuple, TxnId, Value};

/// Byte length of a serialized record header
pub const LOG_RECORD_HEADER_SIZE: usize = 1 + 4 + 4 + 8 + 4 + 4;

/// Kind of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogRecordType {
    /// Tuple insert; body carries the tuple
    Insert = 1,
    /// Tuple update; body carries the new version
    Update = 2,
    /// Tuple delete; header only
    Delete = 3,
}

impl LogRecordType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(LogRecordType::Insert),
            2 => Some(LogRecordType::Update),
            3 => Some(LogRecordType::Delete),
            _ => None,
        }
    }
}

/// Fixed-width header of every log record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecordHeader {
    pub record_type: LogRecordType,
    pub database_oid: Oid,
    pub table_oid: Oid,
    pub txn_id: TxnId,
    pub location: ItemPointer,
}

/// A log record: header plus an optional tuple body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    header: LogRecordHeader,
    body: Option<Vec<u8>>,
}

impl LogRecord {
    /// Build an INSERT record for a tuple
    pub fn insert(
        database_oid: Oid,
        table_oid: Oid,
        txn_id: TxnId,
        location: ItemPointer,
        tuple: &Tuple,
    ) -> Self {
        Self {
            header: LogRecordHeader {
                record_type: LogRecordType::Insert,
                database_oid,
                table_oid,
                txn_id,
                location,
            },
            body: Some(serialize_tuple(tuple)),
        }
    }

    /// Build an UPDATE record for the new tuple version
    pub fn update(
        database_oid: Oid,
        table_oid: Oid,
        txn_id: TxnId,
        location: ItemPointer,
        tuple: &Tuple,
    ) -> Self {
        Self {
            header: LogRecordHeader {
                record_type: LogRecordType::Update,
                database_oid,
                table_oid,
                txn_id,
                location,
            },
            body: Some(serialize_tuple(tuple)),
        }
    }

    /// Build a header-only DELETE record
    pub fn delete(database_oid: Oid, table_oid: Oid, txn_id: TxnId, location: ItemPointer) -> Self {
        Self {
            header: LogRecordHeader {
                record_type: LogRecordType::Delete,
                database_oid,
                table_oid,
                txn_id,
                location,
            },
            body: None,
        }
    }

    /// The record header
    pub fn header(&self) -> &LogRecordHeader {
        &self.header
    }

    /// The serialized tuple body, if any
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Serialize to the wire layout
    pub fn serialize(&self) -> Vec<u8> {
        let body_len = self.body.as_ref().map_or(0, Vec::len);
        let mut buf = Vec::with_capacity(LOG_RECORD_HEADER_SIZE + body_len);
        buf.push(self.header.record_type as u8);
        buf.extend_from_slice(&self.header.database_oid.to_le_bytes());
        buf.extend_from_slice(&self.header.table_oid.to_le_bytes());
        buf.extend_from_slice(&self.header.txn_id.to_le_bytes());
        buf.extend_from_slice(&self.header.location.block.to_le_bytes());
        buf.extend_from_slice(&self.header.location.offset.to_le_bytes());
        if let Some(body) = &self.body {
            buf.extend_from_slice(body);
        }
        buf
    }

    /// Decode a record from its wire layout
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        if data.len() < LOG_RECORD_HEADER_SIZE {
            return Err(Error::corrupt("log record shorter than header"));
        }
        let record_type = LogRecordType::from_u8(data[0])
            .ok_or_else(|| Error::corrupt(format!("unknown log record type {}", data[0])))?;
        let database_oid = Oid::from_le_bytes(data[1..5].try_into().unwrap());
        let table_oid = Oid::from_le_bytes(data[5..9].try_into().unwrap());
        let txn_id = TxnId::from_le_bytes(data[9..17].try_into().unwrap());
        let block = Oid::from_le_bytes(data[17..21].try_into().unwrap());
        let offset = Oid::from_le_bytes(data[21..25].try_into().unwrap());

        let body = match record_type {
            LogRecordType::Delete => None,
            _ => Some(data[LOG_RECORD_HEADER_SIZE..].to_vec()),
        };

        Ok(Self {
            header: LogRecordHeader {
                record_type,
                database_oid,
                table_oid,
                txn_id,
                location: ItemPointer::new(block, offset),
            },
            body,
        })
    }
}

/// Serialize a value in the tagged little-endian body format
pub fn serialize_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null(dt) => {
            buf.push(0);
            buf.push(dt.as_u8());
        }
        Value::Integer(i) => {
            buf.push(1);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Value::Float(f) => {
            buf.push(2);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::Boolean(b) => {
            buf.push(3);
            buf.push(*b as u8);
        }
        Value::Timestamp(ts) => {
            buf.push(4);
            buf.extend_from_slice(&ts.timestamp_micros().to_le_bytes());
        }
        Value::Text(s) => {
            buf.push(5);
            buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
    }
}

/// Deserialize one value, returning it and the bytes consumed
pub fn deserialize_value(data: &[u8]) -> Result<(Value, usize)> {
    let tag = *data.first().ok_or_else(|| Error::corrupt("empty value"))?;
    let rest = &data[1..];
    match tag {
        0 => {
            let dt = rest
                .first()
                .and_then(|&b| DataType::from_u8(b))
                .ok_or_else(|| Error::corrupt("missing null type hint"))?;
            Ok((Value::null(dt), 2))
        }
        1 => {
            let bytes: [u8; 8] = rest
                .get(..8)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| Error::corrupt("truncated integer"))?;
            Ok((Value::integer(i64::from_le_bytes(bytes)), 9))
        }
        2 => {
            let bytes: [u8; 8] = rest
                .get(..8)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| Error::corrupt("truncated float"))?;
            Ok((Value::float(f64::from_le_bytes(bytes)), 9))
        }
        3 => {
            let b = *rest.first().ok_or_else(|| Error::corrupt("truncated boolean"))?;
            Ok((Value::boolean(b != 0), 2))
        }
        4 => {
            let bytes: [u8; 8] = rest
                .get(..8)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| Error::corrupt("truncated timestamp"))?;
            let micros = i64::from_le_bytes(bytes);
            let ts = chrono::DateTime::from_timestamp_micros(micros)
                .ok_or_else(|| Error::corrupt("timestamp out of range"))?;
            Ok((Value::timestamp(ts), 9))
        }
        5 => {
            let len_bytes: [u8; 4] = rest
                .get(..4)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| Error::corrupt("truncated text length"))?;
            let len = u32::from_le_bytes(len_bytes) as usize;
            let bytes = rest
                .get(4..4 + len)
                .ok_or_else(|| Error::corrupt("truncated text payload"))?;
            let text = std::str::from_utf8(bytes)
                .map_err(|_| Error::corrupt("invalid utf-8 in text value"))?;
            Ok((Value::text(text), 1 + 4 + len))
        }
        _ => Err(Error::corrupt(format!("unknown value tag {}", tag))),
    }
}

/// Serialize a tuple: value count then tagged values
pub fn serialize_tuple(tuple: &Tuple) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(tuple.column_count() as u32).to_le_bytes());
    for value in tuple.values() {
        serialize_value(value, &mut buf);
    }
    buf
}

/// Decode a tuple produced by [`serialize_tuple`]
pub fn deserialize_tuple(data: &[u8]) -> Result<Tuple> {
    let count_bytes: [u8; 4] = data
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::corrupt("truncated tuple header"))?;
    let count = u32::from_le_bytes(count_bytes) as usize;
    let mut values = Vec::with_capacity(count);
    let mut cursor = 4;
    for _ in 0..count {
        let (value, consumed) = deserialize_value(&data[cursor..])?;
        values.push(value);
        cursor += consumed;
    }
    Ok(Tuple::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_byte_layout() {
        let record = LogRecord::delete(0x01020304, 0x05060708, 0x1112131415161718, ItemPointer::new(0xAABBCCDD, 9));
        let bytes = record.serialize();
        assert_eq!(bytes.len(), LOG_RECORD_HEADER_SIZE);
        assert_eq!(bytes[0], 3); // DELETE
        assert_eq!(&bytes[1..5], &[0x04, 0x03, 0x02, 0x01]); // database oid LE
        assert_eq!(&bytes[5..9], &[0x08, 0x07, 0x06, 0x05]); // table oid LE
        assert_eq!(
            &bytes[9..17],
            &[0x18, 0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11]
        ); // txn id LE
        assert_eq!(&bytes[17..21], &[0xDD, 0xCC, 0xBB, 0xAA]); // block LE
        assert_eq!(&bytes[21..25], &[0x09, 0x00, 0x00, 0x00]); // offset LE
    }

    #[test]
    fn test_insert_record_roundtrip() {
        let tuple = Tuple::new(vec![
            Value::integer(42),
            Value::text("alice"),
            Value::null(DataType::Float),
        ]);
        let record = LogRecord::insert(1, 2, 3, ItemPointer::new(4, 5), &tuple);
        let decoded = LogRecord::deserialize(&record.serialize()).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(deserialize_tuple(decoded.body().unwrap()).unwrap(), tuple);
    }

    #[test]
    fn test_delete_record_has_no_body() {
        let record = LogRecord::delete(1, 2, 3, ItemPointer::new(4, 5));
        assert!(record.body().is_none());
        let decoded = LogRecord::deserialize(&record.serialize()).unwrap();
        assert!(decoded.body().is_none());
    }

    #[test]
    fn test_value_roundtrip() {
        let values = [
            Value::integer(-1),
            Value::float(2.5),
            Value::boolean(true),
            Value::text(""),
            Value::text("héllo"),
            Value::null(DataType::Text),
        ];
        for v in &values {
            let mut buf = Vec::new();
            serialize_value(v, &mut buf);
            let (decoded, consumed) = deserialize_value(&buf).unwrap();
            assert_eq!(&decoded, v);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn test_corrupt_data_is_rejected() {
        assert!(LogRecord::deserialize(&[1, 2, 3]).is_err());
        assert!(deserialize_value(&[99]).is_err());
        assert!(deserialize_tuple(&[2, 0, 0, 0, 1, 1]).is_err());
    }
}
