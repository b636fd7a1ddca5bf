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

//! Table and tile schemas
//!
//! A `Schema` describes either a full table or a single tile (a vertical
//! slice of a table). Tile schemas are built by regrouping the table
//! schema's columns according to a column map.

use super::types::DataType;

/// A column definition in a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Data type of the column
    pub data_type: DataType,

    /// Whether the column can contain NULL values
    pub nullable: bool,
}

impl Column {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// An ordered list of columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Create a schema from a column list
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Create a single-column schema (used for sample tiles)
    pub fn single(column: Column) -> Self {
        Self {
            columns: vec![column],
        }
    }

    /// Number of columns
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The column at the given ordinal
    #[inline]
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    /// All columns in order
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Data type of the column at the given ordinal
    #[inline]
    pub fn data_type(&self, index: usize) -> DataType {
        self.columns[index].data_type
    }

    /// Whether the column at the given ordinal accepts NULL
    #[inline]
    pub fn allow_null(&self, index: usize) -> bool {
        self.columns[index].nullable
    }

    /// Whether the column at the given ordinal is stored inline
    #[inline]
    pub fn is_inlined(&self, index: usize) -> bool {
        self.columns[index].data_type.is_inlined()
    }
}
