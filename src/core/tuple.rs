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

//! Tuples - rows of values
//!
//! A tuple is the unit of insertion into a table. Index keys are built by
//! projecting a tuple onto the index's column ordinals.

use super::types::Oid;
use super::value::Value;

/// A row of values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    /// Create a tuple from a value list
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Number of values
    #[inline]
    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    /// The value at the given column ordinal
    #[inline]
    pub fn value(&self, column: usize) -> &Value {
        &self.values[column]
    }

    /// All values in order
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Whether the value at the given column ordinal is NULL
    #[inline]
    pub fn is_null(&self, column: usize) -> bool {
        self.values[column].is_null()
    }

    /// Project the tuple onto the given column ordinals, in order
    ///
    /// This is how index keys are derived from a table tuple.
    pub fn project(&self, columns: &[Oid]) -> Tuple {
        Tuple {
            values: columns
                .iter()
                .map(|&c| self.values[c as usize].clone())
                .collect(),
        }
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Tuple::new(values)
    }
}
