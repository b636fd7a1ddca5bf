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

//! Error types for tilestore
//!
//! This module defines all error types used throughout the storage engine.

use thiserror::Error;

/// Result type alias for tilestore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tilestore storage operations
///
/// Constraint and allocation failures surface to the caller; full tile
/// groups and failed lookups are handled internally and never appear here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Constraint errors
    // =========================================================================
    /// NOT NULL constraint violation during insert
    #[error("not null constraint failed for column {column}")]
    NotNullConstraint { column: String },

    /// Tuple column count does not match the table schema
    #[error("tuple columns don't match, expected {expected}, got {got}")]
    TupleColumnsNotMatch { expected: usize, got: usize },

    // =========================================================================
    // Storage errors
    // =========================================================================
    /// The memory backend refused an allocation
    #[error("out of memory: backend refused allocation of {requested} bytes")]
    OutOfMemory { requested: usize },

    /// A value's type does not match the column it is written to
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Row or column offset outside the tile's bounds
    #[error("offset out of bounds: {what} {got} >= {limit}")]
    OutOfBounds {
        what: &'static str,
        got: usize,
        limit: usize,
    },

    // =========================================================================
    // Other errors
    // =========================================================================
    /// Malformed serialized data
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new NotNullConstraint error
    pub fn not_null_constraint(column: impl Into<String>) -> Self {
        Error::NotNullConstraint {
            column: column.into(),
        }
    }

    /// Create a new TypeMismatch error
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a new Corrupt error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Error::Corrupt(message.into())
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a constraint violation error
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::NotNullConstraint { .. } | Error::TupleColumnsNotMatch { .. }
        )
    }

    /// Check if this error is fatal to the current operation
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Error::OutOfMemory { .. })
    }
}
