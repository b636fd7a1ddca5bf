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

//! Core types for tilestore
//!
//! Fundamental types used across the storage engine and the optimizer:
//! identifiers, errors, values, schemas and tuples.

pub mod error;
pub mod schema;
pub mod tuple;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use schema::{Column, Schema};
pub use tuple::Tuple;
pub use types::{
    CommitId, DataType, ItemPointer, Oid, TxnId, INVALID_OID, INVALID_TXN_ID, MAX_COMMIT_ID,
};
pub use value::Value;
