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

//! Memo-based plan binding
//!
//! The optimizer side of the crate: a memo of logical equivalence groups
//! and the lazy binding iterators that enumerate every concrete plan tree
//! matching a structural pattern, driving rule exploration on demand.
//!
//! ## Modules
//!
//! - `operators` - the closed logical operator set and group ids
//! - `group` / `memo` - equivalence groups and the memo forest
//! - `pattern` - structural templates with wildcard leaves
//! - `plan` - concrete plan trees produced by binding
//! - `rules` - transformation rules and their idempotent exploration
//! - `binding` - the group/item binding iterators

pub mod binding;
pub mod group;
pub mod memo;
pub mod operators;
pub mod pattern;
pub mod plan;
pub mod rules;

pub use binding::{GroupBindingIterator, ItemBindingIterator};
pub use group::Group;
pub use memo::{Memo, Optimizer};
pub use operators::{ChildGroups, GroupId, OpType, Operator};
pub use pattern::Pattern;
pub use plan::OpPlanNode;
pub use rules::{CollapseDuplicateFilter, Rule};
