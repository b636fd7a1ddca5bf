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

//! The memo and the optimizer driving rule exploration over it
//!
//! The memo is a vector of [`Group`]s indexed by [`GroupId`]. It is not
//! concurrency-safe; binding is single-threaded per optimizer instance,
//! which `&mut` receivers enforce.

use std::sync::Arc;

use tracing::trace;

use super::group::Group;
use super::operators::{GroupId, Operator};
use super::rules::Rule;

/// The forest of equivalence groups
#[derive(Debug, Default)]
pub struct Memo {
    groups: Vec<Group>,
}

impl Memo {
    /// An empty memo
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty group, returning its id
    pub fn add_group(&mut self) -> GroupId {
        self.groups.push(Group::new());
        self.groups.len() - 1
    }

    /// Append a group seeded with the given items
    pub fn add_group_with_items(&mut self, items: impl IntoIterator<Item = Operator>) -> GroupId {
        let id = self.add_group();
        for op in items {
            self.groups[id].add_item(op);
        }
        id
    }

    /// Insert an item into a group unless an identical one is present
    ///
    /// Returns whether the item was added; duplicates are dropped, which
    /// keeps rule exploration idempotent.
    pub fn insert_item(&mut self, group_id: GroupId, op: Operator) -> bool {
        self.groups[group_id].add_item(op)
    }

    /// The group with the given id
    #[inline]
    pub fn group(&self, group_id: GroupId) -> &Group {
        &self.groups[group_id]
    }

    /// Mutable access to the group with the given id
    #[inline]
    pub fn group_mut(&mut self, group_id: GroupId) -> &mut Group {
        &mut self.groups[group_id]
    }

    /// Number of groups
    #[inline]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// A memo plus the registered transformation rules
///
/// Binding iterators drive exploration through
/// [`Optimizer::explore_item`]; the memo's sticky explored flags make the
/// pass run at most once per `(group, item)` pair.
pub struct Optimizer {
    pub memo: Memo,
    rules: Vec<Arc<dyn Rule>>,
}

impl Optimizer {
    /// An optimizer with an empty memo and no rules
    pub fn new() -> Self {
        Self {
            memo: Memo::new(),
            rules: Vec::new(),
        }
    }

    /// An optimizer with the given rule set
    pub fn with_rules(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self {
            memo: Memo::new(),
            rules,
        }
    }

    /// Register a rule
    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    /// The registered rules
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Apply one rule's exploration step to one item
    ///
    /// Output operators land in the same group; duplicates are dropped,
    /// so a second application produces no new items.
    pub fn explore_item(&mut self, group_id: GroupId, item_index: usize, rule: &dyn Rule) {
        let item = self.memo.group(group_id).operators()[item_index];
        let outputs = rule.apply(&self.memo, group_id, item);
        for op in outputs {
            if self.memo.insert_item(group_id, op) {
                trace!(group_id, rule = rule.name(), "exploration added item");
            }
        }
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}
