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

//! Binding iterators - lazy enumeration of pattern matches over the memo
//!
//! [`GroupBindingIterator`] walks a group's items left to right,
//! delegating each to an [`ItemBindingIterator`] that matches one item
//! against the pattern root and enumerates the cartesian product of its
//! children's bindings in mixed-radix odometer order.
//!
//! Both follow the `has_next`/`next` protocol in strict alternation:
//! `has_next` advances the machine, `next` reads off the current binding.
//! They are explicit state machines, not generators.
//!
//! Constructing a group iterator drives rule exploration for the items
//! present at that point; items appended by that exploration are
//! enumerated by this iterator but stay unexplored until the next
//! iterator over the same group picks them up.

use std::sync::Arc;

use super::memo::Optimizer;
use super::operators::{GroupId, OpType, Operator};
use super::pattern::Pattern;
use super::plan::OpPlanNode;

/// Lazy enumerator of every plan in a group matching a pattern
pub struct GroupBindingIterator<'a> {
    optimizer: &'a mut Optimizer,
    group_id: GroupId,
    pattern: Arc<Pattern>,
    /// Items visible to this iterator (group size after construction's
    /// exploration pass)
    item_count: usize,
    current_item: usize,
    current_iter: Option<ItemBindingIterator>,
    leaf_done: bool,
}

impl<'a> GroupBindingIterator<'a> {
    /// Build an iterator over `group_id`, driving rule exploration for
    /// every item not yet explored
    ///
    /// Rules don't expose the structure of the output they produce, so
    /// every registered rule is applied conservatively. The explored flag
    /// is sticky: exploration runs at most once per `(group, item)` for
    /// the optimizer's lifetime.
    pub fn new(optimizer: &'a mut Optimizer, group_id: GroupId, pattern: Arc<Pattern>) -> Self {
        let explore_count = optimizer.memo.group(group_id).len();
        for item in 0..explore_count {
            if optimizer.memo.group(group_id).is_explored(item) {
                continue;
            }
            optimizer.memo.group_mut(group_id).set_explored(item);
            let rules: Vec<_> = optimizer.rules().to_vec();
            for rule in &rules {
                optimizer.explore_item(group_id, item, rule.as_ref());
            }
        }

        let item_count = optimizer.memo.group(group_id).len();
        Self {
            optimizer,
            group_id,
            pattern,
            item_count,
            current_item: 0,
            current_iter: None,
            leaf_done: false,
        }
    }

    /// Advance to the next binding, reporting whether one exists
    pub fn has_next(&mut self) -> bool {
        if self.pattern.op_type() == OpType::Leaf {
            return !self.leaf_done;
        }

        if let Some(iter) = self.current_iter.as_mut() {
            if !iter.has_next() {
                self.current_iter = None;
                self.current_item += 1;
            }
        }

        if self.current_iter.is_none() {
            // keep probing item iterators until one matches
            while self.current_item < self.item_count {
                let mut iter = ItemBindingIterator::new(
                    self.optimizer,
                    self.group_id,
                    self.current_item,
                    Arc::clone(&self.pattern),
                );
                if iter.has_next() {
                    self.current_iter = Some(iter);
                    break;
                }
                self.current_item += 1;
            }
        }

        self.current_iter.is_some()
    }

    /// The binding `has_next` advanced to
    ///
    /// A `Leaf` pattern yields exactly one one-node plan standing in for
    /// the whole group.
    pub fn next(&mut self) -> Option<Arc<OpPlanNode>> {
        if self.pattern.op_type() == OpType::Leaf {
            if self.leaf_done {
                return None;
            }
            self.leaf_done = true;
            return Some(Arc::new(OpPlanNode::leaf(self.group_id)));
        }
        self.current_iter.as_mut().map(ItemBindingIterator::next)
    }
}

/// Enumerator of one item's bindings against a pattern
///
/// Child bindings are fully materialized at construction by running a
/// group iterator per child position to exhaustion; enumeration then
/// walks the cartesian product with a mixed-radix odometer (rightmost
/// position increments first, carrying left on overflow).
pub struct ItemBindingIterator {
    op: Operator,
    first: bool,
    has_next: bool,
    current_children: Vec<Arc<OpPlanNode>>,
    children_bindings: Vec<Vec<Arc<OpPlanNode>>>,
    positions: Vec<usize>,
}

impl ItemBindingIterator {
    /// Match one item against the pattern root and materialize its child
    /// bindings
    ///
    /// Yields nothing when the operator shape or child arity differs from
    /// the pattern, or when any child position has zero bindings.
    pub fn new(
        optimizer: &mut Optimizer,
        group_id: GroupId,
        item_index: usize,
        pattern: Arc<Pattern>,
    ) -> Self {
        let op = optimizer.memo.group(group_id).operators()[item_index];
        let mut iter = Self {
            op,
            first: true,
            has_next: false,
            current_children: Vec::new(),
            children_bindings: Vec::new(),
            positions: Vec::new(),
        };

        if op.op_type() != pattern.op_type() {
            return iter;
        }
        let child_groups = op.children();
        let child_patterns = pattern.children();
        if child_groups.len() != child_patterns.len() {
            return iter;
        }

        for (&child_group, child_pattern) in child_groups.iter().zip(child_patterns.iter()) {
            let mut bindings = Vec::new();
            let mut group_iter =
                GroupBindingIterator::new(optimizer, child_group, Arc::clone(child_pattern));
            while group_iter.has_next() {
                if let Some(binding) = group_iter.next() {
                    bindings.push(binding);
                }
            }
            if bindings.is_empty() {
                return iter;
            }
            iter.current_children.push(Arc::clone(&bindings[0]));
            iter.children_bindings.push(bindings);
            iter.positions.push(0);
        }

        iter.has_next = true;
        iter
    }

    /// Advance the odometer, reporting whether a combination remains
    ///
    /// The first call reports the initial all-zeros combination; each
    /// later call increments from the rightmost position, carrying until
    /// a position moves or the leftmost overflows.
    pub fn has_next(&mut self) -> bool {
        if self.has_next && self.first {
            self.first = false;
            return true;
        }

        if self.has_next {
            let size = self.positions.len();
            let mut carried = 0;
            while carried < size {
                self.current_children.pop();
                let position = size - 1 - carried;
                self.positions[position] += 1;
                if self.positions[position] < self.children_bindings[position].len() {
                    break;
                }
                self.positions[position] = 0;
                carried += 1;
            }

            if carried == size {
                // every combination of the child bindings has been seen
                self.has_next = false;
            } else {
                // replay the popped tail at the new positions
                let offset = size - 1 - carried;
                for position in offset..size {
                    self.current_children.push(Arc::clone(
                        &self.children_bindings[position][self.positions[position]],
                    ));
                }
            }
        }
        self.has_next
    }

    /// The combination `has_next` advanced to
    pub fn next(&mut self) -> Arc<OpPlanNode> {
        Arc::new(OpPlanNode::with_children(
            self.op,
            self.current_children.clone(),
        ))
    }
}
