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

//! A memo group: one equivalence class of logical plans

use super::operators::Operator;

/// An equivalence class of operator items
///
/// `explored` runs parallel to `items`: once a rule pass has run for an
/// item the flag is sticky for the optimizer's lifetime, which is what
/// makes exploration idempotent per `(group, item)`.
#[derive(Debug, Default)]
pub struct Group {
    items: Vec<Operator>,
    explored: Vec<bool>,
}

impl Group {
    /// An empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item unless an identical one is already present
    ///
    /// Returns whether the item was added. New items start unexplored.
    pub fn add_item(&mut self, op: Operator) -> bool {
        if self.items.contains(&op) {
            return false;
        }
        self.items.push(op);
        self.explored.push(false);
        true
    }

    /// The items, in insertion order
    #[inline]
    pub fn operators(&self) -> &[Operator] {
        &self.items
    }

    /// Number of items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the group has no items
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the item at `index` has been explored
    #[inline]
    pub fn is_explored(&self, index: usize) -> bool {
        self.explored[index]
    }

    /// Stick the explored flag for the item at `index`
    #[inline]
    pub fn set_explored(&mut self, index: usize) {
        self.explored[index] = true;
    }
}
