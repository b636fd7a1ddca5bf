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

//! Structural patterns over the memo
//!
//! A pattern is a tree of operator shapes with wildcard `Leaf` nodes that
//! match any group. Binding filters the memo's plan shapes through a
//! pattern.

use std::sync::Arc;

use super::operators::OpType;

/// A structural template: an operator shape plus child patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    op_type: OpType,
    children: Vec<Arc<Pattern>>,
}

impl Pattern {
    /// A pattern with no children yet
    pub fn new(op_type: OpType) -> Self {
        Self {
            op_type,
            children: Vec::new(),
        }
    }

    /// The wildcard pattern matching any group
    pub fn leaf() -> Arc<Pattern> {
        Arc::new(Pattern::new(OpType::Leaf))
    }

    /// A pattern with the given children
    pub fn with_children(op_type: OpType, children: Vec<Arc<Pattern>>) -> Arc<Pattern> {
        Arc::new(Self { op_type, children })
    }

    /// Append a child pattern
    pub fn add_child(&mut self, child: Arc<Pattern>) {
        self.children.push(child);
    }

    /// The root operator shape
    #[inline]
    pub fn op_type(&self) -> OpType {
        self.op_type
    }

    /// Child patterns, in position order
    #[inline]
    pub fn children(&self) -> &[Arc<Pattern>] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_construction() {
        let join = Pattern::with_children(
            OpType::InnerJoin,
            vec![Pattern::leaf(), Pattern::leaf()],
        );
        assert_eq!(join.op_type(), OpType::InnerJoin);
        assert_eq!(join.children().len(), 2);
        assert_eq!(join.children()[0].op_type(), OpType::Leaf);
    }

    #[test]
    fn test_add_child() {
        let mut filter = Pattern::new(OpType::Filter);
        filter.add_child(Pattern::leaf());
        assert_eq!(filter.children().len(), 1);
    }
}
