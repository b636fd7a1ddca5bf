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

//! Concrete plan trees produced by binding

use std::sync::Arc;

use super::operators::{GroupId, Operator};

/// A concrete plan tree drawn from the memo
///
/// Structural equality compares the whole tree, which is what binding's
/// uniqueness guarantee is stated over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpPlanNode {
    /// The operator at this node
    pub op: Operator,
    /// Child plans, in the operator's child position order
    pub children: Vec<Arc<OpPlanNode>>,
}

impl OpPlanNode {
    /// A plan node with no children yet
    pub fn new(op: Operator) -> Self {
        Self {
            op,
            children: Vec::new(),
        }
    }

    /// The one-node plan standing in for an entire group
    pub fn leaf(group: GroupId) -> Self {
        Self::new(Operator::Leaf { group })
    }

    /// A plan node with the given children
    pub fn with_children(op: Operator, children: Vec<Arc<OpPlanNode>>) -> Self {
        Self { op, children }
    }
}
