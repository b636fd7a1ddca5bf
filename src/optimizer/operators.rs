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

//! Logical operators of the memo
//!
//! Operators are a closed sum type; each variant carries the group ids of
//! its structural children. The child enumeration is a plain match rather
//! than visitor double-dispatch, since the operator set is closed.

use smallvec::SmallVec;

/// Index of a group in the memo
pub type GroupId = usize;

/// Child group ids of an operator; joins have two, the rest at most one
pub type ChildGroups = SmallVec<[GroupId; 2]>;

/// A logical operator item stored in a memo group
///
/// `Get` carries the table it scans so distinct base-table accesses stay
/// distinct items within a group; every other operator is identified by
/// its child group ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Base-table access; no children
    Get { table: usize },
    /// Projection over a child group
    Project { child: GroupId },
    /// Filter over a child group
    Filter { child: GroupId },
    /// Inner join of two child groups
    InnerJoin { outer: GroupId, inner: GroupId },
    /// Left outer join
    LeftJoin { outer: GroupId, inner: GroupId },
    /// Right outer join
    RightJoin { outer: GroupId, inner: GroupId },
    /// Full outer join
    OuterJoin { outer: GroupId, inner: GroupId },
    /// Aggregation over a child group
    Aggregate { child: GroupId },
    /// Limit over a child group
    Limit { child: GroupId },
    /// Pattern-only stand-in for an entire group
    Leaf { group: GroupId },
}

/// The shape of an operator, used by patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Get,
    Project,
    Filter,
    InnerJoin,
    LeftJoin,
    RightJoin,
    OuterJoin,
    Aggregate,
    Limit,
    /// Wildcard matching any group
    Leaf,
}

impl Operator {
    /// The operator's shape
    pub fn op_type(&self) -> OpType {
        match self {
            Operator::Get { .. } => OpType::Get,
            Operator::Project { .. } => OpType::Project,
            Operator::Filter { .. } => OpType::Filter,
            Operator::InnerJoin { .. } => OpType::InnerJoin,
            Operator::LeftJoin { .. } => OpType::LeftJoin,
            Operator::RightJoin { .. } => OpType::RightJoin,
            Operator::OuterJoin { .. } => OpType::OuterJoin,
            Operator::Aggregate { .. } => OpType::Aggregate,
            Operator::Limit { .. } => OpType::Limit,
            Operator::Leaf { .. } => OpType::Leaf,
        }
    }

    /// The operator's structural child groups, in position order
    pub fn children(&self) -> ChildGroups {
        match *self {
            Operator::Get { .. } | Operator::Leaf { .. } => ChildGroups::new(),
            Operator::Project { child }
            | Operator::Filter { child }
            | Operator::Aggregate { child }
            | Operator::Limit { child } => {
                let mut children = ChildGroups::new();
                children.push(child);
                children
            }
            Operator::InnerJoin { outer, inner }
            | Operator::LeftJoin { outer, inner }
            | Operator::RightJoin { outer, inner }
            | Operator::OuterJoin { outer, inner } => {
                let mut children = ChildGroups::new();
                children.push(outer);
                children.push(inner);
                children
            }
        }
    }
}
