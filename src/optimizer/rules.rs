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

//! Transformation rules
//!
//! A rule's exploration step looks at one item and proposes logically
//! equivalent operators for the same group. Rules must be deterministic;
//! the memo drops duplicate outputs, so re-running a rule on the same
//! item never grows the group.

use super::memo::Memo;
use super::operators::{GroupId, Operator};

/// A logical transformation rule
pub trait Rule: Send + Sync {
    /// Rule name, for diagnostics
    fn name(&self) -> &str;

    /// Propose equivalent operators for `item` of `group_id`
    ///
    /// Rules don't expose the structure of their output, so binding has
    /// to apply every registered rule conservatively.
    fn apply(&self, memo: &Memo, group_id: GroupId, item: Operator) -> Vec<Operator>;
}

/// `Filter(Filter(x)) -> Filter(x)`: collapse directly nested filters
pub struct CollapseDuplicateFilter;

impl Rule for CollapseDuplicateFilter {
    fn name(&self) -> &str {
        "collapse_duplicate_filter"
    }

    fn apply(&self, memo: &Memo, _group_id: GroupId, item: Operator) -> Vec<Operator> {
        let Operator::Filter { child } = item else {
            return Vec::new();
        };
        memo.group(child)
            .operators()
            .iter()
            .filter_map(|op| match op {
                Operator::Filter { child: inner } => Some(Operator::Filter { child: *inner }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_duplicate_filter() {
        let mut memo = Memo::new();
        let g0 = memo.add_group_with_items([Operator::Get { table: 1 }]);
        let g1 = memo.add_group_with_items([Operator::Filter { child: g0 }]);
        let g2 = memo.add_group_with_items([Operator::Filter { child: g1 }]);

        let rule = CollapseDuplicateFilter;
        let outputs = rule.apply(&memo, g2, memo.group(g2).operators()[0]);
        assert_eq!(outputs, vec![Operator::Filter { child: g0 }]);

        // not a filter-over-filter: nothing proposed
        assert!(rule.apply(&memo, g1, memo.group(g1).operators()[0]).is_empty());
        assert!(rule
            .apply(&memo, g0, Operator::Get { table: 1 })
            .is_empty());
    }
}
