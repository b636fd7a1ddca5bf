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

//! Binding iterator integration tests: leaf bindings, cartesian
//! enumeration order, rule exploration idempotence.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tilestore::optimizer::{
    CollapseDuplicateFilter, GroupBindingIterator, GroupId, Memo, OpPlanNode, OpType, Operator,
    Optimizer, Pattern, Rule,
};

fn drain(mut iter: GroupBindingIterator<'_>) -> Vec<Arc<OpPlanNode>> {
    let mut plans = Vec::new();
    while iter.has_next() {
        plans.push(iter.next().unwrap());
    }
    plans
}

#[test]
fn leaf_pattern_binds_the_group_once() {
    let mut optimizer = Optimizer::new();
    let g0 = optimizer
        .memo
        .add_group_with_items([Operator::Get { table: 1 }, Operator::Get { table: 2 }]);

    let plans = drain(GroupBindingIterator::new(&mut optimizer, g0, Pattern::leaf()));
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].op, Operator::Leaf { group: g0 });
    assert!(plans[0].children.is_empty());
}

#[test]
fn join_enumeration_in_odometer_order() {
    let mut optimizer = Optimizer::new();
    // outer group: 2 Get items; inner group: 3 Get items
    let g1 = optimizer
        .memo
        .add_group_with_items([Operator::Get { table: 10 }, Operator::Get { table: 11 }]);
    let g2 = optimizer.memo.add_group_with_items([
        Operator::Get { table: 20 },
        Operator::Get { table: 21 },
        Operator::Get { table: 22 },
    ]);
    let g0 = optimizer
        .memo
        .add_group_with_items([Operator::InnerJoin { outer: g1, inner: g2 }]);

    let pattern = Pattern::with_children(
        OpType::InnerJoin,
        vec![
            Arc::new(Pattern::new(OpType::Get)),
            Arc::new(Pattern::new(OpType::Get)),
        ],
    );
    let plans = drain(GroupBindingIterator::new(&mut optimizer, g0, pattern));
    assert_eq!(plans.len(), 6);

    // odometer order: rightmost child position increments first
    let expected: Vec<(usize, usize)> =
        vec![(10, 20), (10, 21), (10, 22), (11, 20), (11, 21), (11, 22)];
    let actual: Vec<(usize, usize)> = plans
        .iter()
        .map(|plan| {
            let outer = match plan.children[0].op {
                Operator::Get { table } => table,
                other => panic!("unexpected outer {:?}", other),
            };
            let inner = match plan.children[1].op {
                Operator::Get { table } => table,
                other => panic!("unexpected inner {:?}", other),
            };
            (outer, inner)
        })
        .collect();
    assert_eq!(actual, expected);

    // each distinct plan appears exactly once
    let mut dedup = plans.clone();
    dedup.sort_by_key(|p| format!("{:?}", p));
    dedup.dedup();
    assert_eq!(dedup.len(), plans.len());
}

#[test]
fn join_over_leaf_children_binds_groups_whole() {
    let mut optimizer = Optimizer::new();
    let g1 = optimizer
        .memo
        .add_group_with_items([Operator::Get { table: 10 }, Operator::Get { table: 11 }]);
    let g2 = optimizer.memo.add_group_with_items([
        Operator::Get { table: 20 },
        Operator::Get { table: 21 },
        Operator::Get { table: 22 },
    ]);
    let g0 = optimizer
        .memo
        .add_group_with_items([Operator::InnerJoin { outer: g1, inner: g2 }]);

    // a Leaf child pattern stands in for the whole child group, so the
    // join binds exactly once regardless of the child groups' item counts
    let pattern = Pattern::with_children(
        OpType::InnerJoin,
        vec![Pattern::leaf(), Pattern::leaf()],
    );
    let plans = drain(GroupBindingIterator::new(&mut optimizer, g0, pattern));
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].children[0].op, Operator::Leaf { group: g1 });
    assert_eq!(plans[0].children[1].op, Operator::Leaf { group: g2 });
}

#[test]
fn deep_pattern_binds_nested_structure() {
    let mut optimizer = Optimizer::new();
    let g0 = optimizer.memo.add_group_with_items([Operator::Get { table: 1 }]);
    let g1 = optimizer
        .memo
        .add_group_with_items([Operator::Filter { child: g0 }]);
    let g2 = optimizer
        .memo
        .add_group_with_items([Operator::Limit { child: g1 }]);

    let pattern = Pattern::with_children(
        OpType::Limit,
        vec![Pattern::with_children(OpType::Filter, vec![Pattern::leaf()])],
    );
    let plans = drain(GroupBindingIterator::new(&mut optimizer, g2, pattern));
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].op, Operator::Limit { child: g1 });
    assert_eq!(plans[0].children[0].op, Operator::Filter { child: g0 });
    assert_eq!(
        plans[0].children[0].children[0].op,
        Operator::Leaf { group: g0 }
    );
}

/// Counts every exploration application so tests can observe rule firing
struct CountingCollapse {
    inner: CollapseDuplicateFilter,
    applications: Arc<AtomicUsize>,
}

impl Rule for CountingCollapse {
    fn name(&self) -> &str {
        "counting_collapse"
    }

    fn apply(&self, memo: &Memo, group_id: GroupId, item: Operator) -> Vec<Operator> {
        self.applications.fetch_add(1, Ordering::SeqCst);
        self.inner.apply(memo, group_id, item)
    }
}

#[test]
fn exploration_is_idempotent_across_iterators() {
    let applications = Arc::new(AtomicUsize::new(0));
    let mut optimizer = Optimizer::with_rules(vec![Arc::new(CountingCollapse {
        inner: CollapseDuplicateFilter,
        applications: Arc::clone(&applications),
    })]);

    // g2 = Filter(g1), g1 = Filter(g0), g0 = Get
    let g0 = optimizer.memo.add_group_with_items([Operator::Get { table: 1 }]);
    let g1 = optimizer
        .memo
        .add_group_with_items([Operator::Filter { child: g0 }]);
    let g2 = optimizer
        .memo
        .add_group_with_items([Operator::Filter { child: g1 }]);

    // Filter(Filter(Leaf)): the original item matches through g1
    let pattern = Pattern::with_children(
        OpType::Filter,
        vec![Pattern::with_children(OpType::Filter, vec![Pattern::leaf()])],
    );

    let first = drain(GroupBindingIterator::new(
        &mut optimizer,
        g2,
        Arc::clone(&pattern),
    ));
    // exploration rewrote Filter(Filter(x)) -> Filter(x) into g2
    assert_eq!(optimizer.memo.group(g2).len(), 2);
    assert!(optimizer
        .memo
        .group(g2)
        .operators()
        .contains(&Operator::Filter { child: g0 }));

    let items_after_first = optimizer.memo.group(g2).len();
    let second = drain(GroupBindingIterator::new(
        &mut optimizer,
        g2,
        Arc::clone(&pattern),
    ));

    // same plan set, and no items appeared from re-exploration
    assert_eq!(first, second);
    assert_eq!(optimizer.memo.group(g2).len(), items_after_first);

    // a third pass finds everything explored: the rule no longer fires
    let counted = applications.load(Ordering::SeqCst);
    let third = drain(GroupBindingIterator::new(
        &mut optimizer,
        g2,
        Arc::clone(&pattern),
    ));
    assert_eq!(third, first);
    assert_eq!(applications.load(Ordering::SeqCst), counted);
}

#[test]
fn exploration_results_feed_matching() {
    let mut optimizer =
        Optimizer::with_rules(vec![Arc::new(CollapseDuplicateFilter) as Arc<dyn Rule>]);
    let g0 = optimizer.memo.add_group_with_items([Operator::Get { table: 1 }]);
    let g1 = optimizer
        .memo
        .add_group_with_items([Operator::Filter { child: g0 }]);
    let g2 = optimizer
        .memo
        .add_group_with_items([Operator::Filter { child: g1 }]);

    // Filter(Get): only the rewritten item Filter(g0) matches, because
    // the original child g1 holds a Filter, not a Get
    let pattern = Pattern::with_children(
        OpType::Filter,
        vec![Arc::new(Pattern::new(OpType::Get))],
    );
    let plans = drain(GroupBindingIterator::new(&mut optimizer, g2, pattern));
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].op, Operator::Filter { child: g0 });
    assert_eq!(plans[0].children[0].op, Operator::Get { table: 1 });
}

#[test]
fn empty_group_yields_nothing_for_item_patterns() {
    let mut optimizer = Optimizer::new();
    let g0 = optimizer.memo.add_group();
    let plans = drain(GroupBindingIterator::new(
        &mut optimizer,
        g0,
        Arc::new(Pattern::new(OpType::Get)),
    ));
    assert!(plans.is_empty());
}
