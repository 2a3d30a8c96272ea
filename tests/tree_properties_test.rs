//! Property tests: invariants of the balanced tree and its analyses hold for
//! arbitrary operation sequences.
//!
//! Scores are drawn from small integers so duplicates and misses occur often.

use std::collections::{BTreeSet, HashSet};

use famtree::domain::{ChangeEvent, Discard, DivisionStrategy, FamilyTree, Member};
use proptest::prelude::*;
use proptest::test_runner::Config;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16),
    Delete(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u16..300).prop_map(Op::Insert),
        2 => (0u16..300).prop_map(Op::Delete),
    ]
}

fn member(score: u16) -> Member {
    Member::new(format!("m{}", score), f64::from(score))
}

fn build(scores: &[u16]) -> FamilyTree {
    let mut tree = FamilyTree::new();
    for &score in scores {
        tree.insert(member(score), &mut Discard);
    }
    tree
}

fn inorder_scores(tree: &FamilyTree) -> Vec<f64> {
    tree.iter_inorder().map(|(_, n)| n.member.score).collect()
}

proptest! {
    #![proptest_config(Config {
        cases: 256,
        ..Config::default()
    })]

    #[test]
    fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 1..250)) {
        let mut tree = FamilyTree::new();
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(score) => {
                    tree.insert(member(score), &mut Discard);
                    model.insert(score);
                }
                Op::Delete(score) => {
                    tree.delete("", f64::from(score), &mut Discard);
                    model.remove(&score);
                }
            }
            if let Err(e) = tree.check_invariants() {
                return Err(TestCaseError::fail(e.to_string()));
            }
            prop_assert_eq!(tree.len(), model.len());
        }

        let expected: Vec<f64> = model.iter().map(|&s| f64::from(s)).collect();
        prop_assert_eq!(inorder_scores(&tree), expected);
    }

    #[test]
    fn height_respects_avl_bound(scores in prop::collection::hash_set(0u16..5000, 1..400)) {
        let scores: Vec<u16> = scores.into_iter().collect();
        let tree = build(&scores);

        let n = tree.len() as f64;
        let bound = 1.44 * (n + 2.0).log2() - 1.0;
        prop_assert!(
            f64::from(tree.height()) <= bound,
            "height {} exceeds {} for {} members", tree.height(), bound, n
        );
    }

    #[test]
    fn deleting_everything_empties_the_tree(
        (scores, order) in prop::collection::hash_set(0u16..1000, 1..150)
            .prop_flat_map(|set| {
                let scores: Vec<u16> = set.into_iter().collect();
                (Just(scores.clone()), Just(scores).prop_shuffle())
            })
    ) {
        let mut tree = build(&scores);
        prop_assert_eq!(tree.len(), scores.len());

        for score in order {
            let mut log: Vec<ChangeEvent> = Vec::new();
            tree.delete("", f64::from(score), &mut log);
            prop_assert_eq!(log.len(), 1);
            prop_assert!(tree.check_invariants().is_ok());
        }

        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.len(), 0);
    }

    #[test]
    fn depth_matches_root_path_and_enumeration(scores in prop::collection::vec(0u16..500, 1..200)) {
        let tree = build(&scores);

        let mut by_depth: Vec<Vec<f64>> = Vec::new();
        for (idx, node) in tree.iter_inorder() {
            let score = node.member.score;
            let depth = tree.depth(score);
            let path = tree.root_path(score);

            prop_assert_eq!(path.len(), depth + 1);
            prop_assert_eq!(path.last().copied(), Some(idx));
            prop_assert_eq!(path.first().copied(), tree.root());

            if by_depth.len() <= depth {
                by_depth.resize(depth + 1, Vec::new());
            }
            by_depth[depth].push(score);
        }

        for (depth, expected) in by_depth.iter().enumerate() {
            let found: Vec<f64> = tree.enumerate_at_depth(depth).iter().map(|m| m.score).collect();
            prop_assert_eq!(&found, expected);
        }
        prop_assert!(tree.enumerate_at_depth(by_depth.len()).is_empty());
    }

    #[test]
    fn common_ancestor_is_deepest_shared_node(
        scores in prop::collection::vec(0u16..500, 1..150),
        picks in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 1..20)
    ) {
        let tree = build(&scores);
        let present: Vec<f64> = inorder_scores(&tree);

        for (a, b) in picks {
            let a = present[a.index(present.len())];
            let b = present[b.index(present.len())];
            let ancestor = tree.nearest_common_ancestor(a, b).expect("non-empty tree");
            let found = tree.member(ancestor).unwrap().score;

            prop_assert!(tree.root_path(a).contains(&ancestor));
            prop_assert!(tree.root_path(b).contains(&ancestor));
            // In a search tree the lowest shared ancestor separates the two scores
            prop_assert!(a.min(b) <= found && found <= a.max(b));
        }
    }

    #[test]
    fn division_selects_an_independent_set(scores in prop::collection::vec(0u16..500, 0..200)) {
        let tree = build(&scores);

        for strategy in [DivisionStrategy::Greedy, DivisionStrategy::Maximum] {
            let selected = tree.select_independent_set(strategy);
            for &idx in &selected {
                let node = tree.get(idx).unwrap();
                for child in node.children() {
                    prop_assert!(!selected.contains(&child), "{} selected a parent and child", strategy);
                }
            }
        }

        // Greedy is maximal: every member left out has a selected child
        let greedy: HashSet<_> = tree.select_independent_set(DivisionStrategy::Greedy);
        for (idx, node) in tree.iter_postorder() {
            if !greedy.contains(&idx) {
                prop_assert!(node.children().any(|c| greedy.contains(&c)));
            }
        }

        // Taking leaves first is optimal on trees, so both strategies agree
        prop_assert_eq!(
            tree.division(DivisionStrategy::Greedy),
            tree.division(DivisionStrategy::Maximum)
        );
    }
}
