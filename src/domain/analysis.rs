//! Depth, root path, rank and common-ancestor queries.
//!
//! Rank is tree depth: the number of edges between the root and a member,
//! re-walked from the root on every query instead of being cached.

use std::cmp::Ordering;

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::{FamilyTree, Member};

impl FamilyTree {
    /// Number of edges walked from the root until `score` is met.
    ///
    /// For an absent score this is the depth at which the search fell off
    /// the tree.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self, score: f64) -> usize {
        let mut edges = 0;
        let mut current = self.root();
        while let Some(node) = current.and_then(|idx| self.get(idx)) {
            current = match score.partial_cmp(&node.member.score) {
                Some(Ordering::Greater) => node.right,
                Some(Ordering::Less) => node.left,
                _ => return edges,
            };
            edges += 1;
        }
        edges
    }

    /// Every node visited while searching for `score`, root first.
    ///
    /// Ends with the member itself when present, otherwise with the last
    /// node before the search fell off the tree.
    #[instrument(level = "trace", skip(self))]
    pub fn root_path(&self, score: f64) -> Vec<Index> {
        let mut path = Vec::new();
        let mut current = self.root();
        while let Some(idx) = current {
            let Some(node) = self.get(idx) else {
                break;
            };
            path.push(idx);
            current = match score.partial_cmp(&node.member.score) {
                Some(Ordering::Greater) => node.right,
                Some(Ordering::Less) => node.left,
                _ => break,
            };
        }
        path
    }

    /// Members whose depth equals `target`, left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn enumerate_at_depth(&self, target: usize) -> Vec<&Member> {
        let mut found = Vec::new();
        self.collect_at_depth(self.root(), target, &mut found);
        found
    }

    fn collect_at_depth<'a>(&'a self, node: Option<Index>, target: usize, found: &mut Vec<&'a Member>) {
        let Some(node) = node.and_then(|idx| self.get(idx)) else {
            return;
        };
        match self.depth(node.member.score).cmp(&target) {
            // Depth only grows below this point
            Ordering::Greater => {}
            Ordering::Equal => found.push(&node.member),
            Ordering::Less => {
                self.collect_at_depth(node.left, target, found);
                self.collect_at_depth(node.right, target, found);
            }
        }
    }

    /// Members sharing the rank of `score`.
    pub fn rank_peers(&self, score: f64) -> Vec<&Member> {
        self.enumerate_at_depth(self.depth(score))
    }

    /// Deepest node on both root paths.
    ///
    /// Falls back to the root when either path is empty; None only for an
    /// empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn nearest_common_ancestor(&self, first: f64, second: f64) -> Option<Index> {
        let first = self.root_path(first);
        let second = self.root_path(second);
        if first.is_empty() || second.is_empty() {
            return self.root();
        }

        first
            .iter()
            .zip(&second)
            .take_while(|(a, b)| a == b)
            .last()
            .map(|(a, _)| *a)
            .or(self.root())
    }
}
