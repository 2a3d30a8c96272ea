use std::cmp::Ordering;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::{ChangeEvent, ChangeLog, Discard};

/// A scored member of the family.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Opaque name token
    pub label: String,
    /// Ordering key, treated as the member's identity
    pub score: f64,
}

impl Member {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.3}", self.label, self.score)
    }
}

/// Tree node in the arena-based member tree.
#[derive(Debug)]
pub struct MemberNode {
    /// Member stored at this position
    pub member: Member,
    /// -1 stands for an absent subtree, so a leaf has height 0
    pub height: i32,
    /// Index of the subtree with smaller scores
    pub left: Option<Index>,
    /// Index of the subtree with greater scores
    pub right: Option<Index>,
}

impl MemberNode {
    fn leaf(member: Member) -> Self {
        Self {
            member,
            height: 0,
            left: None,
            right: None,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = Index> {
        self.left.into_iter().chain(self.right)
    }
}

/// The four AVL restructurings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    LeftLeft,
    LeftRight,
    RightLeft,
    RightRight,
}

/// Height-balanced search tree of members keyed by score.
///
/// Nodes live in a generational arena, each node owning its children through
/// `Option<Index>` links. Indices stay stable for the lifetime of a member,
/// so they double as node identities for path comparisons.
#[derive(Debug)]
pub struct FamilyTree {
    /// Arena storage for all tree nodes
    arena: Arena<MemberNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl Default for FamilyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FamilyTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get(&self, idx: Index) -> Option<&MemberNode> {
        self.arena.get(idx)
    }

    pub fn member(&self, idx: Index) -> Option<&Member> {
        self.arena.get(idx).map(|node| &node.member)
    }

    /// Height of the whole tree, -1 when empty.
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    pub fn height_of(&self, idx: Option<Index>) -> i32 {
        idx.and_then(|i| self.arena.get(i))
            .map_or(-1, |node| node.height)
    }

    /// Locates the member holding exactly `score`.
    pub fn find(&self, score: f64) -> Option<Index> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = self.arena.get(idx)?;
            current = match score.partial_cmp(&node.member.score) {
                Some(Ordering::Greater) => node.right,
                Some(Ordering::Less) => node.left,
                _ => return Some(idx),
            };
        }
        None
    }

    /// Inserts a member and returns the new root.
    ///
    /// Every node passed on the way down welcomes the newcomer. A score that
    /// is already present identifies with the existing member: nothing is
    /// added and that member keeps its label.
    #[instrument(level = "debug", skip(self, log), fields(label = %member.label, score = member.score))]
    pub fn insert(&mut self, member: Member, log: &mut impl ChangeLog) -> Index {
        let root = self.insert_at(self.root, member, log);
        self.root = Some(root);
        root
    }

    fn insert_at(&mut self, node: Option<Index>, member: Member, log: &mut impl ChangeLog) -> Index {
        let Some(idx) = node else {
            trace!(label = %member.label, "new leaf");
            return self.arena.insert(MemberNode::leaf(member));
        };

        let current = &self.arena[idx];
        match member.score.partial_cmp(&current.member.score) {
            Some(Ordering::Greater) => {
                log.record(ChangeEvent::welcomed(&current.member.label, &member.label));
                let right = current.right;
                let child = self.insert_at(right, member, log);
                self.arena[idx].right = Some(child);
            }
            Some(Ordering::Less) => {
                log.record(ChangeEvent::welcomed(&current.member.label, &member.label));
                let left = current.left;
                let child = self.insert_at(left, member, log);
                self.arena[idx].left = Some(child);
            }
            _ => debug!(existing = %current.member.label, "score already present"),
        }
        self.rebalance(idx)
    }

    /// Removes the member holding `score` and returns the new root.
    ///
    /// Matching is by score alone; `label` only annotates the trace span.
    /// Removing an absent score is a no-op and records nothing.
    #[instrument(level = "debug", skip(self, log))]
    pub fn delete(&mut self, label: &str, score: f64, log: &mut impl ChangeLog) -> Option<Index> {
        self.root = self.remove_at(self.root, score, log);
        self.root
    }

    fn remove_at(&mut self, node: Option<Index>, score: f64, log: &mut impl ChangeLog) -> Option<Index> {
        let idx = node?;
        let current = &self.arena[idx];
        match score.partial_cmp(&current.member.score) {
            Some(Ordering::Greater) => {
                let right = current.right;
                let child = self.remove_at(right, score, log);
                self.arena[idx].right = child;
            }
            Some(Ordering::Less) => {
                let left = current.left;
                let child = self.remove_at(left, score, log);
                self.arena[idx].left = child;
            }
            _ => return self.unlink(idx, log),
        }
        Some(self.rebalance(idx))
    }

    /// Successor relocation: drops the copied-up successor without reporting.
    fn remove_silently(&mut self, node: Option<Index>, score: f64) -> Option<Index> {
        self.remove_at(node, score, &mut Discard)
    }

    fn unlink(&mut self, idx: Index, log: &mut impl ChangeLog) -> Option<Index> {
        let node = &self.arena[idx];
        match (node.left, node.right) {
            (Some(_), Some(right)) => {
                let successor = self.leftmost(right);
                let heir = self.arena[successor].member.clone();
                log.record(ChangeEvent::departed(&node.member.label, Some(&heir.label)));
                trace!(heir = %heir.label, "successor moves up");
                let heir_score = heir.score;
                self.arena[idx].member = heir;
                let remaining = self.remove_silently(Some(right), heir_score);
                self.arena[idx].right = remaining;
                Some(self.rebalance(idx))
            }
            (None, None) => {
                let removed = self.arena.remove(idx)?;
                log.record(ChangeEvent::departed(&removed.member.label, None));
                None
            }
            (Some(child), None) | (None, Some(child)) => {
                let removed = self.arena.remove(idx)?;
                let replacement = self.arena.get(child).map(|n| n.member.label.as_str());
                log.record(ChangeEvent::departed(&removed.member.label, replacement));
                Some(self.rebalance(child))
            }
        }
    }

    fn leftmost(&self, mut idx: Index) -> Index {
        while let Some(left) = self.arena[idx].left {
            idx = left;
        }
        idx
    }

    fn update_height(&mut self, idx: Index) {
        let node = &self.arena[idx];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.arena[idx].height = height;
    }

    fn child_heights(&self, idx: Option<Index>) -> (i32, i32) {
        idx.and_then(|i| self.arena.get(i))
            .map_or((-1, -1), |node| {
                (self.height_of(node.left), self.height_of(node.right))
            })
    }

    /// Restores the balance invariant at `idx` and returns the subtree root.
    fn rebalance(&mut self, idx: Index) -> Index {
        self.update_height(idx);
        let (left, right) = self.child_heights(Some(idx));
        if (left - right).abs() <= 1 {
            return idx;
        }

        let rotation = self.select_rotation(idx);
        trace!(?rotation, label = %self.arena[idx].member.label, "rebalancing");
        match rotation {
            Rotation::LeftLeft => self.rotate_right(idx),
            Rotation::LeftRight => {
                if let Some(left) = self.arena[idx].left {
                    let pivot = self.rotate_left(left);
                    self.arena[idx].left = Some(pivot);
                }
                self.rotate_right(idx)
            }
            Rotation::RightLeft => {
                if let Some(right) = self.arena[idx].right {
                    let pivot = self.rotate_right(right);
                    self.arena[idx].right = Some(pivot);
                }
                self.rotate_left(idx)
            }
            Rotation::RightRight => self.rotate_left(idx),
        }
    }

    /// Equal grandchild heights on the heavy side resolve to a single rotation.
    fn select_rotation(&self, idx: Index) -> Rotation {
        let node = &self.arena[idx];
        if self.height_of(node.left) > self.height_of(node.right) {
            let (outer, inner) = self.child_heights(node.left);
            if outer >= inner {
                Rotation::LeftLeft
            } else {
                Rotation::LeftRight
            }
        } else {
            let (inner, outer) = self.child_heights(node.right);
            if inner > outer {
                Rotation::RightLeft
            } else {
                Rotation::RightRight
            }
        }
    }

    fn rotate_right(&mut self, idx: Index) -> Index {
        let Some(pivot) = self.arena[idx].left else {
            return idx;
        };
        self.arena[idx].left = self.arena[pivot].right;
        self.arena[pivot].right = Some(idx);
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, idx: Index) -> Index {
        let Some(pivot) = self.arena[idx].right else {
            return idx;
        };
        self.arena[idx].right = self.arena[pivot].left;
        self.arena[pivot].left = Some(idx);
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    /// Ascending score order.
    pub fn iter_inorder(&self) -> InOrderIterator<'_> {
        InOrderIterator::new(self)
    }

    /// Children before parents, left subtree first.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Walks the whole tree and verifies ordering, heights, balance and that
    /// every stored node is reachable from the root exactly once.
    #[instrument(level = "debug", skip(self))]
    pub fn check_invariants(&self) -> DomainResult<()> {
        let mut reachable = 0;
        if let Some(root) = self.root {
            self.verify(root, None, None, &mut reachable)?;
        }
        if reachable != self.arena.len() {
            return Err(DomainError::Unreachable {
                reachable,
                stored: self.arena.len(),
            });
        }
        Ok(())
    }

    fn verify(
        &self,
        idx: Index,
        lower: Option<f64>,
        upper: Option<f64>,
        reachable: &mut usize,
    ) -> DomainResult<i32> {
        let node = self
            .arena
            .get(idx)
            .ok_or_else(|| DomainError::DanglingLink(format!("{:?}", idx)))?;
        *reachable += 1;
        let score = node.member.score;
        let above = lower.map_or(true, |l| score > l);
        let below = upper.map_or(true, |u| score < u);
        if !(above && below) {
            return Err(DomainError::OrderViolation {
                label: node.member.label.clone(),
                score,
                lower,
                upper,
            });
        }

        let left = match node.left {
            Some(child) => self.verify(child, lower, Some(score), reachable)?,
            None => -1,
        };
        let right = match node.right {
            Some(child) => self.verify(child, Some(score), upper, reachable)?,
            None => -1,
        };

        let actual = 1 + left.max(right);
        if node.height != actual {
            return Err(DomainError::HeightMismatch {
                label: node.member.label.clone(),
                stored: node.height,
                actual,
            });
        }
        if (left - right).abs() > 1 {
            return Err(DomainError::Unbalanced {
                label: node.member.label.clone(),
                left,
                right,
            });
        }
        Ok(actual)
    }
}

pub struct InOrderIterator<'a> {
    tree: &'a FamilyTree,
    stack: Vec<Index>,
}

impl<'a> InOrderIterator<'a> {
    fn new(tree: &'a FamilyTree) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
        };
        iter.push_left_spine(tree.root());
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<Index>) {
        while let Some(idx) = current {
            self.stack.push(idx);
            current = self.tree.get(idx).and_then(|node| node.left);
        }
    }
}

impl<'a> Iterator for InOrderIterator<'a> {
    type Item = (Index, &'a MemberNode);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.tree.get(idx)?;
        self.push_left_spine(node.right);
        Some((idx, node))
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a FamilyTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a FamilyTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a MemberNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    // Right first so the left subtree is emitted first
                    if let Some(right) = node.right {
                        self.stack.push((right, false));
                    }
                    if let Some(left) = node.left {
                        self.stack.push((left, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
