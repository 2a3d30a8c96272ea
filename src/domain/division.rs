//! Division analysis: labelling an independent set of members.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::FamilyTree;
use crate::domain::error::DomainError;

/// How the division analysis picks its independent set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionStrategy {
    /// Post-order rule: a member is selected iff none of its children is.
    #[default]
    Greedy,
    /// Include/exclude dynamic program yielding a maximum independent set.
    Maximum,
}

impl fmt::Display for DivisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivisionStrategy::Greedy => write!(f, "greedy"),
            DivisionStrategy::Maximum => write!(f, "maximum"),
        }
    }
}

impl FromStr for DivisionStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(DivisionStrategy::Greedy),
            "maximum" => Ok(DivisionStrategy::Maximum),
            other => Err(DomainError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Best counts for a subtree with its root taken or left out.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    with: usize,
    without: usize,
}

impl Tally {
    fn best(&self) -> usize {
        self.with.max(self.without)
    }
}

impl FamilyTree {
    /// Number of members selected under `strategy`.
    #[instrument(level = "debug", skip(self))]
    pub fn division(&self, strategy: DivisionStrategy) -> usize {
        let count = self.select_independent_set(strategy).len();
        debug!(count, "division analysed");
        count
    }

    pub fn select_independent_set(&self, strategy: DivisionStrategy) -> HashSet<Index> {
        match strategy {
            DivisionStrategy::Greedy => self.greedy_selection(),
            DivisionStrategy::Maximum => self.maximum_selection(),
        }
    }

    fn greedy_selection(&self) -> HashSet<Index> {
        let mut selected = HashSet::new();
        for (idx, node) in self.iter_postorder() {
            if !node.children().any(|child| selected.contains(&child)) {
                selected.insert(idx);
            }
        }
        selected
    }

    fn maximum_selection(&self) -> HashSet<Index> {
        let mut tallies: HashMap<Index, Tally> = HashMap::new();
        for (idx, node) in self.iter_postorder() {
            let mut tally = Tally {
                with: 1,
                without: 0,
            };
            for child in node.children() {
                let sub = tallies.get(&child).copied().unwrap_or_default();
                tally.with += sub.without;
                tally.without += sub.best();
            }
            tallies.insert(idx, tally);
        }

        let mut selected = HashSet::new();
        let mut stack: Vec<(Index, bool)> = self.root().map(|r| (r, false)).into_iter().collect();
        while let Some((idx, parent_taken)) = stack.pop() {
            let Some(node) = self.get(idx) else {
                continue;
            };
            let tally = tallies.get(&idx).copied().unwrap_or_default();
            let taken = !parent_taken && tally.with >= tally.without;
            if taken {
                selected.insert(idx);
            }
            stack.extend(node.children().map(|child| (child, taken)));
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::Member;
    use crate::domain::events::Discard;

    #[test]
    fn given_strategy_names_when_parsing_then_accepts_any_case() {
        assert_eq!("Greedy".parse::<DivisionStrategy>().unwrap(), DivisionStrategy::Greedy);
        assert_eq!("MAXIMUM".parse::<DivisionStrategy>().unwrap(), DivisionStrategy::Maximum);
        assert!("best".parse::<DivisionStrategy>().is_err());
    }

    #[test]
    fn given_single_member_when_dividing_then_selects_it() {
        let mut tree = FamilyTree::new();
        tree.insert(Member::new("solo", 1.0), &mut Discard);
        assert_eq!(tree.division(DivisionStrategy::Greedy), 1);
        assert_eq!(tree.division(DivisionStrategy::Maximum), 1);
    }

    #[test]
    fn given_empty_tree_when_dividing_then_selects_nobody() {
        let tree = FamilyTree::new();
        assert_eq!(tree.division(DivisionStrategy::Greedy), 0);
        assert_eq!(tree.division(DivisionStrategy::Maximum), 0);
    }
}
