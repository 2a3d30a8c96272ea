//! Terminal rendering of the member tree via `termtree`.

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::FamilyTree;

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for FamilyTree {
    /// Each node shows `label score (h=height)`; children are tagged `L`/`R`
    /// so a lone child's side stays visible.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn describe(tree: &FamilyTree, idx: Index, side: &str) -> Tree<String> {
            let Some(node) = tree.get(idx) else {
                return Tree::new(format!("{}?", side));
            };
            let mut subtree = Tree::new(format!(
                "{}{} (h={})",
                side, node.member, node.height
            ));
            if let Some(left) = node.left {
                subtree.push(describe(tree, left, "L "));
            }
            if let Some(right) = node.right {
                subtree.push(describe(tree, right, "R "));
            }
            subtree
        }

        match self.root() {
            Some(root) => describe(self, root, ""),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}
