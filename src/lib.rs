//! famtree: scored family members kept in an AVL-balanced search tree.
//!
//! The [`domain`] layer holds the tree engine and its analyses, the
//! [`application`] layer parses command scripts and drives the tree, and the
//! [`cli`] layer wires both to the `famtree` binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;
