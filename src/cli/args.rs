//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::DivisionStrategy;

/// Family tree intelligence: an AVL-balanced member tree with rank, ancestry and division analysis
#[derive(Parser, Debug)]
#[command(name = "famtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Independent-set strategy for INTEL_DIVIDE (overrides config)
    #[arg(long, value_enum, global = true)]
    pub division: Option<DivisionArg>,

    /// Decimal places for scores in analysis results (overrides config)
    #[arg(long, global = true)]
    pub precision: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command script and write the change log and results
    Run {
        /// Command script
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Parse a command script without running it
    Check {
        /// Command script
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Run a script silently and show the final tree
    Tree {
        /// Command script
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Run a script silently and list members by ascending score
    Members {
        /// Command script
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a commented template
    Template,
    /// Show config file locations
    Path,
}

/// Division strategy as accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DivisionArg {
    Greedy,
    Maximum,
}

impl From<DivisionArg> for DivisionStrategy {
    fn from(arg: DivisionArg) -> Self {
        match arg {
            DivisionArg::Greedy => DivisionStrategy::Greedy,
            DivisionArg::Maximum => DivisionStrategy::Maximum,
        }
    }
}
