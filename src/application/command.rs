//! Command vocabulary of intelligence scripts.

use std::fmt;

use crate::domain::Member;

pub const MEMBER_IN: &str = "MEMBER_IN";
pub const MEMBER_OUT: &str = "MEMBER_OUT";
pub const INTEL_TARGET: &str = "INTEL_TARGET";
pub const INTEL_RANK: &str = "INTEL_RANK";
pub const INTEL_DIVIDE: &str = "INTEL_DIVIDE";

pub const KEYWORDS: [&str; 5] = [MEMBER_IN, MEMBER_OUT, INTEL_TARGET, INTEL_RANK, INTEL_DIVIDE];

/// One parsed script command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert a member
    MemberIn(Member),
    /// Remove the member holding this score
    MemberOut(Member),
    /// Nearest common ancestor of two members
    IntelTarget(Member, Member),
    /// Members sharing the rank (depth) of a member
    IntelRank(Member),
    /// Size of the independent set
    IntelDivide,
}

impl Command {
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::MemberIn(_) => MEMBER_IN,
            Command::MemberOut(_) => MEMBER_OUT,
            Command::IntelTarget(..) => INTEL_TARGET,
            Command::IntelRank(_) => INTEL_RANK,
            Command::IntelDivide => INTEL_DIVIDE,
        }
    }

    pub fn is_keyword(token: &str) -> bool {
        KEYWORDS.contains(&token)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::MemberIn(m) | Command::MemberOut(m) | Command::IntelRank(m) => {
                write!(f, "{} {} {}", self.keyword(), m.label, m.score)
            }
            Command::IntelTarget(a, b) => write!(
                f,
                "{} {} {} {} {}",
                self.keyword(),
                a.label,
                a.score,
                b.label,
                b.score
            ),
            Command::IntelDivide => write!(f, "{}", self.keyword()),
        }
    }
}

/// A parsed script: an optional founding member followed by commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub founder: Option<Member>,
    pub commands: Vec<Command>,
}

impl Script {
    /// Number of commands, not counting the founder.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// True when there is neither a founder nor any command.
    pub fn is_empty(&self) -> bool {
        self.founder.is_none() && self.commands.is_empty()
    }
}
