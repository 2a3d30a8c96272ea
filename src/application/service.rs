//! Intelligence service: runs script commands against one family tree.

use std::io::Write;

use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationResult, Command, IoResultExt, Script};
use crate::config::Settings;
use crate::domain::{ChangeEvent, FamilyTree, Member};

/// Owns the tree for one run and formats analysis results.
#[derive(Debug, Default)]
pub struct IntelligenceService {
    tree: FamilyTree,
    settings: Settings,
}

impl IntelligenceService {
    pub fn new(settings: Settings) -> Self {
        Self {
            tree: FamilyTree::new(),
            settings,
        }
    }

    pub fn tree(&self) -> &FamilyTree {
        &self.tree
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_tree(self) -> FamilyTree {
        self.tree
    }

    /// Runs the founder and every command of `script`, returning the number
    /// of commands executed.
    #[instrument(level = "debug", skip_all, fields(commands = script.command_count()))]
    pub fn run_script<W: Write>(&mut self, script: &Script, out: &mut W) -> ApplicationResult<usize> {
        if let Some(founder) = &script.founder {
            self.admit(founder, out)?;
        }
        for command in &script.commands {
            self.execute(command, out)?;
        }
        info!(members = self.tree.len(), "script finished");
        Ok(script.commands.len())
    }

    /// Executes one command, writing change-log and result lines to `out`.
    #[instrument(level = "debug", skip(self, out), fields(command = command.keyword()))]
    pub fn execute<W: Write>(&mut self, command: &Command, out: &mut W) -> ApplicationResult<()> {
        match command {
            Command::MemberIn(member) => self.admit(member, out)?,
            Command::MemberOut(member) => {
                let mut events = Vec::new();
                self.tree.delete(&member.label, member.score, &mut events);
                if events.is_empty() {
                    debug!(label = %member.label, "no member with that score");
                }
                write_events(&events, out)?;
            }
            Command::IntelTarget(first, second) => match self.target_analysis(first, second) {
                Some(line) => writeln!(out, "{}", line).with_context("write target analysis")?,
                None => warn!("target analysis on an empty family, nothing written"),
            },
            Command::IntelRank(member) => {
                let line = self.rank_analysis(member);
                writeln!(out, "{}", line).with_context("write rank analysis")?;
            }
            Command::IntelDivide => {
                let line = self.division_analysis();
                writeln!(out, "{}", line).with_context("write division analysis")?;
            }
        }
        out.flush().with_context("flush output")
    }

    fn admit<W: Write>(&mut self, member: &Member, out: &mut W) -> ApplicationResult<()> {
        let mut events = Vec::new();
        self.tree.insert(member.clone(), &mut events);
        write_events(&events, out)
    }

    /// `Target Analysis Result: <label> <score>`, None for an empty tree.
    pub fn target_analysis(&self, first: &Member, second: &Member) -> Option<String> {
        let ancestor = self
            .tree
            .nearest_common_ancestor(first.score, second.score)
            .and_then(|idx| self.tree.member(idx))?;
        Some(format!("Target Analysis Result: {}", self.format_member(ancestor)))
    }

    /// `Rank Analysis Result:` followed by every member at the same depth.
    pub fn rank_analysis(&self, member: &Member) -> String {
        let peers = self
            .tree
            .rank_peers(member.score)
            .into_iter()
            .map(|m| format!(" {}", self.format_member(m)))
            .join("");
        format!("Rank Analysis Result:{}", peers)
    }

    /// `Division Analysis Result: <count>`.
    pub fn division_analysis(&self) -> String {
        let count = self.tree.division(self.settings.division);
        format!("Division Analysis Result: {}", count)
    }

    fn format_member(&self, member: &Member) -> String {
        format!(
            "{} {:.*}",
            member.label, self.settings.precision, member.score
        )
    }
}

fn write_events<W: Write>(events: &[ChangeEvent], out: &mut W) -> ApplicationResult<()> {
    for event in events {
        writeln!(out, "{}", event).with_context("write change log")?;
    }
    Ok(())
}
