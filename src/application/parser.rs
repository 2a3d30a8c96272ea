//! Whitespace-token parser for intelligence scripts.
//!
//! Tokens may span lines freely. When the first token is not a keyword, the
//! first two tokens name the founding member.

use tracing::{debug, instrument};

use crate::application::command::*;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Member;

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    line: usize,
    text: &'a str,
}

struct Cursor<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        let tokens = input
            .lines()
            .enumerate()
            .flat_map(|(n, line)| {
                line.split_whitespace()
                    .map(move |text| Token { line: n + 1, text })
            })
            .collect();
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Line of the most recently consumed token, for end-of-input errors.
    fn last_line(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(1, |t| t.line)
    }

    fn expect(&mut self, context: &str, what: &str) -> ApplicationResult<Token<'a>> {
        self.next_token().ok_or_else(|| {
            ApplicationError::parse(self.last_line(), format!("{}: missing {}", context, what))
        })
    }

    fn member(&mut self, context: &str) -> ApplicationResult<Member> {
        let label = self.expect(context, "label")?;
        let score = self.expect(context, "score")?;
        let value: f64 = score.text.parse().map_err(|_| {
            ApplicationError::parse(
                score.line,
                format!("{}: invalid score '{}'", context, score.text),
            )
        })?;
        if !value.is_finite() {
            return Err(ApplicationError::parse(
                score.line,
                format!("{}: score must be finite, got '{}'", context, score.text),
            ));
        }
        Ok(Member::new(label.text, value))
    }
}

/// Parses a complete script.
#[instrument(level = "debug", skip(input))]
pub fn parse_script(input: &str) -> ApplicationResult<Script> {
    let mut cursor = Cursor::new(input);
    let mut script = Script::default();

    if let Some(first) = cursor.peek() {
        if !Command::is_keyword(first.text) {
            script.founder = Some(cursor.member("founder")?);
        }
    }

    while let Some(token) = cursor.next_token() {
        let command = match token.text {
            MEMBER_IN => Command::MemberIn(cursor.member(MEMBER_IN)?),
            MEMBER_OUT => Command::MemberOut(cursor.member(MEMBER_OUT)?),
            INTEL_TARGET => {
                let first = cursor.member(INTEL_TARGET)?;
                let second = cursor.member(INTEL_TARGET)?;
                Command::IntelTarget(first, second)
            }
            INTEL_RANK => Command::IntelRank(cursor.member(INTEL_RANK)?),
            INTEL_DIVIDE => Command::IntelDivide,
            other => {
                return Err(ApplicationError::parse(
                    token.line,
                    format!("unknown command '{}'", other),
                ))
            }
        };
        script.commands.push(command);
    }

    debug!(
        founder = script.founder.is_some(),
        commands = script.commands.len(),
        "script parsed"
    );
    Ok(script)
}
