//! Parsing state: a backtrackable cursor over a token stream.
//!
//! The token stream is never mutated; backtracking only resets the index.

use drop_bomb::DropBomb;
use smol_str::SmolStr;

use crate::config::ParserConfig;
use crate::parser::{Backtrack, ParseError};
use crate::token::Token;

/// A cursor over a fixed token sequence.
pub struct ParsingState<'t> {
    tokens: &'t [Token],
    index: usize,
    furthest: Furthest,
    depth: usize,
    max_depth: usize,
    trace_rules: bool,
}

/// The deepest position at which a leaf failed, and what it expected there.
#[derive(Debug, Default)]
struct Furthest {
    index: usize,
    expected: Vec<SmolStr>,
}

/// A snapshot of the index taken by [`ParsingState::mark`].
///
/// Every mark must be handed back through [`ParsingState::restore`] or
/// [`ParsingState::commit`].
pub struct Mark {
    index: usize,
    bomb: DropBomb,
}

impl<'t> ParsingState<'t> {
    /// Creates a state at the start of `tokens` with default limits.
    #[must_use]
    pub fn new(tokens: &'t [Token]) -> Self {
        Self::with_config(tokens, &ParserConfig::default())
    }

    /// Creates a state at the start of `tokens`.
    #[must_use]
    pub fn with_config(tokens: &'t [Token], config: &ParserConfig) -> Self {
        Self {
            tokens,
            index: 0,
            furthest: Furthest::default(),
            depth: 0,
            max_depth: config.max_depth,
            trace_rules: config.trace_rules,
        }
    }

    /// Returns the index of the next token to be consumed.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of tokens in the stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the stream has no tokens at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns `true` if every token has been consumed.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    /// Returns the token `offset` positions after the current one without
    /// consuming anything.
    pub fn peek(&self, offset: usize) -> Result<&'t Token, Backtrack> {
        self.tokens
            .get(self.index + offset)
            .ok_or(Backtrack::EndOfInput)
    }

    /// Consumes and returns the current token.
    pub fn pop(&mut self) -> Result<&'t Token, Backtrack> {
        let token = self.peek(0)?;
        self.index += 1;
        Ok(token)
    }

    /// Returns the token at an absolute index.
    #[must_use]
    pub fn read(&self, index: usize) -> Option<&'t Token> {
        self.tokens.get(index)
    }

    /// Returns the most recently consumed token.
    #[must_use]
    pub fn previous(&self) -> Option<&'t Token> {
        self.index.checked_sub(1).and_then(|index| self.read(index))
    }

    /// Snapshots the current index.
    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark {
            index: self.index,
            bomb: DropBomb::new("parsing state mark was neither restored nor committed"),
        }
    }

    /// Rolls the index back to `mark`.
    pub fn restore(&mut self, mut mark: Mark) {
        mark.bomb.defuse();
        self.index = mark.index;
    }

    /// Keeps everything consumed since `mark`.
    pub fn commit(&mut self, mut mark: Mark) {
        mark.bomb.defuse();
        debug_assert!(mark.index <= self.index, "index moved backwards past a mark");
    }

    /// Records that `expected` did not match at the current index.
    pub(crate) fn record_expected(&mut self, expected: impl Into<SmolStr>) {
        if self.index < self.furthest.index {
            return;
        }
        if self.index > self.furthest.index {
            self.furthest.index = self.index;
            self.furthest.expected.clear();
        }
        let expected = expected.into();
        if !self.furthest.expected.contains(&expected) {
            self.furthest.expected.push(expected);
        }
    }

    /// Returns the furthest index at which a match attempt failed.
    #[must_use]
    pub fn furthest_index(&self) -> usize {
        self.furthest.index
    }

    /// Returns what was expected at [`furthest_index`](Self::furthest_index).
    #[must_use]
    pub fn expected(&self) -> &[SmolStr] {
        &self.furthest.expected
    }

    pub(crate) fn trace_rules(&self) -> bool {
        self.trace_rules
    }

    pub(crate) fn enter_rule(&mut self, rule: &SmolStr) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::RecursionLimit {
                rule: rule.clone(),
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn exit_rule(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Builds the diagnostic for a failed parse, anchored at the furthest
    /// position reached.
    #[must_use]
    pub fn failure(&self) -> ParseError {
        let index = self.furthest.index;
        let expected = self.furthest.expected.clone();
        match self.read(index) {
            Some(token) => ParseError::UnexpectedToken {
                index,
                found: token.value.clone(),
                line: token.line,
                column: token.column,
                offset: u32::from(token.range.start()),
                expected,
            },
            None => ParseError::UnexpectedEnd { index, expected },
        }
    }
}
