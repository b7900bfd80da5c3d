//! Backtracking parser.
//!
//! # Design
//!
//! A built [`Grammar`](crate::grammar::Grammar) is a table of rules, each a
//! tree of [`Matcher`]s. Parsing walks that tree against a
//! [`ParsingState`] by plain recursion:
//!
//! - **Backtracking is positional**: every matcher attempt is bracketed by a
//!   mark of the token index, restored when the attempt fails
//! - **Failure is a value**: matchers return `Err(MatchError::Backtrack(_))`
//!   and the nearest alternation decides what to try next
//! - **Fatal errors short-circuit**: ambiguities and runaway recursion are
//!   reported as `MatchError::Fatal` and never backtracked over
//!
//! A failed parse produces one diagnostic, anchored at the furthest token any
//! leaf matcher reached.

mod matcher;
mod state;

pub use matcher::Matcher;
pub use state::{Mark, ParsingState};

use smol_str::SmolStr;
use strata_text::{Text, TextLocation};
use thiserror::Error;

use crate::ast::AstNode;
use crate::grammar::Grammar;
use crate::lexer::lex;
use crate::token::Token;

/// Why a matcher did not match. Always recoverable by an enclosing
/// combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Backtrack {
    /// The token at the current position is not what the matcher wants.
    #[error("mismatch")]
    Mismatch,
    /// The matcher tried to read past the last token.
    #[error("unexpected end of input")]
    EndOfInput,
}

/// Outcome of a failed matcher attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Recoverable: try another alternative.
    #[error(transparent)]
    Backtrack(#[from] Backtrack),
    /// Unrecoverable: abort the parse.
    #[error(transparent)]
    Fatal(#[from] ParseError),
}

/// A parsing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The furthest failure happened on a token.
    #[error("expected {}, got {found:?} at {line}:{}", one_of(.expected), .column + 1)]
    UnexpectedToken {
        /// Index of the offending token.
        index: usize,
        /// Value of the offending token.
        found: SmolStr,
        /// Line of the offending token.
        line: u32,
        /// Column of the offending token, 0-based like [`Token::column`].
        /// Messages print it 1-based, matching [`TextLocation`].
        column: u32,
        /// Character offset of the offending token in the lexed text.
        offset: u32,
        /// Everything that would have been accepted there.
        expected: Vec<SmolStr>,
    },
    /// The furthest failure happened after the last token.
    #[error("unexpected end of input, expected {}", one_of(.expected))]
    UnexpectedEnd {
        /// Number of tokens in the stream.
        index: usize,
        /// Everything that would have been accepted there.
        expected: Vec<SmolStr>,
    },
    /// More than one alternative of a strict alternation matched.
    #[error("more than one alternative of {matcher} matches at token {index}")]
    AmbiguousAlternatives {
        /// Index at which the alternation was tried.
        index: usize,
        /// The alternation, rendered.
        matcher: String,
    },
    /// Rule nesting exceeded the configured limit.
    #[error("rule '{rule}' exceeded the maximum nesting depth of {limit}")]
    RecursionLimit {
        /// The rule being entered.
        rule: SmolStr,
        /// The configured limit.
        limit: usize,
    },
    /// A rule key that does not belong to the grammar.
    #[error("rule #{0} does not belong to this grammar")]
    ForeignRule(usize),
}

impl ParseError {
    /// Returns the token index the error is anchored at, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { index, .. }
            | ParseError::UnexpectedEnd { index, .. }
            | ParseError::AmbiguousAlternatives { index, .. } => Some(*index),
            ParseError::RecursionLimit { .. } | ParseError::ForeignRule(_) => None,
        }
    }
}

fn one_of(expected: &[SmolStr]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [single] => single.to_string(),
        many => format!("one of {}", many.join(", ")),
    }
}

/// A parse of layered text, able to resolve token positions through every
/// layer the text was built from.
#[derive(Debug)]
pub struct ParsedText {
    root: AstNode,
    text: Text,
}

impl ParsedText {
    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &AstNode {
        &self.root
    }

    /// Returns the parsed text.
    #[must_use]
    pub fn text(&self) -> &Text {
        &self.text
    }

    /// Resolves where `token` came from.
    #[must_use]
    pub fn location(&self, token: &Token) -> Option<TextLocation> {
        self.text.location(usize::from(token.range.start()))
    }

    /// Resolves where the first token of `node` came from.
    #[must_use]
    pub fn node_location(&self, node: &AstNode) -> Option<TextLocation> {
        self.location(node.first_token()?)
    }

    /// Consumes the parse, returning the root node.
    #[must_use]
    pub fn into_root(self) -> AstNode {
        self.root
    }
}

/// Lexes `text` with the default lexer and parses it with `grammar`.
///
/// On failure, the character offset carried by
/// [`ParseError::UnexpectedToken`] can be resolved with
/// [`Text::location`].
pub fn parse_text(grammar: &Grammar, text: &Text) -> Result<ParsedText, ParseError> {
    let source = text.to_string();
    let tokens = lex(&source);
    let root = grammar.parse(&tokens)?;
    Ok(ParsedText {
        root,
        text: text.clone(),
    })
}
