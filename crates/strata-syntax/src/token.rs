//! Tokens consumed by the parser.

use std::fmt;

use smol_str::SmolStr;
use text_size::TextRange;

/// Type tag of a [`Token`].
///
/// Token types are plain names so that any lexer can produce them; matchers
/// compare them by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenType(SmolStr);

impl TokenType {
    /// Name of the type synthesized by till-matchers for skipped tokens.
    pub const WORDS: &'static str = "WORDS";
    /// Identifiers produced by the default lexer.
    pub const IDENTIFIER: &'static str = "IDENTIFIER";
    /// Numeric literals produced by the default lexer.
    pub const NUMBER: &'static str = "NUMBER";
    /// Quoted string literals produced by the default lexer.
    pub const STRING: &'static str = "STRING";
    /// Operators and punctuation produced by the default lexer.
    pub const PUNCTUATOR: &'static str = "PUNCTUATOR";
    /// Characters the default lexer could not recognize.
    pub const ERROR: &'static str = "ERROR";

    /// Creates a token type with the given name.
    #[must_use]
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    /// Returns the type of the accumulated-words token built by till-matchers.
    #[must_use]
    pub fn words() -> Self {
        Self::new(Self::WORDS)
    }

    /// Returns the name of this type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A token produced by a lexer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// The text of the token.
    pub value: SmolStr,
    /// The type tag of the token.
    pub token_type: TokenType,
    /// 1-based line of the first character.
    pub line: u32,
    /// 0-based column of the first character, in characters.
    pub column: u32,
    /// Character range in the lexed text. Empty for synthesized tokens.
    pub range: TextRange,
}

impl Token {
    /// Creates a token at `line`/`column` with an empty range.
    #[must_use]
    pub fn new(token_type: TokenType, value: impl Into<SmolStr>, line: u32, column: u32) -> Self {
        Self {
            value: value.into(),
            token_type,
            line,
            column,
            range: TextRange::default(),
        }
    }

    /// Sets the character range of the token in the lexed text.
    #[must_use]
    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = range;
        self
    }

    /// Returns the length of the value in characters.
    #[must_use]
    pub fn len(&self) -> u32 {
        u32::try_from(self.value.chars().count()).unwrap_or(u32::MAX)
    }

    /// Returns `true` if the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Returns the column just past the last character of the token.
    #[must_use]
    pub fn end_column(&self) -> u32 {
        self.column.saturating_add(self.len())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} @{}:{}",
            self.token_type, self.value, self.line, self.column
        )
    }
}
