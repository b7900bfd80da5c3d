//! Default lexer.
//!
//! Tokenizes source text into identifiers, numbers, strings and punctuators,
//! dropping whitespace and comments. Positions are reported the way the
//! parser expects them: 1-based lines, 0-based columns, and character (not
//! byte) ranges, so that a token's range can be resolved through a layered
//! [`strata_text::Text`].

mod tokens;

pub use tokens::LexemeKind;

use logos::Logos;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::token::{Token, TokenType};

/// Lexer over a source string.
///
/// The lexer is an iterator over tokens. Unrecognized characters are
/// returned as tokens of type [`TokenType::ERROR`].
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, LexemeKind>,
    source: &'src str,
    position: Position,
}

/// Running position of the lexer, advanced lazily up to each token start.
#[derive(Debug, Clone, Copy)]
struct Position {
    byte: usize,
    char: u32,
    line: u32,
    column: u32,
}

impl Position {
    fn advance(&mut self, source: &str, to_byte: usize) {
        let mut chars = source[self.byte..to_byte].chars().peekable();
        while let Some(ch) = chars.next() {
            self.char += 1;
            let breaks = match ch {
                '\n' => true,
                '\r' => chars.peek() != Some(&'\n'),
                _ => false,
            };
            if breaks {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.byte = to_byte;
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: LexemeKind::lexer(source),
            source,
            position: Position {
                byte: 0,
                char: 0,
                line: 1,
                column: 0,
            },
        }
    }

    /// Returns the source text being lexed.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let kind = self.inner.next()?;
            let span = self.inner.span();
            let token_type = match kind {
                Ok(kind) if kind.is_trivia() => continue,
                Ok(kind) => kind.token_type(),
                Err(()) => TokenType::new(TokenType::ERROR),
            };

            self.position.advance(self.source, span.start);
            let start = self.position;
            self.position.advance(self.source, span.end);

            let range = TextRange::new(
                TextSize::from(start.char),
                TextSize::from(self.position.char),
            );
            let value = SmolStr::new(&self.source[span]);
            return Some(Token::new(token_type, value, start.line, start.column).with_range(range));
        }
    }
}

/// Lex the entire source and return all tokens.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}
