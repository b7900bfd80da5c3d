//! Lexeme definitions for the default lexer.
//!
//! The default lexer only knows the shapes shared by most C-like languages.
//! Grammars for anything more specific bring their own lexer and feed the
//! resulting tokens to the parser directly.

use logos::Logos;

use crate::token::TokenType;

fn lex_block_comment(lex: &mut logos::Lexer<LexemeKind>) -> bool {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}

/// Lexeme kinds recognized by the default lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexemeKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    /// Spaces, tabs and line breaks.
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// `// ...`
    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    LineComment,

    /// `/* ... */`, not nested.
    #[token("/*", lex_block_comment)]
    BlockComment,

    // =========================================================================
    // SIGNIFICANT
    // =========================================================================
    /// Identifiers and keywords.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    /// Integer and decimal literals.
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    /// Single- or double-quoted strings with backslash escapes.
    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    #[regex(r"'([^'\\\r\n]|\\.)*'")]
    String,

    /// Operators and punctuation.
    #[regex(r"==|!=|<=|>=|&&|\|\||->|::|\+\+|--|<<|>>")]
    #[regex(r"[-+*/%=<>!&|^~?:;,.(){}\[\]#@$]")]
    Punctuator,
}

impl LexemeKind {
    /// Returns `true` for lexemes that never become tokens.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            LexemeKind::Whitespace | LexemeKind::LineComment | LexemeKind::BlockComment
        )
    }

    /// Returns the token type emitted for this lexeme.
    #[must_use]
    pub fn token_type(self) -> TokenType {
        TokenType::new(match self {
            LexemeKind::Identifier => TokenType::IDENTIFIER,
            LexemeKind::Number => TokenType::NUMBER,
            LexemeKind::String => TokenType::STRING,
            LexemeKind::Punctuator => TokenType::PUNCTUATOR,
            LexemeKind::Whitespace | LexemeKind::LineComment | LexemeKind::BlockComment => {
                TokenType::ERROR
            }
        })
    }
}
