//! Shared helpers for grammar tests.
#![allow(dead_code, unused_imports)]

use std::sync::Once;

pub use strata_syntax::grammar::*;
pub use strata_syntax::{lex, AstNode, Grammar, ParseError, ParserConfig, Token, TokenType};

static TRACING: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Lexes `source` with the default lexer and parses it from the root rule.
pub fn parse(grammar: &Grammar, source: &str) -> Result<AstNode, ParseError> {
    init_tracing();
    grammar.parse(&lex(source))
}

/// Helper to format a tree for snapshot testing.
pub fn dump(node: &AstNode) -> String {
    node.to_string().trim_end().to_string()
}

/// A token of type `ID` at an explicit position.
pub fn token(value: &str, line: u32, column: u32) -> Token {
    Token::new(TokenType::new("ID"), value, line, column)
}

/// Arithmetic expressions over numbers, collapsing single-operand levels.
pub fn arithmetic() -> Grammar {
    let mut builder = GrammarBuilder::new();
    let expr = builder.key("expr");
    let term = builder.key("term");
    let factor = builder.key("factor");

    builder
        .rule("expr")
        .is((term, zero_or_more((first_of(["+", "-"]), term))))
        .unwrap()
        .skip_if_one_child();
    builder
        .rule("term")
        .is((factor, zero_or_more((first_of(["*", "/"]), factor))))
        .unwrap()
        .skip_if_one_child();
    builder
        .rule("factor")
        .is(first_of([token_type(TokenType::NUMBER), ("(", expr, ")").into()]))
        .unwrap()
        .skip();

    builder.build(expr).unwrap()
}
