//! `strata-syntax` - Backtracking matcher combinators and lazily bound grammars.
//!
//! This crate turns a token stream into an abstract syntax tree:
//!
//! - **Grammar**: rules are declared by name, referenced by key and given a
//!   body later, so recursive grammars are written top-down
//! - **Matchers**: a closed algebra of combinators (sequence, alternation,
//!   longest match, repetition, lookahead, adjacency, till) over token leaves
//! - **AST**: nodes named after the rules that produced them, with per-rule
//!   policies for collapsing uninteresting nodes
//!
//! # Design Principles
//!
//! - **Token-level**: matchers consume tokens, never characters; any lexer
//!   producing [`Token`]s can be plugged in. A default [`lexer`] is provided
//! - **Pure backtracking**: a failed match leaves the parsing state exactly
//!   where it was, so alternatives compose without hidden side effects
//! - **Immutable grammars**: a built [`Grammar`] is shared freely between
//!   threads; each parse owns its own [`ParsingState`]
//!
//! # Example
//!
//! ```
//! use strata_syntax::grammar::{one_or_more, token_type, GrammarBuilder};
//! use strata_syntax::{lex, TokenType};
//!
//! let mut builder = GrammarBuilder::new();
//! let call = builder.key("call");
//! let args = builder.key("args");
//! builder
//!     .rule("call")
//!     .is((token_type(TokenType::IDENTIFIER), "(", args, ")"))
//!     .unwrap();
//! builder
//!     .rule("args")
//!     .is(one_or_more(token_type(TokenType::NUMBER)))
//!     .unwrap();
//! let grammar = builder.build(call).unwrap();
//!
//! let root = grammar.parse(&lex("print(1 2 3)")).unwrap();
//! assert_eq!(root.name(), "call");
//! assert_eq!(root.find_first_child("args").unwrap().children().len(), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod ast;
pub mod config;
pub mod grammar;
pub mod lexer;
pub mod parser;
mod token;

pub use ast::{AstNode, AstNodeSkippingPolicy};
pub use config::{ConfigError, ParserConfig};
pub use grammar::{Expr, Grammar, GrammarBuilder, GrammarError, RuleKey};
pub use lexer::{lex, Lexer};
pub use parser::{parse_text, Matcher, ParseError, ParsedText, ParsingState};
pub use token::{Token, TokenType};
