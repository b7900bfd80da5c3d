//! Grammar expressions.
//!
//! An [`Expr`] is what a grammar author writes: an unresolved description of
//! a matcher that may name rules which are not defined yet. Expressions are
//! resolved into [`Matcher`]s when the grammar is built.
//!
//! String literals, rule keys and tuples convert into expressions, so rule
//! bodies read close to the grammar they describe:
//!
//! ```
//! use strata_syntax::grammar::{first_of, zero_or_more, GrammarBuilder};
//!
//! let mut builder = GrammarBuilder::new();
//! let list = builder.key("list");
//! let item = builder.key("item");
//! builder.rule("list").is(("[", item, zero_or_more((",", item)), "]")).unwrap();
//! builder.rule("item").is(first_of(["x", "y"])).unwrap();
//! let grammar = builder.build(list).unwrap();
//! # let _ = grammar;
//! ```

use regex::Regex;
use smol_str::SmolStr;

use crate::grammar::{GrammarError, RuleKey};
use crate::parser::Matcher;

/// An unresolved grammar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// All elements, consecutively.
    Sequence(Vec<Expr>),
    /// Ordered alternation.
    FirstOf(Vec<Expr>),
    /// Longest-match alternation.
    LongestOne(Vec<Expr>),
    /// Alternation in which at most one alternative may match.
    StrictOr(Vec<Expr>),
    /// Zero or one.
    Optional(Box<Expr>),
    /// Zero or more.
    ZeroOrMore(Box<Expr>),
    /// One or more.
    OneOrMore(Box<Expr>),
    /// Positive lookahead.
    Next(Box<Expr>),
    /// Negative lookahead.
    Not(Box<Expr>),
    /// Adjacent to the previous token.
    Adjacent(Box<Expr>),
    /// Everything up to and including the terminator.
    Till(Box<Expr>),
    /// Token value.
    Literal(SmolStr),
    /// Regular expression over the whole token value.
    Regex(SmolStr),
    /// Token type name.
    TokenType(SmolStr),
    /// Any token.
    AnyToken,
    /// End of the token stream.
    EndOfInput,
    /// Reference to a rule.
    Rule(RuleKey),
}

impl Expr {
    /// Resolves the expression into a matcher.
    ///
    /// `rule_count` is the number of rules declared in the grammar; `rule`
    /// names the rule being built, for error messages.
    pub(crate) fn resolve(&self, rule: &SmolStr, rule_count: usize) -> Result<Matcher, GrammarError> {
        let list = |items: &[Expr]| -> Result<Vec<Matcher>, GrammarError> {
            items
                .iter()
                .map(|item| item.resolve(rule, rule_count))
                .collect()
        };
        let boxed = |item: &Expr| item.resolve(rule, rule_count).map(Box::new);

        Ok(match self {
            Expr::Sequence(items) if items.len() == 1 => items[0].resolve(rule, rule_count)?,
            Expr::Sequence(items) => Matcher::Sequence(list(items)?),
            Expr::FirstOf(items) if items.len() == 1 => items[0].resolve(rule, rule_count)?,
            Expr::FirstOf(items) => Matcher::FirstOf(list(items)?),
            Expr::LongestOne(items) => Matcher::LongestOne(list(items)?),
            Expr::StrictOr(items) => Matcher::StrictOr(list(items)?),
            Expr::Optional(item) => Matcher::Optional(boxed(item)?),
            Expr::ZeroOrMore(item) => Matcher::ZeroOrMore(boxed(item)?),
            Expr::OneOrMore(item) => Matcher::OneOrMore(boxed(item)?),
            Expr::Next(item) => Matcher::Next(boxed(item)?),
            Expr::Not(item) => Matcher::Not(boxed(item)?),
            Expr::Adjacent(item) => Matcher::Adjacent(boxed(item)?),
            Expr::Till(item) => Matcher::Till(boxed(item)?),
            Expr::Literal(value) => Matcher::Literal(value.clone()),
            Expr::Regex(pattern) => {
                let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    GrammarError::InvalidRegex {
                        rule: rule.clone(),
                        pattern: pattern.clone(),
                        source,
                    }
                })?;
                Matcher::Regex(regex)
            }
            Expr::TokenType(name) => Matcher::TokenType(name.clone()),
            Expr::AnyToken => Matcher::AnyToken,
            Expr::EndOfInput => Matcher::EndOfInput,
            Expr::Rule(key) => {
                if key.index() >= rule_count {
                    return Err(GrammarError::UnknownRule {
                        rule: rule.clone(),
                        index: key.index(),
                    });
                }
                Matcher::Rule(*key)
            }
        })
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(value.into())
    }
}

impl From<SmolStr> for Expr {
    fn from(value: SmolStr) -> Self {
        Expr::Literal(value)
    }
}

impl From<RuleKey> for Expr {
    fn from(key: RuleKey) -> Self {
        Expr::Rule(key)
    }
}

macro_rules! impl_sequence_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Expr>),+> From<($($name,)+)> for Expr {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Expr::Sequence(vec![$($name.into()),+])
            }
        }
    };
}

impl_sequence_tuple!(A, B);
impl_sequence_tuple!(A, B, C);
impl_sequence_tuple!(A, B, C, D);
impl_sequence_tuple!(A, B, C, D, E);
impl_sequence_tuple!(A, B, C, D, E, F);
impl_sequence_tuple!(A, B, C, D, E, F, G);
impl_sequence_tuple!(A, B, C, D, E, F, G, H);

fn collect<I>(items: I) -> Vec<Expr>
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    items.into_iter().map(Into::into).collect()
}

/// All of `items`, consecutively.
pub fn sequence<I>(items: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::Sequence(collect(items))
}

/// The first of `alternatives` that matches.
pub fn first_of<I>(alternatives: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::FirstOf(collect(alternatives))
}

/// The one of `alternatives` that consumes the most tokens.
pub fn longest_one<I>(alternatives: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::LongestOne(collect(alternatives))
}

/// The only one of `alternatives` that matches.
pub fn strict_or<I>(alternatives: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::StrictOr(collect(alternatives))
}

/// `item`, or nothing.
pub fn optional(item: impl Into<Expr>) -> Expr {
    Expr::Optional(Box::new(item.into()))
}

/// `item` any number of times.
pub fn zero_or_more(item: impl Into<Expr>) -> Expr {
    Expr::ZeroOrMore(Box::new(item.into()))
}

/// `item` at least once.
pub fn one_or_more(item: impl Into<Expr>) -> Expr {
    Expr::OneOrMore(Box::new(item.into()))
}

/// Succeeds without consuming if `item` matches.
pub fn next(item: impl Into<Expr>) -> Expr {
    Expr::Next(Box::new(item.into()))
}

/// Succeeds without consuming if `item` does not match.
pub fn not(item: impl Into<Expr>) -> Expr {
    Expr::Not(Box::new(item.into()))
}

/// `item`, starting exactly where the previous token ended.
pub fn adjacent(item: impl Into<Expr>) -> Expr {
    Expr::Adjacent(Box::new(item.into()))
}

/// Every token up to and including a match of `terminator`.
pub fn till(terminator: impl Into<Expr>) -> Expr {
    Expr::Till(Box::new(terminator.into()))
}

/// A token with exactly this value.
pub fn literal(value: impl Into<SmolStr>) -> Expr {
    Expr::Literal(value.into())
}

/// A token whose whole value matches `pattern`.
pub fn regex(pattern: impl Into<SmolStr>) -> Expr {
    Expr::Regex(pattern.into())
}

/// A token of the named type.
pub fn token_type(name: impl Into<SmolStr>) -> Expr {
    Expr::TokenType(name.into())
}

/// Any single token.
#[must_use]
pub fn any_token() -> Expr {
    Expr::AnyToken
}

/// The end of the token stream.
#[must_use]
pub fn end_of_input() -> Expr {
    Expr::EndOfInput
}
