//! The matcher combinator algebra.

use std::fmt;

use regex::Regex;
use smol_str::SmolStr;
use tracing::trace;

use crate::ast::AstNode;
use crate::grammar::{CompiledRule, RuleKey};
use crate::parser::{Backtrack, MatchError, ParseError, ParsingState};
use crate::token::{Token, TokenType};

type MatchResult = Result<AstNode, MatchError>;

/// Remaining stack below which a rule entry switches to a fresh segment.
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each additional stack segment.
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// A node of a built grammar.
///
/// Matchers are produced by resolving grammar expressions when a grammar is
/// built, and are immutable afterwards.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// All children, consecutively.
    Sequence(Vec<Matcher>),
    /// The first alternative that matches, in declaration order.
    FirstOf(Vec<Matcher>),
    /// The alternative that consumes the most tokens. Ties go to the
    /// alternative declared first.
    LongestOne(Vec<Matcher>),
    /// The only alternative that matches. More than one match is a fatal
    /// error.
    StrictOr(Vec<Matcher>),
    /// The child, or nothing.
    Optional(Box<Matcher>),
    /// The child repeated any number of times.
    ZeroOrMore(Box<Matcher>),
    /// The child repeated at least once.
    OneOrMore(Box<Matcher>),
    /// Succeeds without consuming if the child would match.
    Next(Box<Matcher>),
    /// Succeeds without consuming if the child would not match.
    Not(Box<Matcher>),
    /// The child, starting right where the previous token ended.
    Adjacent(Box<Matcher>),
    /// Every token up to and including a match of the child.
    Till(Box<Matcher>),
    /// A token with exactly this value.
    Literal(SmolStr),
    /// A token whose whole value matches the (anchored) expression.
    Regex(Regex),
    /// A token of the named type.
    TokenType(SmolStr),
    /// Any single token.
    AnyToken,
    /// The end of the token stream.
    EndOfInput,
    /// The rule bound to this key.
    Rule(RuleKey),
}

impl Matcher {
    /// Attempts to match at the current position of `state`.
    ///
    /// On failure the state's index is left where it was before the call.
    pub(crate) fn match_at(&self, state: &mut ParsingState<'_>, rules: &[CompiledRule]) -> MatchResult {
        let mark = state.mark();
        match self.match_inner(state, rules) {
            Ok(node) => {
                state.commit(mark);
                Ok(node)
            }
            Err(error) => {
                state.restore(mark);
                Err(error)
            }
        }
    }

    /// Reports the index this matcher would advance to, without committing.
    fn match_to_index(
        &self,
        state: &mut ParsingState<'_>,
        rules: &[CompiledRule],
    ) -> Result<Option<usize>, ParseError> {
        let mark = state.mark();
        let outcome = self.match_inner(state, rules);
        let reached = state.index();
        state.restore(mark);
        match outcome {
            Ok(_) => Ok(Some(reached)),
            Err(MatchError::Backtrack(_)) => Ok(None),
            Err(MatchError::Fatal(error)) => Err(error),
        }
    }

    fn is_matching(
        &self,
        state: &mut ParsingState<'_>,
        rules: &[CompiledRule],
    ) -> Result<bool, ParseError> {
        Ok(self.match_to_index(state, rules)?.is_some())
    }

    fn match_inner(&self, state: &mut ParsingState<'_>, rules: &[CompiledRule]) -> MatchResult {
        match self {
            Matcher::Sequence(children) => {
                let mut node = AstNode::group(state.index());
                for child in children {
                    node.add_child(child.match_at(state, rules)?);
                }
                node.finish(state.index());
                Ok(node)
            }
            Matcher::FirstOf(alternatives) => {
                for alternative in alternatives {
                    match alternative.match_at(state, rules) {
                        Err(MatchError::Backtrack(_)) => continue,
                        outcome => return outcome,
                    }
                }
                Err(Backtrack::Mismatch.into())
            }
            Matcher::LongestOne(alternatives) => {
                let mut longest: Option<(&Matcher, usize)> = None;
                for alternative in alternatives {
                    if let Some(reached) = alternative.match_to_index(state, rules)? {
                        if longest.is_none_or(|(_, best)| reached > best) {
                            longest = Some((alternative, reached));
                        }
                    }
                }
                match longest {
                    Some((winner, _)) => winner.match_at(state, rules),
                    None => Err(Backtrack::Mismatch.into()),
                }
            }
            Matcher::StrictOr(alternatives) => {
                let mut matching = None;
                for alternative in alternatives {
                    if alternative.is_matching(state, rules)? {
                        if matching.is_some() {
                            return Err(ParseError::AmbiguousAlternatives {
                                index: state.index(),
                                matcher: self.to_string(),
                            }
                            .into());
                        }
                        matching = Some(alternative);
                    }
                }
                match matching {
                    Some(alternative) => alternative.match_at(state, rules),
                    None => Err(Backtrack::Mismatch.into()),
                }
            }
            Matcher::Optional(child) => match child.match_at(state, rules) {
                Err(MatchError::Backtrack(_)) => Ok(AstNode::group(state.index())),
                outcome => outcome,
            },
            Matcher::ZeroOrMore(child) => repeat(child, AstNode::group(state.index()), state, rules),
            Matcher::OneOrMore(child) => {
                let mut node = AstNode::group(state.index());
                node.add_child(child.match_at(state, rules)?);
                repeat(child, node, state, rules)
            }
            Matcher::Next(child) => {
                if child.is_matching(state, rules)? {
                    Ok(AstNode::group(state.index()))
                } else {
                    Err(Backtrack::Mismatch.into())
                }
            }
            Matcher::Not(child) => {
                if child.is_matching(state, rules)? {
                    state.record_expected(format!("not {child}"));
                    Err(Backtrack::Mismatch.into())
                } else {
                    Ok(AstNode::group(state.index()))
                }
            }
            Matcher::Adjacent(child) => match_adjacent(child, state, rules),
            Matcher::Till(terminator) => match_till(terminator, state, rules),
            Matcher::Literal(value) => match_leaf(self, state, |token| token.value == *value),
            Matcher::Regex(regex) => match_leaf(self, state, |token| regex.is_match(&token.value)),
            Matcher::TokenType(name) => {
                match_leaf(self, state, |token| token.token_type.name() == name.as_str())
            }
            Matcher::AnyToken => match_leaf(self, state, |_| true),
            Matcher::EndOfInput => {
                if state.at_end() {
                    Ok(AstNode::group(state.index()))
                } else {
                    state.record_expected(self.to_string());
                    Err(Backtrack::Mismatch.into())
                }
            }
            Matcher::Rule(key) => match_rule(*key, state, rules),
        }
    }
}

/// Keeps matching `child` into `node` until it stops matching or stops
/// consuming input.
fn repeat(
    child: &Matcher,
    mut node: AstNode,
    state: &mut ParsingState<'_>,
    rules: &[CompiledRule],
) -> MatchResult {
    loop {
        let before = state.index();
        match child.match_at(state, rules) {
            Ok(matched) => {
                node.add_child(matched);
                if state.index() == before {
                    break;
                }
            }
            Err(MatchError::Backtrack(_)) => break,
            Err(fatal) => return Err(fatal),
        }
    }
    node.finish(state.index());
    Ok(node)
}

fn match_leaf(
    matcher: &Matcher,
    state: &mut ParsingState<'_>,
    accepts: impl Fn(&Token) -> bool,
) -> MatchResult {
    let index = state.index();
    match state.peek(0) {
        Ok(token) if accepts(token) => {
            state.pop()?;
            Ok(AstNode::leaf(token.clone(), index))
        }
        Ok(_) => {
            state.record_expected(matcher.to_string());
            Err(Backtrack::Mismatch.into())
        }
        Err(end) => {
            state.record_expected(matcher.to_string());
            Err(end.into())
        }
    }
}

fn match_adjacent(
    child: &Matcher,
    state: &mut ParsingState<'_>,
    rules: &[CompiledRule],
) -> MatchResult {
    let touching = match (state.previous(), state.peek(0)) {
        (Some(previous), Ok(next)) => {
            next.line == previous.line && next.column <= previous.end_column()
        }
        (None, Ok(_)) => false,
        (_, Err(end)) => {
            state.record_expected(format!("adjacent({child})"));
            return Err(end.into());
        }
    };
    if !touching {
        state.record_expected(format!("adjacent({child})"));
        return Err(Backtrack::Mismatch.into());
    }

    let mut node = AstNode::new("adjacent", state.index());
    node.add_child(child.match_at(state, rules)?);
    node.finish(state.index());
    Ok(node)
}

fn match_till(
    terminator: &Matcher,
    state: &mut ParsingState<'_>,
    rules: &[CompiledRule],
) -> MatchResult {
    let from = state.index();
    let mut words = String::new();
    while !terminator.is_matching(state, rules)? {
        let token = state.pop()?;
        words.push_str(&token.value);
        words.push(' ');
    }
    let words_end = state.index();

    let mut words_token = Token::new(TokenType::words(), words, 0, 0);
    if let (Some(first), Some(last)) = (state.read(from), state.previous()) {
        if words_end > from {
            words_token.line = first.line;
            words_token.column = first.column;
            words_token.range = first.range.cover(last.range);
        }
    }
    let mut words_node = AstNode::leaf(words_token, from);
    words_node.set_token_range(from..words_end);

    let mut node = AstNode::new("till", from);
    node.add_child(words_node);
    node.add_child(terminator.match_at(state, rules)?);
    node.finish(state.index());
    Ok(node)
}

fn match_rule(key: RuleKey, state: &mut ParsingState<'_>, rules: &[CompiledRule]) -> MatchResult {
    let rule = rules
        .get(key.index())
        .ok_or(ParseError::ForeignRule(key.index()))?;
    let from = state.index();

    state.enter_rule(&rule.name)?;
    if state.trace_rules() {
        trace!(rule = %rule.name, index = from, "enter rule");
    }
    let outcome = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
        rule.matcher.match_at(state, rules)
    });
    state.exit_rule();
    if state.trace_rules() {
        trace!(rule = %rule.name, matched = outcome.is_ok(), index = state.index(), "exit rule");
    }

    let mut node = AstNode::new(rule.name.clone(), from);
    node.add_child(outcome?);
    node.finish(state.index());
    node.apply_policy(rule.policy);
    Ok(node)
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Matcher], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    for (position, item) in items.iter().enumerate() {
        if position > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Sequence(children) => write_list(f, children, " "),
            Matcher::FirstOf(alternatives) => write_list(f, alternatives, " | "),
            Matcher::LongestOne(alternatives) => {
                f.write_str("longestOne")?;
                write_list(f, alternatives, ", ")
            }
            Matcher::StrictOr(alternatives) => {
                f.write_str("strictOr")?;
                write_list(f, alternatives, " | ")
            }
            Matcher::Optional(child) => write!(f, "{child}?"),
            Matcher::ZeroOrMore(child) => write!(f, "{child}*"),
            Matcher::OneOrMore(child) => write!(f, "{child}+"),
            Matcher::Next(child) => write!(f, "&{child}"),
            Matcher::Not(child) => write!(f, "!{child}"),
            Matcher::Adjacent(child) => write!(f, "adjacent({child})"),
            Matcher::Till(child) => write!(f, "till({child})"),
            Matcher::Literal(value) => write!(f, "{value:?}"),
            Matcher::Regex(regex) => write!(f, "/{}/", strip_anchors(regex.as_str())),
            Matcher::TokenType(name) => f.write_str(name),
            Matcher::AnyToken => f.write_str("any token"),
            Matcher::EndOfInput => f.write_str("end of input"),
            Matcher::Rule(key) => write!(f, "<rule #{}>", key.index()),
        }
    }
}

/// Regexes are compiled as `^(?:...)$`; show the pattern as written.
fn strip_anchors(pattern: &str) -> &str {
    pattern
        .strip_prefix("^(?:")
        .and_then(|rest| rest.strip_suffix(")$"))
        .unwrap_or(pattern)
}
