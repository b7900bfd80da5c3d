//! Grammar definition and binding.
//!
//! Rules are declared by name and bound lazily: a rule can be referenced by
//! its [`RuleKey`] long before its body is given, which is what makes
//! mutually recursive rules expressible. Nothing is resolved until
//! [`GrammarBuilder::build`], which turns every definition into a matcher
//! and fails on the first rule that is missing a body or does not resolve.
//!
//! A built [`Grammar`] is immutable and can be shared between threads.

mod expr;
mod rule;

pub use expr::{
    adjacent, any_token, end_of_input, first_of, literal, longest_one, next, not, one_or_more,
    optional, regex, sequence, strict_or, till, token_type, zero_or_more, Expr,
};
pub use rule::{RuleDefinition, RuleState};

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

use crate::ast::{AstNode, AstNodeSkippingPolicy};
use crate::config::ParserConfig;
use crate::parser::{MatchError, Matcher, ParseError, ParsingState};
use crate::token::Token;

/// Identifies a rule of a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey(u32);

impl RuleKey {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Returns the position of the rule in its grammar.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors raised while defining or building a grammar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    /// [`RuleDefinition::is`] was called twice.
    #[error("rule '{rule}' has already been defined somewhere in the grammar")]
    AlreadyDefined {
        /// The rule.
        rule: SmolStr,
    },
    /// The rule was declared but never given a body.
    #[error("rule '{rule}' hasn't been defined")]
    NotDefined {
        /// The rule.
        rule: SmolStr,
    },
    /// The rule has already been built into a grammar.
    #[error("rule '{rule}' has already been built")]
    AlreadyBuilt {
        /// The rule.
        rule: SmolStr,
    },
    /// A rule body refers to a key no rule of this builder was declared with.
    #[error("rule '{rule}' refers to unknown rule #{index}")]
    UnknownRule {
        /// The referring rule.
        rule: SmolStr,
        /// Index of the unknown key.
        index: usize,
    },
    /// A regular expression in a rule body does not compile.
    #[error("rule '{rule}' has an invalid regular expression /{pattern}/")]
    InvalidRegex {
        /// The rule.
        rule: SmolStr,
        /// The offending pattern.
        pattern: SmolStr,
        /// Why it does not compile.
        #[source]
        source: regex::Error,
    },
}

/// A rule resolved into its matcher.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) name: SmolStr,
    pub(crate) matcher: Matcher,
    pub(crate) policy: AstNodeSkippingPolicy,
}

/// Collects rule definitions and builds them into a [`Grammar`].
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: IndexMap<SmolStr, RuleDefinition, FxBuildHasher>,
}

impl GrammarBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the key of the rule called `name`, declaring it if needed.
    pub fn key(&mut self, name: impl Into<SmolStr>) -> RuleKey {
        self.rule(name).key()
    }

    /// Returns the definition of the rule called `name`, declaring it if
    /// needed.
    pub fn rule(&mut self, name: impl Into<SmolStr>) -> &mut RuleDefinition {
        let name = name.into();
        let key = RuleKey::new(self.rules.len());
        self.rules
            .entry(name.clone())
            .or_insert_with(|| RuleDefinition::new(key, name))
    }

    /// Returns the definition of the rule bound to `key`.
    pub fn definition(&mut self, key: RuleKey) -> Option<&mut RuleDefinition> {
        self.rules
            .get_index_mut(key.index())
            .map(|(_, definition)| definition)
    }

    /// Returns the number of declared rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rule has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Builds every declared rule, with `root` as the rule
    /// [`Grammar::parse`] starts from.
    ///
    /// # Errors
    ///
    /// Returns the first rule that has no body, references an unknown key or
    /// carries an invalid regular expression.
    pub fn build(mut self, root: RuleKey) -> Result<Grammar, GrammarError> {
        let rule_count = self.rules.len();
        if root.index() >= rule_count {
            return Err(GrammarError::UnknownRule {
                rule: SmolStr::new_static("<root>"),
                index: root.index(),
            });
        }

        let mut rules = Vec::with_capacity(rule_count);
        let mut keys = FxHashMap::default();
        for (name, definition) in &mut self.rules {
            rules.push(definition.build(rule_count)?);
            keys.insert(name.clone(), definition.key());
        }

        let grammar = Grammar {
            rules: rules.into_boxed_slice(),
            keys,
            root,
        };
        debug!(rules = rule_count, root = %grammar.rule_name(root), "built grammar");
        Ok(grammar)
    }
}

/// An immutable, built grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Box<[CompiledRule]>,
    keys: FxHashMap<SmolStr, RuleKey>,
    root: RuleKey,
}

impl Grammar {
    /// Returns the rule parsing starts from.
    #[must_use]
    pub fn root(&self) -> RuleKey {
        self.root
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the grammar has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks a rule up by name.
    #[must_use]
    pub fn key(&self, name: &str) -> Option<RuleKey> {
        self.keys.get(name).copied()
    }

    /// Returns the name of the rule bound to `key`, or an empty string for a
    /// key of another grammar.
    #[must_use]
    pub fn rule_name(&self, key: RuleKey) -> &str {
        self.rules.get(key.index()).map_or("", |rule| &rule.name)
    }

    /// Returns the matcher of the rule bound to `key`.
    #[must_use]
    pub fn matcher(&self, key: RuleKey) -> Option<&Matcher> {
        self.rules.get(key.index()).map(|rule| &rule.matcher)
    }

    /// Returns the skip policy of the rule bound to `key`.
    #[must_use]
    pub fn policy(&self, key: RuleKey) -> Option<AstNodeSkippingPolicy> {
        self.rules.get(key.index()).map(|rule| rule.policy)
    }

    /// Parses `tokens` from the root rule with the default configuration.
    ///
    /// # Errors
    ///
    /// Fails unless the root rule matches the whole token stream.
    pub fn parse(&self, tokens: &[Token]) -> Result<AstNode, ParseError> {
        self.parse_with(&ParserConfig::default(), tokens)
    }

    /// Parses `tokens` from the root rule.
    ///
    /// # Errors
    ///
    /// Fails unless the root rule matches the whole token stream.
    pub fn parse_with(&self, config: &ParserConfig, tokens: &[Token]) -> Result<AstNode, ParseError> {
        self.parse_rule(self.root, config, tokens)
    }

    /// Parses `tokens` from `key`, which must match the whole stream.
    ///
    /// # Errors
    ///
    /// On a mismatch, reports the furthest position any matcher reached and
    /// what was expected there. Ambiguous strict alternations and runaway
    /// recursion are reported as such.
    pub fn parse_rule(
        &self,
        key: RuleKey,
        config: &ParserConfig,
        tokens: &[Token],
    ) -> Result<AstNode, ParseError> {
        let mut state = ParsingState::with_config(tokens, config);
        let outcome = match self.match_rule(key, &mut state) {
            Ok(node) if state.at_end() => return Ok(node),
            Ok(_) => {
                state.record_expected(Matcher::EndOfInput.to_string());
                state.failure()
            }
            Err(MatchError::Backtrack(_)) => state.failure(),
            Err(MatchError::Fatal(error)) => error,
        };
        debug!(
            rule = %self.rule_name(key),
            furthest = state.furthest_index(),
            error = %outcome,
            "parse failed"
        );
        Err(outcome)
    }

    /// Matches the rule bound to `key` at the current position of `state`,
    /// without requiring the rest of the input to be consumed.
    ///
    /// # Errors
    ///
    /// On a mismatch the state is left where it was.
    pub fn match_rule(&self, key: RuleKey, state: &mut ParsingState<'_>) -> Result<AstNode, MatchError> {
        Matcher::Rule(key).match_at(state, &self.rules)
    }
}
