//! Lazily bound rule definitions.

use std::fmt;

use smol_str::SmolStr;

use crate::ast::AstNodeSkippingPolicy;
use crate::grammar::expr::{literal, Expr};
use crate::grammar::{CompiledRule, GrammarError, RuleKey};

type Override = Box<dyn FnOnce(Expr) -> Expr>;

/// Lifecycle of a rule definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    /// Declared, body not given yet.
    Unbound,
    /// Body given with [`RuleDefinition::is`].
    Defined,
    /// Resolved into a matcher.
    Built,
}

/// The deferred definition of one grammar rule.
pub struct RuleDefinition {
    key: RuleKey,
    name: SmolStr,
    state: RuleState,
    body: Option<Expr>,
    overrides: Vec<Override>,
    policy: AstNodeSkippingPolicy,
}

impl RuleDefinition {
    pub(crate) fn new(key: RuleKey, name: SmolStr) -> Self {
        Self {
            key,
            name,
            state: RuleState::Unbound,
            body: None,
            overrides: Vec::new(),
            policy: AstNodeSkippingPolicy::Never,
        }
    }

    /// Returns the key of this rule.
    #[must_use]
    pub fn key(&self) -> RuleKey {
        self.key
    }

    /// Returns the name of this rule.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where this rule is in its lifecycle.
    #[must_use]
    pub fn state(&self) -> RuleState {
        self.state
    }

    /// Returns the skip policy the rule's nodes will be built with.
    #[must_use]
    pub fn policy(&self) -> AstNodeSkippingPolicy {
        self.policy
    }

    /// Returns the number of registered overrides.
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Gives the rule its body.
    ///
    /// A rule can only be defined once.
    pub fn is(&mut self, body: impl Into<Expr>) -> Result<&mut Self, GrammarError> {
        if self.state != RuleState::Unbound {
            return Err(GrammarError::AlreadyDefined {
                rule: self.name.clone(),
            });
        }
        self.body = Some(body.into());
        self.state = RuleState::Defined;
        Ok(self)
    }

    /// Registers an override, applied to the rule's body when the grammar is
    /// built.
    ///
    /// Overrides receive the body as built so far (the base definition, then
    /// the result of every earlier override) and return the expression to
    /// use instead, usually one that wraps what they were given.
    pub fn override_with(&mut self, wrap: impl FnOnce(Expr) -> Expr + 'static) -> &mut Self {
        self.overrides.push(Box::new(wrap));
        self
    }

    /// Always replaces the rule's nodes by their children.
    pub fn skip(&mut self) -> &mut Self {
        self.skip_if(AstNodeSkippingPolicy::Always)
    }

    /// Replaces the rule's nodes by their only child when they have one.
    pub fn skip_if_one_child(&mut self) -> &mut Self {
        self.skip_if(AstNodeSkippingPolicy::IfOnlyOneChild)
    }

    /// Sets the skip policy.
    pub fn skip_if(&mut self, policy: AstNodeSkippingPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Defines the rule as a single token spelled like the rule's name.
    ///
    /// Lets parts of a grammar be tested before the rules they depend on are
    /// written. Replaces any existing body, but not once the rule is built.
    pub fn mock(&mut self) -> Result<&mut Self, GrammarError> {
        if self.state == RuleState::Built {
            return Err(GrammarError::AlreadyBuilt {
                rule: self.name.clone(),
            });
        }
        self.body = Some(literal(self.name.clone()));
        self.state = RuleState::Defined;
        Ok(self)
    }

    /// Resolves the base body, then every override in registration order.
    pub(crate) fn build(&mut self, rule_count: usize) -> Result<CompiledRule, GrammarError> {
        let mut body = match self.state {
            RuleState::Unbound => {
                return Err(GrammarError::NotDefined {
                    rule: self.name.clone(),
                })
            }
            RuleState::Built => {
                return Err(GrammarError::AlreadyBuilt {
                    rule: self.name.clone(),
                })
            }
            RuleState::Defined => self.body.clone().ok_or_else(|| GrammarError::NotDefined {
                rule: self.name.clone(),
            })?,
        };
        for wrap in self.overrides.drain(..) {
            body = wrap(body);
        }

        let matcher = body.resolve(&self.name, rule_count)?;
        self.state = RuleState::Built;
        Ok(CompiledRule {
            name: self.name.clone(),
            matcher,
            policy: self.policy,
        })
    }
}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("body", &self.body)
            .field("overrides", &self.overrides.len())
            .field("policy", &self.policy)
            .finish()
    }
}
