//! Abstract syntax tree produced by a successful parse.
//!
//! Nodes are built bottom-up: a matcher creates its node only after all of
//! its children have matched. Nodes produced by plain combinators (sequence,
//! alternation, repetition) are *group* nodes: they exist only to carry
//! children upward and are spliced into whichever node they are added to.
//! Rule nodes are kept or spliced according to the rule's
//! [`AstNodeSkippingPolicy`].

use std::fmt;
use std::ops::Range;

use smol_str::SmolStr;
use text_size::TextRange;

use crate::token::Token;

/// Decides whether a rule's node survives in its parent's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AstNodeSkippingPolicy {
    /// The node is always kept.
    #[default]
    Never,
    /// The node is always replaced by its children.
    Always,
    /// The node is replaced by its only child when it has exactly one.
    IfOnlyOneChild,
}

impl AstNodeSkippingPolicy {
    /// Returns `true` if `node` has to be replaced by its children.
    ///
    /// `node`'s children are already the result of elision below it.
    #[must_use]
    pub fn has_to_be_skipped(self, node: &AstNode) -> bool {
        match self {
            AstNodeSkippingPolicy::Never => false,
            AstNodeSkippingPolicy::Always => true,
            AstNodeSkippingPolicy::IfOnlyOneChild => node.children.len() == 1,
        }
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    name: SmolStr,
    token: Option<Token>,
    children: Vec<AstNode>,
    from_index: usize,
    to_index: usize,
    skipped: bool,
}

impl AstNode {
    /// Name given to group nodes.
    pub(crate) const GROUP: &'static str = "group";

    pub(crate) fn new(name: impl Into<SmolStr>, from_index: usize) -> Self {
        Self {
            name: name.into(),
            token: None,
            children: Vec::new(),
            from_index,
            to_index: from_index,
            skipped: false,
        }
    }

    /// A node that is spliced into its parent.
    pub(crate) fn group(from_index: usize) -> Self {
        let mut node = Self::new(Self::GROUP, from_index);
        node.skipped = true;
        node
    }

    /// A leaf wrapping the token at `index`.
    pub(crate) fn leaf(token: Token, index: usize) -> Self {
        Self {
            name: SmolStr::new(token.token_type.name()),
            token: Some(token),
            children: Vec::new(),
            from_index: index,
            to_index: index + 1,
            skipped: false,
        }
    }

    /// Appends `child`, or its children if `child` is skipped.
    pub(crate) fn add_child(&mut self, child: AstNode) {
        if child.skipped {
            self.children.extend(child.children);
        } else {
            self.children.push(child);
        }
    }

    pub(crate) fn finish(&mut self, to_index: usize) {
        self.to_index = to_index.max(self.from_index);
    }

    pub(crate) fn set_token_range(&mut self, range: Range<usize>) {
        self.from_index = range.start;
        self.to_index = range.end.max(range.start);
    }

    pub(crate) fn apply_policy(&mut self, policy: AstNodeSkippingPolicy) {
        self.skipped = policy.has_to_be_skipped(self);
    }

    /// Returns the node name: the rule name, the token type of a leaf, or
    /// the name of a synthetic node (`adjacent`, `till`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this node would be replaced by its children when
    /// added to a parent.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Returns the token of a leaf node.
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Returns `true` if this is a leaf node carrying a token.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the token value of a leaf node.
    #[must_use]
    pub fn token_value(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.value.as_str())
    }

    /// Returns the children in source order.
    #[must_use]
    pub fn children(&self) -> &[AstNode] {
        &self.children
    }

    /// Returns `true` if the node has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the first child.
    #[must_use]
    pub fn first_child(&self) -> Option<&AstNode> {
        self.children.first()
    }

    /// Returns the last child.
    #[must_use]
    pub fn last_child(&self) -> Option<&AstNode> {
        self.children.last()
    }

    /// Returns the first direct child named `name`.
    #[must_use]
    pub fn find_first_child(&self, name: &str) -> Option<&AstNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns all direct children named `name`.
    pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AstNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Iterates over this node and all of its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Iterates over the tokens of all leaves below (and including) this node.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.descendants().filter_map(AstNode::token)
    }

    /// Returns the first token covered by this node.
    #[must_use]
    pub fn first_token(&self) -> Option<&Token> {
        self.tokens().next()
    }

    /// Returns the last token covered by this node.
    #[must_use]
    pub fn last_token(&self) -> Option<&Token> {
        if let Some(token) = &self.token {
            return Some(token);
        }
        self.children.iter().rev().find_map(AstNode::last_token)
    }

    /// Returns the range of token-stream indices matched by this node.
    #[must_use]
    pub fn token_range(&self) -> Range<usize> {
        self.from_index..self.to_index
    }

    /// Returns the character range covered by the node's tokens.
    #[must_use]
    pub fn text_range(&self) -> Option<TextRange> {
        let first = self.first_token()?;
        let last = self.last_token()?;
        Some(first.range.cover(last.range))
    }
}

/// Pre-order iterator over a node and its descendants.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    stack: Vec<&'a AstNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl fmt::Display for AstNode {
    /// Writes an indented dump of the tree, one node per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(node: &AstNode, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
            let indent = "  ".repeat(depth);
            match &node.token {
                Some(token) => writeln!(
                    f,
                    "{indent}{} {:?}@{}:{}",
                    node.name, token.value, token.line, token.column
                )?,
                None => writeln!(f, "{indent}{}", node.name)?,
            }
            for child in &node.children {
                write_node(child, f, depth + 1)?;
            }
            Ok(())
        }

        write_node(self, f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn leaf(value: &str, index: usize) -> AstNode {
        let column = u32::try_from(index).unwrap() * 2;
        AstNode::leaf(
            Token::new(TokenType::new("ID"), value, 1, column),
            index,
        )
    }

    #[test]
    fn test_group_children_are_spliced() {
        let mut group = AstNode::group(0);
        group.add_child(leaf("a", 0));
        group.add_child(leaf("b", 1));

        let mut rule = AstNode::new("rule", 0);
        rule.add_child(group);
        rule.finish(2);

        let values: Vec<_> = rule.children().iter().filter_map(AstNode::token_value).collect();
        assert_eq!(values, vec!["a", "b"]);
        assert_eq!(rule.token_range(), 0..2);
    }

    #[test]
    fn test_if_only_one_child_uses_current_children() {
        let mut node = AstNode::new("rule", 0);
        node.add_child(leaf("a", 0));
        assert!(AstNodeSkippingPolicy::IfOnlyOneChild.has_to_be_skipped(&node));
        node.add_child(leaf("b", 1));
        assert!(!AstNodeSkippingPolicy::IfOnlyOneChild.has_to_be_skipped(&node));
        assert!(AstNodeSkippingPolicy::Always.has_to_be_skipped(&node));
        assert!(!AstNodeSkippingPolicy::Never.has_to_be_skipped(&node));
    }

    #[test]
    fn test_first_and_last_token() {
        let mut inner = AstNode::new("inner", 1);
        inner.add_child(leaf("b", 1));
        inner.add_child(leaf("c", 2));
        let mut outer = AstNode::new("outer", 0);
        outer.add_child(leaf("a", 0));
        outer.add_child(inner);
        outer.add_child(AstNode::new("empty", 3));

        assert_eq!(outer.first_token().map(|t| t.value.as_str()), Some("a"));
        assert_eq!(outer.last_token().map(|t| t.value.as_str()), Some("c"));
        let names: Vec<_> = outer.descendants().map(AstNode::name).collect();
        assert_eq!(names, vec!["outer", "ID", "inner", "ID", "ID", "empty"]);
    }
}
