//! Resolved source locations.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

/// A resolved position in some layer of text.
///
/// Lines and columns are 1-based. When the character was produced by a
/// transformation (macro expansion, generated code), [`parent`](Self::parent)
/// points at the location, one layer down, of the text it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextLocation {
    origin: Option<SmolStr>,
    line: u32,
    column: u32,
    parent: Option<Arc<TextLocation>>,
}

impl TextLocation {
    /// Creates a location without a parent layer.
    #[must_use]
    pub fn new(origin: Option<SmolStr>, line: u32, column: u32) -> Self {
        Self {
            origin,
            line,
            column,
            parent: None,
        }
    }

    /// Returns the origin (usually a file name) of the layer, if known.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Returns the 1-based line.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Returns the 1-based column.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Returns the location this one was produced from, one layer down.
    #[must_use]
    pub fn parent(&self) -> Option<&TextLocation> {
        self.parent.as_deref()
    }

    /// Attaches `parent` below the deepest layer of this location.
    #[must_use]
    pub fn with_parent(mut self, parent: TextLocation) -> Self {
        self.parent = Some(Arc::new(match self.parent.take() {
            Some(existing) => Arc::unwrap_or_clone(existing).with_parent(parent),
            None => parent,
        }));
        self
    }

    /// Iterates over this location and then every parent layer in turn.
    #[must_use]
    pub fn layers(&self) -> Layers<'_> {
        Layers { next: Some(self) }
    }

    /// Returns the number of layers below this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers().count() - 1
    }

    /// Returns the bottom-most layer, i.e. the original source position.
    #[must_use]
    pub fn root(&self) -> &TextLocation {
        self.layers().last().unwrap_or(self)
    }
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{origin}:{}:{}", self.line, self.column)?,
            None => write!(f, "{}:{}", self.line, self.column)?,
        }
        if let Some(parent) = &self.parent {
            write!(f, " (from {parent})")?;
        }
        Ok(())
    }
}

/// Iterator over the layers of a [`TextLocation`], outermost first.
#[derive(Debug, Clone)]
pub struct Layers<'a> {
    next: Option<&'a TextLocation>,
}

impl<'a> Iterator for Layers<'a> {
    type Item = &'a TextLocation;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
