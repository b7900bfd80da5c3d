//! Text variants.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::cursor::TextCursor;
use crate::location::TextLocation;

/// An immutable, cheaply clonable character sequence.
///
/// Cloning a `Text` only bumps a reference count, so pieces can be shared
/// freely between composites, sub-texts and transformed layers.
#[derive(Clone)]
pub struct Text(pub(crate) Arc<Repr>);

/// The variant a [`Text`] was built as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Characters stored directly.
    Plain,
    /// Concatenation of other texts.
    Composite,
    /// A view into a range of another text.
    Sub,
    /// Output of a transformation over another text.
    Transformed,
}

pub(crate) enum Repr {
    Plain(PlainText),
    Composite(CompositeText),
    Sub(SubText),
    Transformed(TransformedText),
}

pub(crate) struct PlainText {
    pub(crate) chars: Box<[char]>,
    /// Offsets of the first character of every line; always starts with 0.
    line_starts: Box<[usize]>,
    origin: Option<SmolStr>,
    first_line: u32,
    first_column: u32,
}

pub(crate) struct CompositeText {
    pub(crate) pieces: Box<[Text]>,
    length: usize,
    depth: u32,
}

pub(crate) struct SubText {
    pub(crate) base: Text,
    pub(crate) range: Range<usize>,
}

pub(crate) struct TransformedText {
    pub(crate) output: Text,
    pub(crate) source: Text,
    depth: u32,
}

impl PlainText {
    fn new(content: &str, origin: Option<SmolStr>, first_line: u32, first_column: u32) -> Self {
        let chars: Box<[char]> = content.chars().collect();
        let mut line_starts = vec![0];
        for (index, &ch) in chars.iter().enumerate() {
            let breaks = match ch {
                '\n' => true,
                '\r' => chars.get(index + 1) != Some(&'\n'),
                _ => false,
            };
            if breaks {
                line_starts.push(index + 1);
            }
        }
        Self {
            chars,
            line_starts: line_starts.into_boxed_slice(),
            origin,
            first_line,
            first_column,
        }
    }

    /// Resolves `index` (which may equal the length) to a location.
    pub(crate) fn location(&self, index: usize) -> Option<TextLocation> {
        if index > self.chars.len() {
            return None;
        }
        let line_index = match self.line_starts.binary_search(&index) {
            Ok(line_index) => line_index,
            Err(insertion) => insertion - 1,
        };
        let offset_in_line = to_u32(index - self.line_starts[line_index]);
        let column = if line_index == 0 {
            self.first_column + offset_in_line
        } else {
            offset_in_line + 1
        };
        Some(TextLocation::new(
            self.origin.clone(),
            self.first_line + to_u32(line_index),
            column,
        ))
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl Text {
    fn from_repr(repr: Repr) -> Self {
        Self(Arc::new(repr))
    }

    /// Creates source-identical text with no origin, starting at 1:1.
    #[must_use]
    pub fn plain(content: &str) -> Self {
        Self::from_repr(Repr::Plain(PlainText::new(content, None, 1, 1)))
    }

    /// Creates source-identical text read from `origin`, starting at 1:1.
    #[must_use]
    pub fn located(origin: impl Into<SmolStr>, content: &str) -> Self {
        Self::located_at(origin, content, 1, 1)
    }

    /// Creates source-identical text from `origin` whose first character sits
    /// at the given 1-based line and column.
    ///
    /// Used for fragments cut out of a larger file, e.g. the part of a file
    /// that follows an include directive.
    #[must_use]
    pub fn located_at(origin: impl Into<SmolStr>, content: &str, line: u32, column: u32) -> Self {
        Self::from_repr(Repr::Plain(PlainText::new(
            content,
            Some(origin.into()),
            line.max(1),
            column.max(1),
        )))
    }

    /// Concatenates `pieces` in order.
    ///
    /// Length and transformation depth are computed once here.
    #[must_use]
    pub fn composite(pieces: impl IntoIterator<Item = Text>) -> Self {
        let pieces: Box<[Text]> = pieces.into_iter().collect();
        let length = pieces.iter().map(Text::len).sum();
        let depth = pieces
            .iter()
            .map(Text::transformation_depth)
            .max()
            .unwrap_or(0);
        Self::from_repr(Repr::Composite(CompositeText {
            pieces,
            length,
            depth,
        }))
    }

    /// Wraps `output`, the result of transforming `source`.
    ///
    /// Locations inside the result resolve in `output` and carry the starting
    /// location of `source` as their parent layer.
    #[must_use]
    pub fn transformed(output: Text, source: Text) -> Self {
        let depth = output
            .transformation_depth()
            .max(source.transformation_depth())
            + 1;
        Self::from_repr(Repr::Transformed(TransformedText {
            output,
            source,
            depth,
        }))
    }

    /// Returns which variant this text is.
    #[must_use]
    pub fn kind(&self) -> TextKind {
        match &*self.0 {
            Repr::Plain(_) => TextKind::Plain,
            Repr::Composite(_) => TextKind::Composite,
            Repr::Sub(_) => TextKind::Sub,
            Repr::Transformed(_) => TextKind::Transformed,
        }
    }

    /// Returns the number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        match &*self.0 {
            Repr::Plain(plain) => plain.chars.len(),
            Repr::Composite(composite) => composite.length,
            Repr::Sub(sub) => sub.range.len(),
            Repr::Transformed(transformed) => transformed.output.len(),
        }
    }

    /// Returns `true` if the text has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many transformation layers separate this text from the
    /// original source. Source-identical text has depth 0.
    #[must_use]
    pub fn transformation_depth(&self) -> u32 {
        match &*self.0 {
            Repr::Plain(_) => 0,
            Repr::Composite(composite) => composite.depth,
            Repr::Sub(sub) => sub.base.transformation_depth(),
            Repr::Transformed(transformed) => transformed.depth,
        }
    }

    /// Returns the pieces of a composite text, or an empty slice otherwise.
    #[must_use]
    pub fn pieces(&self) -> &[Text] {
        match &*self.0 {
            Repr::Composite(composite) => &composite.pieces,
            _ => &[],
        }
    }

    /// Creates a cursor for random access into this text.
    #[must_use]
    pub fn cursor(&self) -> TextCursor {
        TextCursor::new(self.clone())
    }

    /// Returns the character at `index`.
    ///
    /// Builds a fresh cursor; use [`Text::cursor`] for repeated access.
    #[must_use]
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.cursor().char_at(index)
    }

    /// Resolves `index` to a location. `index` may equal the length.
    #[must_use]
    pub fn location(&self, index: usize) -> Option<TextLocation> {
        self.cursor().location(index)
    }

    /// Returns a lazy view of `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is reversed or extends past the end of the text.
    #[must_use]
    pub fn sub_text(&self, range: Range<usize>) -> Text {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "sub-text range {range:?} out of bounds for text of length {}",
            self.len()
        );
        if range.start == 0 && range.end == self.len() {
            return self.clone();
        }
        match &*self.0 {
            Repr::Sub(sub) => Self::from_repr(Repr::Sub(SubText {
                base: sub.base.clone(),
                range: sub.range.start + range.start..sub.range.start + range.end,
            })),
            _ => Self::from_repr(Repr::Sub(SubText {
                base: self.clone(),
                range,
            })),
        }
    }

    fn push_chars(&self, out: &mut String) {
        match &*self.0 {
            Repr::Plain(plain) => out.extend(plain.chars.iter()),
            Repr::Composite(composite) => {
                for piece in composite.pieces.iter() {
                    piece.push_chars(out);
                }
            }
            Repr::Sub(sub) => {
                let mut cursor = sub.base.cursor();
                out.extend(sub.range.clone().filter_map(|index| cursor.char_at(index)));
            }
            Repr::Transformed(transformed) => transformed.output.push_chars(out),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.len());
        self.push_chars(&mut out);
        f.write_str(&out)
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Text")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .field("depth", &self.transformation_depth())
            .finish()
    }
}

impl From<&str> for Text {
    fn from(content: &str) -> Self {
        Text::plain(content)
    }
}
