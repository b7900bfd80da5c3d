//! Random access into text.
//!
//! A cursor owns a handle to the text it reads and keeps just enough state
//! to make the common access pattern (indices moving forward or backward a
//! little at a time) cheap. For composite text that state is the index of
//! the piece currently being read and the number of characters in all
//! pieces before it.

use std::ops::Range;

use crate::location::TextLocation;
use crate::text::{Repr, Text};

/// A stateful random-access view into a [`Text`].
pub struct TextCursor {
    text: Text,
    state: CursorState,
}

enum CursorState {
    Plain,
    Composite(CompositeCursor),
    Sub(Box<TextCursor>),
    Transformed {
        output: Box<TextCursor>,
        /// Starting location of the transformed source, resolved on first use.
        source_location: Option<TextLocation>,
    },
}

struct CompositeCursor {
    /// Index of the active piece.
    piece: usize,
    /// Sum of the lengths of all pieces before the active one.
    skipped: usize,
    inner: Option<Box<TextCursor>>,
}

impl TextCursor {
    pub(crate) fn new(text: Text) -> Self {
        let state = match &*text.0 {
            Repr::Plain(_) => CursorState::Plain,
            Repr::Composite(_) => CursorState::Composite(CompositeCursor {
                piece: 0,
                skipped: 0,
                inner: None,
            }),
            Repr::Sub(sub) => CursorState::Sub(Box::new(sub.base.cursor())),
            Repr::Transformed(transformed) => CursorState::Transformed {
                output: Box::new(transformed.output.cursor()),
                source_location: None,
            },
        };
        Self { text, state }
    }

    /// Returns the text this cursor reads.
    #[must_use]
    pub fn text(&self) -> &Text {
        &self.text
    }

    /// Returns the length of the underlying text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the underlying text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the character at `index`, or `None` past the end.
    pub fn char_at(&mut self, index: usize) -> Option<char> {
        if index >= self.text.len() {
            return None;
        }
        match (&*self.text.0, &mut self.state) {
            (Repr::Plain(plain), CursorState::Plain) => plain.chars.get(index).copied(),
            (Repr::Composite(composite), CursorState::Composite(cursor)) => {
                let (inner, inner_index) = cursor.move_to(&composite.pieces, index)?;
                inner.char_at(inner_index)
            }
            (Repr::Sub(sub), CursorState::Sub(base)) => base.char_at(sub.range.start + index),
            (Repr::Transformed(_), CursorState::Transformed { output, .. }) => {
                output.char_at(index)
            }
            _ => None,
        }
    }

    /// Resolves `index` to a location in the layer that owns the character.
    ///
    /// `index` may equal the length, which resolves to the position just
    /// after the last character.
    pub fn location(&mut self, index: usize) -> Option<TextLocation> {
        if index > self.text.len() {
            return None;
        }
        match (&*self.text.0, &mut self.state) {
            (Repr::Plain(plain), CursorState::Plain) => plain.location(index),
            (Repr::Composite(composite), CursorState::Composite(cursor)) => {
                let (inner, inner_index) = cursor.move_to(&composite.pieces, index)?;
                inner.location(inner_index)
            }
            (Repr::Sub(sub), CursorState::Sub(base)) => base.location(sub.range.start + index),
            (
                Repr::Transformed(transformed),
                CursorState::Transformed {
                    output,
                    source_location,
                },
            ) => {
                let location = output.location(index)?;
                if source_location.is_none() {
                    *source_location = transformed.source.location(0);
                }
                Some(match source_location {
                    Some(parent) => location.with_parent(parent.clone()),
                    None => location,
                })
            }
            _ => None,
        }
    }

    /// Returns a lazy view of `range`, relative to this cursor's text.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds, like [`Text::sub_text`].
    #[must_use]
    pub fn sub_text(&self, range: Range<usize>) -> Text {
        self.text.sub_text(range)
    }

    /// Returns a cursor over `range` of this cursor's text.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds, like [`Text::sub_text`].
    #[must_use]
    pub fn sub_sequence(&self, range: Range<usize>) -> TextCursor {
        self.sub_text(range).cursor()
    }
}

impl CompositeCursor {
    /// Re-targets the cursor to the piece owning `index`, walking piece by
    /// piece from the active one. Returns the inner cursor and the index
    /// relative to that piece.
    fn move_to(&mut self, pieces: &[Text], index: usize) -> Option<(&mut TextCursor, usize)> {
        if pieces.is_empty() {
            return None;
        }
        let mut piece = self.piece;
        let mut skipped = self.skipped;
        while index >= skipped + pieces[piece].len() && piece + 1 < pieces.len() {
            skipped += pieces[piece].len();
            piece += 1;
        }
        while index < skipped {
            piece -= 1;
            skipped -= pieces[piece].len();
        }

        if piece != self.piece || self.inner.is_none() {
            self.piece = piece;
            self.skipped = skipped;
            self.inner = Some(Box::new(pieces[piece].cursor()));
        }
        let inner = self.inner.as_deref_mut()?;
        Some((inner, index - skipped))
    }
}

impl std::fmt::Debug for TextCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("TextCursor");
        debug.field("text", &self.text);
        if let CursorState::Composite(cursor) = &self.state {
            debug
                .field("piece", &cursor.piece)
                .field("skipped", &cursor.skipped);
        }
        debug.finish()
    }
}
