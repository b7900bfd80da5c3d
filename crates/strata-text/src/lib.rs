//! `strata-text` - Layered text model for the strata parsing toolkit.
//!
//! Source text rarely reaches a parser untouched: files are included into
//! other files, macros are expanded, fragments are stitched together. This
//! crate models such text as an immutable tree of layers while still being
//! able to answer "where did this character come from?":
//!
//! - **Plain**: characters backed directly by a buffer, optionally tagged with
//!   an origin (usually a file name) and a starting line/column
//! - **Composite**: an ordered concatenation of other texts
//! - **Sub-text**: a lazy view into a range of another text
//! - **Transformed**: the output of a transformation, remembering the text it
//!   was produced from
//!
//! Random access goes through a [`TextCursor`], which keeps enough state to
//! make sequential scans over composite text cheap.
//!
//! # Example
//!
//! ```
//! use strata_text::Text;
//!
//! let header = Text::located("defs.h", "int x;\n");
//! let body = Text::located_at("main.c", "x = 1;", 2, 1);
//! let unit = Text::composite([header, body]);
//!
//! let mut cursor = unit.cursor();
//! assert_eq!(cursor.char_at(7), Some('x'));
//!
//! let location = cursor.location(7).unwrap();
//! assert_eq!(location.origin(), Some("main.c"));
//! assert_eq!((location.line(), location.column()), (2, 1));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod cursor;
mod location;
mod text;

pub use cursor::TextCursor;
pub use location::{Layers, TextLocation};
pub use text::{Text, TextKind};
