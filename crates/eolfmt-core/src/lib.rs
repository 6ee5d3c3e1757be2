//! Core shared types for eolfmt.
//!
//! This crate is intentionally small: a text model (sizes, ranges, line index), the line ending
//! vocabulary, and a batch text edit builder.

mod edit;
mod line_ending;
mod text;

pub use edit::{apply_text_edits, normalize_text_edits, EditError, TextEdit};
pub use line_ending::{LineEnding, ParseLineEndingError};
pub use text::{Line, LineCol, LineIndex, Lines, TextRange, TextSize};
