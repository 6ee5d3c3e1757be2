//! Text edit primitives and utilities.

use crate::{TextRange, TextSize};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::new(offset, offset), text)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum EditError {
    #[error("edit range {range:?} is out of bounds for text length {text_len:?}")]
    RangeOutOfBounds { range: TextRange, text_len: TextSize },
    #[error("offset {offset:?} is not a UTF-8 character boundary")]
    InvalidUtf8Boundary { offset: TextSize },
    #[error("overlapping edits: {first:?} overlaps {second:?}")]
    OverlappingEdits { first: TextRange, second: TextRange },
}

/// Apply a list of edits to a text snapshot.
///
/// All ranges refer to `text` as given; edits behave as if applied simultaneously. The function
/// is deterministic: edits are first sorted by `(start, end)` and the result is assembled in a
/// single front-to-back pass.
pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let mut edits = edits.to_vec();
    normalize_text_edits(text, &mut edits)?;

    let delta: isize = edits
        .iter()
        .map(|edit| edit.replacement.len() as isize - usize::from(edit.range.len()) as isize)
        .sum();
    let mut out = String::with_capacity(text.len().saturating_add_signed(delta));

    let mut cursor = 0usize;
    for edit in &edits {
        let start = usize::from(edit.range.start());
        let end = usize::from(edit.range.end());
        out.push_str(&text[cursor..start]);
        out.push_str(&edit.replacement);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Sort edits and check for overlaps / out-of-bounds.
pub fn normalize_text_edits(text: &str, edits: &mut Vec<TextEdit>) -> Result<(), EditError> {
    edits.sort_by_key(|e| (e.range.start(), e.range.end()));

    let text_len = TextSize::from(text.len() as u32);

    for edit in edits.iter() {
        if edit.range.end() > text_len {
            return Err(EditError::RangeOutOfBounds {
                range: edit.range,
                text_len,
            });
        }

        if !text.is_char_boundary(usize::from(edit.range.start())) {
            return Err(EditError::InvalidUtf8Boundary {
                offset: edit.range.start(),
            });
        }
        if !text.is_char_boundary(usize::from(edit.range.end())) {
            return Err(EditError::InvalidUtf8Boundary {
                offset: edit.range.end(),
            });
        }
    }

    for pair in edits.windows(2) {
        let first = &pair[0];
        let second = &pair[1];
        if first.range.end() > second.range.start()
            || (first.range.is_empty()
                && second.range.is_empty()
                && first.range.start() == second.range.start())
        {
            return Err(EditError::OverlappingEdits {
                first: first.range,
                second: second.range,
            });
        }
    }

    // Coalesce adjacent edits (e.g. two back-to-back inserts/replacements).
    let mut merged: Vec<TextEdit> = Vec::with_capacity(edits.len());
    for edit in edits.drain(..) {
        if let Some(last) = merged.last_mut() {
            if last.range.end() == edit.range.start() {
                last.range = TextRange::new(last.range.start(), edit.range.end());
                last.replacement.push_str(&edit.replacement);
                continue;
            }
        }
        merged.push(edit);
    }
    *edits = merged;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn apply_multiple_edits_is_deterministic() {
        let text = "abcdef";
        let mut edits = vec![
            // Replace "cd" -> "XX"
            TextEdit::new(range(2, 4), "XX"),
            // Insert "!" at start
            TextEdit::insert(TextSize::from(0), "!"),
            // Delete "f"
            TextEdit::new(range(5, 6), ""),
        ];

        let out1 = apply_text_edits(text, &edits).unwrap();

        edits.reverse();
        let out2 = apply_text_edits(text, &edits).unwrap();

        assert_eq!(out1, out2);
        assert_eq!(out1, "!abXXe");
    }

    #[test]
    fn offsets_refer_to_the_original_text() {
        // Growing the first terminator must not shift the second edit.
        let text = "a\nb\nc";
        let edits = vec![
            TextEdit::new(range(1, 2), "\r\n"),
            TextEdit::new(range(3, 4), "\r\n"),
        ];
        assert_eq!(apply_text_edits(text, &edits).unwrap(), "a\r\nb\r\nc");
    }

    #[test]
    fn no_edits_returns_identical_text() {
        assert_eq!(apply_text_edits("abc", &[]).unwrap(), "abc");
    }

    #[test]
    fn detect_overlapping_edits() {
        let text = "abcdef";
        let edits = vec![
            TextEdit::new(range(1, 4), "X"),
            TextEdit::new(range(3, 5), "Y"),
        ];

        assert!(matches!(
            apply_text_edits(text, &edits),
            Err(EditError::OverlappingEdits { .. })
        ));
    }

    #[test]
    fn detect_out_of_bounds_and_split_chars() {
        assert!(matches!(
            apply_text_edits("ab", &[TextEdit::new(range(1, 3), "")]),
            Err(EditError::RangeOutOfBounds { .. })
        ));
        assert_eq!(
            apply_text_edits("é", &[TextEdit::insert(TextSize::from(1), "x")]),
            Err(EditError::InvalidUtf8Boundary {
                offset: TextSize::from(1)
            })
        );
    }
}
