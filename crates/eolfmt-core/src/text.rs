//! Text model primitives: sizes, ranges, and line lookups.

pub use text_size::{TextRange, TextSize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// A single line of a text snapshot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Line {
    /// Line content, excluding the terminator.
    pub range: TextRange,
    /// Line content plus its terminator (if any).
    pub range_including_break: TextRange,
}

impl Line {
    /// The terminator span `[range.end, range_including_break.end)`.
    ///
    /// Empty for the last line of a document that does not end with a line break.
    #[inline]
    pub fn break_range(&self) -> TextRange {
        TextRange::new(self.range.end(), self.range_including_break.end())
    }
}

/// Pre-computed line boundaries for a particular text snapshot.
///
/// `\n`, `\r` and `\r\n` are all recognised as line terminators. A text always has at least one
/// line; an empty text has a single empty line.
///
/// Offsets are [`TextSize`] (`u32`), so the text must be smaller than 4 GiB.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    line_ends: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        debug_assert!(
            u32::try_from(text.len()).is_ok(),
            "text of {} bytes does not fit in a TextSize",
            text.len()
        );
        let bytes = text.as_bytes();
        let mut line_starts = Vec::with_capacity(128);
        let mut line_ends = Vec::with_capacity(128);
        line_starts.push(TextSize::from(0));

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + 1) as u32));
                    i += 1;
                }
                b'\r' => {
                    line_ends.push(TextSize::from(i as u32));
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        line_starts.push(TextSize::from((i + 2) as u32));
                        i += 2;
                    } else {
                        line_starts.push(TextSize::from((i + 1) as u32));
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }

        line_ends.push(TextSize::from(text.len() as u32));

        Self {
            line_starts,
            line_ends,
            text_len: TextSize::from(text.len() as u32),
        }
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.text_len
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    #[inline]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line as usize).copied()
    }

    /// End of the line content, excluding the terminator.
    #[inline]
    pub fn line_end(&self, line: u32) -> Option<TextSize> {
        self.line_ends.get(line as usize).copied()
    }

    /// End of the line including its terminator.
    ///
    /// For the last line this is the text length.
    pub fn line_end_including_break(&self, line: u32) -> Option<TextSize> {
        let line = line as usize;
        if line >= self.line_starts.len() {
            return None;
        }
        Some(
            self.line_starts
                .get(line + 1)
                .copied()
                .unwrap_or(self.text_len),
        )
    }

    /// The terminator span of `line`, empty when the line has no trailing break.
    pub fn line_break_range(&self, line: u32) -> Option<TextRange> {
        let end = self.line_end(line)?;
        let end_including_break = self.line_end_including_break(line)?;
        Some(TextRange::new(end, end_including_break))
    }

    pub fn line(&self, line: u32) -> Option<Line> {
        let start = self.line_start(line)?;
        let end = self.line_end(line)?;
        let end_including_break = self.line_end_including_break(line)?;
        Some(Line {
            range: TextRange::new(start, end),
            range_including_break: TextRange::new(start, end_including_break),
        })
    }

    /// Iterate lines in document order.
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            index: self,
            next: 0,
        }
    }

    fn line_index(&self, offset: TextSize) -> usize {
        // Clamp offsets that point past the end; callers may pass `text_len`
        // when referring to EOF.
        let offset = offset.min(self.text_len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        }
    }

    /// Convert a byte offset to a UTF-8 (byte) line/column pair.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.text_len);
        let line = self.line_index(offset);
        let line_start = self.line_starts[line];
        let line_end = self.line_ends[line];
        let col = offset.min(line_end) - line_start;
        LineCol {
            line: line as u32,
            col: u32::from(col),
        }
    }

    /// Convert a UTF-8 (byte) line/column pair to a byte offset.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let start = self.line_start(line_col.line)?;
        let end = self.line_end(line_col.line)?;
        let offset = start + TextSize::from(line_col.col);
        if offset > end {
            return None;
        }
        Some(offset)
    }
}

/// Iterator over the lines of a [`LineIndex`].
#[derive(Clone, Debug)]
pub struct Lines<'a> {
    index: &'a LineIndex,
    next: u32,
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        let line = self.index.line(self.next)?;
        self.next += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.index.line_count().saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Lines<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    fn break_texts<'a>(text: &'a str, index: &LineIndex) -> Vec<&'a str> {
        index.lines().map(|line| &text[line.break_range()]).collect()
    }

    #[test]
    fn empty_text_has_one_unterminated_line() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_break_range(0), Some(range(0, 0)));
        assert_eq!(index.line(1), None);
    }

    #[test]
    fn recognises_all_terminators() {
        let text = "a\r\nb\nc\rd";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 4);
        assert_eq!(break_texts(text, &index), vec!["\r\n", "\n", "\r", ""]);
        assert_eq!(
            index.line(0),
            Some(Line {
                range: range(0, 1),
                range_including_break: range(0, 3),
            })
        );
        assert_eq!(index.line_end_including_break(3), Some(TextSize::from(8)));
    }

    #[test]
    fn trailing_terminator_produces_empty_last_line() {
        let text = "a\nb\n";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 3);
        assert_eq!(break_texts(text, &index), vec!["\n", "\n", ""]);
        assert_eq!(index.lines().len(), 3);
    }

    #[test]
    fn lone_cr_before_lf_run_is_split_correctly() {
        let text = "\r\r\n\n";
        let index = LineIndex::new(text);
        assert_eq!(break_texts(text, &index), vec!["\r", "\r\n", "\n", ""]);
    }

    #[test]
    fn line_col_round_trips_through_offset() {
        let text = "ab\r\ncd";
        let index = LineIndex::new(text);

        let pos = index.line_col(TextSize::from(5));
        assert_eq!(pos, LineCol { line: 1, col: 1 });
        assert_eq!(index.offset(pos), Some(TextSize::from(5)));

        // Columns inside the terminator are past the line content.
        assert_eq!(index.offset(LineCol { line: 0, col: 3 }), None);
    }
}
