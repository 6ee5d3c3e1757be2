//! End-of-line normalization.
//!
//! Rewrites every line terminator that does not match the configured `end_of_line` convention.
//! Line content and the number of lines are never changed, and a final line without a
//! terminator stays unterminated.

use eolfmt_config::{ConventionsSnapshot, END_OF_LINE_KEY};
use eolfmt_core::{apply_text_edits, Line, LineEnding, LineIndex, TextEdit};
use tokio_util::sync::CancellationToken;

use crate::{Cancelled, DocumentFormatter, FormatError, FormatType};

/// How many lines are scanned between two polls of the cancellation token.
pub const CANCELLATION_CHECK_INTERVAL: u32 = 4096;

/// Resolve an `end_of_line` convention value to a terminator.
///
/// `None` means no convention is configured and the document must be left alone. A configured
/// value that is not `lf`, `cr` or `crlf` resolves to `fallback`.
pub fn resolve_end_of_line(value: Option<&str>, fallback: LineEnding) -> Option<LineEnding> {
    let value = value?;
    match LineEnding::from_token(value) {
        Some(line_ending) => Some(line_ending),
        None => {
            tracing::debug!(
                target: "eolfmt.format",
                value,
                %fallback,
                "unrecognized end_of_line value; using fallback"
            );
            Some(fallback)
        }
    }
}

/// Resolve the `end_of_line` convention through a lookup capability.
pub fn end_of_line_from_conventions<F, S>(lookup: F, fallback: LineEnding) -> Option<LineEnding>
where
    F: FnOnce(&str) -> Option<S>,
    S: AsRef<str>,
{
    let value = lookup(END_OF_LINE_KEY)?;
    resolve_end_of_line(Some(value.as_ref()), fallback)
}

/// Edits replacing every terminator in `text` that differs from `line_ending`.
///
/// Ranges refer to `text`; the edits never overlap.
pub fn end_of_line_edits(text: &str, line_ending: LineEnding) -> Vec<TextEdit> {
    let marker = line_ending.as_str();
    LineIndex::new(text)
        .lines()
        .filter_map(|line| terminator_edit(text, line, marker))
        .collect()
}

/// [`end_of_line_edits`], polling `cancel` every [`CANCELLATION_CHECK_INTERVAL`] lines.
fn end_of_line_edits_with_cancel(
    text: &str,
    line_ending: LineEnding,
    cancel: &CancellationToken,
) -> Result<Vec<TextEdit>, Cancelled> {
    let marker = line_ending.as_str();
    let mut edits = Vec::new();

    for (line_number, line) in (0u32..).zip(LineIndex::new(text).lines()) {
        if line_number % CANCELLATION_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(Cancelled);
        }
        edits.extend(terminator_edit(text, line, marker));
    }

    Ok(edits)
}

/// The edit for one line's terminator, if it is present and differs from `marker`.
fn terminator_edit(text: &str, line: Line, marker: &str) -> Option<TextEdit> {
    let span = line.break_range();
    // An empty span is the unterminated last line.
    if span.is_empty() || &text[span] == marker {
        return None;
    }
    Some(TextEdit::new(span, marker))
}

/// Normalize all line terminators in `text` to the style named by `style`.
///
/// - `Some("lf" | "cr" | "crlf")` selects that terminator.
/// - `Some(other)` selects `fallback`.
/// - `None` returns `text` unchanged.
pub fn normalize_line_endings(text: &str, style: Option<&str>, fallback: LineEnding) -> String {
    let Some(line_ending) = resolve_end_of_line(style, fallback) else {
        return text.to_owned();
    };
    apply_end_of_line_edits(text, line_ending, &end_of_line_edits(text, line_ending))
}

/// Like [`normalize_line_endings`], abandoning the work if `cancel` fires.
///
/// The token is checked before any work starts and then every [`CANCELLATION_CHECK_INTERVAL`]
/// lines. A cancelled call never yields partially rewritten text.
pub fn normalize_line_endings_with_cancel(
    text: &str,
    style: Option<&str>,
    fallback: LineEnding,
    cancel: &CancellationToken,
) -> Result<String, Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }
    let Some(line_ending) = resolve_end_of_line(style, fallback) else {
        return Ok(text.to_owned());
    };
    let edits = end_of_line_edits_with_cancel(text, line_ending, cancel)?;
    Ok(apply_end_of_line_edits(text, line_ending, &edits))
}

fn apply_end_of_line_edits(text: &str, line_ending: LineEnding, edits: &[TextEdit]) -> String {
    if edits.is_empty() {
        return text.to_owned();
    }

    tracing::trace!(
        target: "eolfmt.format",
        edits = edits.len(),
        %line_ending,
        "normalizing line endings"
    );

    match apply_text_edits(text, edits) {
        Ok(out) => out,
        Err(err) => {
            // Terminator spans come from a `LineIndex` over `text`, so they are in bounds, on
            // char boundaries and disjoint.
            debug_assert!(false, "invalid end-of-line edits: {err}");
            tracing::error!(target: "eolfmt.format", error = %err, "invalid end-of-line edits");
            text.to_owned()
        }
    }
}

/// The end-of-line [`DocumentFormatter`] pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndOfLineFormatter {
    /// Terminator used for unrecognised `end_of_line` values.
    pub fallback: LineEnding,
}

impl EndOfLineFormatter {
    pub fn new(fallback: LineEnding) -> Self {
        Self { fallback }
    }

    fn line_ending(&self, conventions: &ConventionsSnapshot) -> Option<LineEnding> {
        let line_ending = end_of_line_from_conventions(|key| conventions.lookup(key), self.fallback);
        if line_ending.is_none() {
            tracing::debug!(target: "eolfmt.format", "no end_of_line convention configured");
        }
        line_ending
    }
}

impl DocumentFormatter for EndOfLineFormatter {
    fn name(&self) -> &'static str {
        "end_of_line"
    }

    fn format_type(&self) -> FormatType {
        FormatType::Whitespace
    }

    fn warning_description(&self) -> &'static str {
        "Fix end of line marker"
    }

    fn format_text(
        &self,
        text: &str,
        conventions: &ConventionsSnapshot,
        cancel: &CancellationToken,
    ) -> Result<String, FormatError> {
        Ok(normalize_line_endings_with_cancel(
            text,
            conventions.lookup(END_OF_LINE_KEY),
            self.fallback,
            cancel,
        )?)
    }

    fn format_edits(
        &self,
        text: &str,
        conventions: &ConventionsSnapshot,
        cancel: &CancellationToken,
    ) -> Result<Vec<TextEdit>, FormatError> {
        if cancel.is_cancelled() {
            return Err(Cancelled.into());
        }
        match self.line_ending(conventions) {
            Some(line_ending) => Ok(end_of_line_edits_with_cancel(text, line_ending, cancel)?),
            None => Ok(Vec::new()),
        }
    }
}
