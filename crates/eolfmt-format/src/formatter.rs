use std::path::Path;

use eolfmt_config::ConventionsSnapshot;
use eolfmt_core::{apply_text_edits, LineIndex, TextEdit, TextRange};
use tokio_util::sync::CancellationToken;

use crate::{minimal_text_edits, FormatError};

/// Broad category of a formatting pass; callers enable or disable passes by category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// Passes that only touch whitespace (indentation, terminators, trailing spaces, ...).
    Whitespace,
    /// Passes that rewrite code according to style preferences.
    CodeStyle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    pub fix_whitespace: bool,
    pub fix_code_style: bool,
    /// Log a warning for every change a pass makes (check mode).
    pub report_changes: bool,
}

impl FormatOptions {
    pub fn enables(&self, format_type: FormatType) -> bool {
        match format_type {
            FormatType::Whitespace => self.fix_whitespace,
            FormatType::CodeStyle => self.fix_code_style,
        }
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            fix_whitespace: true,
            fix_code_style: true,
            report_changes: false,
        }
    }
}

/// A single text-to-text formatting pass over one document.
///
/// Implementations must be pure: the output depends only on the text and conventions, and no
/// state is kept between documents.
pub trait DocumentFormatter: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn format_type(&self) -> FormatType;

    /// Human readable description attached to every change this pass reports.
    fn warning_description(&self) -> &'static str;

    fn format_text(
        &self,
        text: &str,
        conventions: &ConventionsSnapshot,
        cancel: &CancellationToken,
    ) -> Result<String, FormatError>;

    /// Edits (over `text`) that this pass would apply.
    ///
    /// The default diffs the output of [`DocumentFormatter::format_text`] against the input.
    fn format_edits(
        &self,
        text: &str,
        conventions: &ConventionsSnapshot,
        cancel: &CancellationToken,
    ) -> Result<Vec<TextEdit>, FormatError> {
        let formatted = self.format_text(text, conventions, cancel)?;
        Ok(minimal_text_edits(text, &formatted))
    }
}

/// One change made by a pass, located in the text the pass received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatChange {
    pub formatter: &'static str,
    pub range: TextRange,
    /// Zero-based line.
    pub line: u32,
    /// Zero-based UTF-8 byte column.
    pub column: u32,
    pub description: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedDocument {
    pub text: String,
    pub changes: Vec<FormatChange>,
}

impl FormattedDocument {
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Run `formatter` over one document and describe what it changed.
///
/// With [`FormatOptions::report_changes`] set, each change is also logged as
/// `path(line,col): description` using one-based numbers.
pub fn format_document(
    formatter: &dyn DocumentFormatter,
    path: &Path,
    text: &str,
    conventions: &ConventionsSnapshot,
    options: &FormatOptions,
    cancel: &CancellationToken,
) -> Result<FormattedDocument, FormatError> {
    let edits = formatter.format_edits(text, conventions, cancel)?;
    if edits.is_empty() {
        return Ok(FormattedDocument {
            text: text.to_owned(),
            changes: Vec::new(),
        });
    }

    let formatted =
        apply_text_edits(text, &edits).map_err(|source| FormatError::InvalidEdits {
            formatter: formatter.name(),
            source,
        })?;

    let line_index = LineIndex::new(text);
    let changes: Vec<FormatChange> = edits
        .iter()
        .map(|edit| {
            let pos = line_index.line_col(edit.range.start());
            FormatChange {
                formatter: formatter.name(),
                range: edit.range,
                line: pos.line,
                column: pos.col,
                description: formatter.warning_description(),
            }
        })
        .collect();

    tracing::debug!(
        target: "eolfmt.format",
        formatter = formatter.name(),
        path = %path.display(),
        changes = changes.len(),
        "formatted document"
    );

    if options.report_changes {
        for change in &changes {
            tracing::warn!(
                target: "eolfmt.format",
                formatter = change.formatter,
                "{}({},{}): {}",
                path.display(),
                change.line + 1,
                change.column + 1,
                change.description
            );
        }
    }

    Ok(FormattedDocument {
        text: formatted,
        changes,
    })
}
