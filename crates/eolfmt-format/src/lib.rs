//! Whitespace formatting passes for eolfmt.
//!
//! Each pass is a pure text-to-text transform over a single document, driven by the coding
//! conventions resolved for that document. Passes never perform I/O and hold no state between
//! documents, so they can run on any worker thread; cancellation is cooperative via
//! [`CancellationToken`].

use eolfmt_core::EditError;
use thiserror::Error;

mod diff;
mod end_of_line;
mod formatter;
mod pipeline;

pub use diff::minimal_text_edits;
pub use end_of_line::{
    end_of_line_edits, end_of_line_from_conventions, normalize_line_endings,
    normalize_line_endings_with_cancel, resolve_end_of_line, EndOfLineFormatter,
    CANCELLATION_CHECK_INTERVAL,
};
pub use formatter::{
    format_document, DocumentFormatter, FormatChange, FormatOptions, FormatType,
    FormattedDocument,
};
pub use pipeline::{FormatPipeline, PipelineOutput};

pub use eolfmt_config::{ConventionsSnapshot, END_OF_LINE_KEY};
pub use eolfmt_core::{LineEnding, TextEdit};
pub use tokio_util::sync::CancellationToken;

/// Returned when a [`CancellationToken`] fires while a pass is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Error)]
#[error("formatting was cancelled")]
pub struct Cancelled;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("formatter `{formatter}` produced invalid edits: {source}")]
    InvalidEdits {
        formatter: &'static str,
        #[source]
        source: EditError,
    },
}
