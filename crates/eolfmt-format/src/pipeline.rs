use std::path::Path;

use eolfmt_config::{ConventionsSnapshot, EolfmtConfig};
use eolfmt_core::{LineEnding, TextEdit};
use tokio_util::sync::CancellationToken;

use crate::{
    format_document, minimal_text_edits, Cancelled, DocumentFormatter, EndOfLineFormatter,
    FormatChange, FormatError, FormatOptions,
};

/// A composable formatting pipeline.
///
/// Passes run in insertion order; each receives the text produced by the previous one. Change
/// positions in [`PipelineOutput::changes`] refer to the text each pass received.
#[derive(Default)]
pub struct FormatPipeline {
    formatters: Vec<Box<dyn DocumentFormatter>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOutput {
    pub text: String,
    pub changes: Vec<FormatChange>,
}

impl FormatPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pipeline with the built-in passes.
    pub fn with_default_formatters(fallback: LineEnding) -> Self {
        let mut pipeline = Self::new();
        pipeline.push_formatter(EndOfLineFormatter::new(fallback));
        pipeline
    }

    /// The built-in passes, using the config's fallback terminator.
    pub fn from_config(config: &EolfmtConfig) -> Self {
        Self::with_default_formatters(config.fallback_end_of_line())
    }

    pub fn push_formatter<F>(&mut self, formatter: F)
    where
        F: DocumentFormatter + 'static,
    {
        self.formatters.push(Box::new(formatter));
    }

    pub fn formatter_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formatters.iter().map(|formatter| formatter.name())
    }

    /// Run every enabled pass over `text`.
    ///
    /// A cancelled run returns [`FormatError::Cancelled`] and no text.
    pub fn run(
        &self,
        path: &Path,
        text: &str,
        conventions: &ConventionsSnapshot,
        options: &FormatOptions,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput, FormatError> {
        let mut current = text.to_owned();
        let mut changes = Vec::new();

        for formatter in &self.formatters {
            if !options.enables(formatter.format_type()) {
                tracing::debug!(
                    target: "eolfmt.format",
                    formatter = formatter.name(),
                    "skipping disabled formatter"
                );
                continue;
            }
            if cancel.is_cancelled() {
                return Err(Cancelled.into());
            }

            let document =
                format_document(formatter.as_ref(), path, &current, conventions, options, cancel)?;
            changes.extend(document.changes);
            current = document.text;
        }

        Ok(PipelineOutput {
            text: current,
            changes,
        })
    }

    /// Run the pipeline and return minimal edits from `text` to the result.
    pub fn run_and_diff(
        &self,
        path: &Path,
        text: &str,
        conventions: &ConventionsSnapshot,
        options: &FormatOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<TextEdit>, FormatError> {
        let output = self.run(path, text, conventions, options, cancel)?;
        Ok(minimal_text_edits(text, &output.text))
    }
}
