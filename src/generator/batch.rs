//! Batch generation: one output document per record chunk.
//!
//! Records are split into chunks, every chunk gets a file name up front, and
//! each output is then generated independently from the shared template
//! bytes. A failing output is logged, counted and skipped; the batch goes on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde::Serialize;

use super::naming::{default_file_name, file_name_from_rule, unique_name};
use super::{GenerateOptions, Generator, Template};
use crate::data::{split_records, DataContext, RecordList};
use crate::error::Result;

/// Cooperative cancellation flag shared with a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Outputs already started still complete.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress notifications sent while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// The batch is about to generate `total` outputs
    Started { total: usize },
    /// An output was written
    Written { index: usize, path: PathBuf, records: usize },
    /// An output failed and was skipped
    Failed { index: usize, error: String },
    /// An output was skipped because the batch was cancelled
    Cancelled { index: usize },
    /// The batch is done
    Finished { written: usize, failed: usize },
}

/// Options for batch generation.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Records per output document (0 = all records in one document)
    pub fill_count: usize,

    /// File naming rule with `{{key}}` / `{key}` tokens
    pub name_rule: Option<String>,

    /// Prefix of default file names
    pub document_type: String,

    /// Per-document generation options
    pub generate: GenerateOptions,

    /// Whether to generate outputs in parallel
    pub parallel: bool,

    /// Cancellation flag checked before each output
    pub cancel: Option<CancelToken>,

    /// Progress event channel
    pub progress: Option<Sender<BatchEvent>>,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set records per output document.
    pub fn with_fill_count(mut self, fill_count: usize) -> Self {
        self.fill_count = fill_count;
        self
    }

    /// Set the file naming rule.
    pub fn with_name_rule(mut self, rule: impl Into<String>) -> Self {
        self.name_rule = Some(rule.into());
        self
    }

    /// Set the default file name prefix.
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = document_type.into();
        self
    }

    /// Set per-document generation options.
    pub fn with_generate_options(mut self, options: GenerateOptions) -> Self {
        self.generate = options;
        self
    }

    /// Enable or disable read-only outputs.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.generate.read_only = read_only;
        self
    }

    /// Enable or disable parallel generation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel generation.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a progress channel.
    pub fn with_progress(mut self, sender: Sender<BatchEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    fn notify(&self, event: BatchEvent) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is listening.
            let _ = sender.send(event);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            fill_count: 0,
            name_rule: None,
            document_type: "document".to_string(),
            generate: GenerateOptions::default(),
            parallel: true,
            cancel: None,
            progress: None,
        }
    }
}

/// One output that could not be generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// Chunk index
    pub index: usize,
    /// Intended output path
    pub path: PathBuf,
    /// Error message
    pub error: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Written output files, in chunk order
    pub outputs: Vec<PathBuf>,
    /// Outputs that failed
    pub failures: Vec<BatchFailure>,
    /// Outputs skipped because the batch was cancelled
    pub skipped: usize,
    /// Records contained in written outputs
    pub processed_records: usize,
}

impl BatchReport {
    /// Outputs that were attempted (written or failed).
    pub fn attempted(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }

    /// A batch fails only when every attempted output failed.
    pub fn is_failed(&self) -> bool {
        self.attempted() > 0 && self.outputs.is_empty()
    }
}

enum Outcome {
    Written { path: PathBuf, records: usize },
    Failed(BatchFailure),
    Skipped,
}

/// Generate one document per chunk of records into `output_dir`.
///
/// Only setup problems (an uncreatable output directory) fail the call;
/// per-output failures are reported in the returned [`BatchReport`].
pub fn generate_batch<P: AsRef<Path>>(
    template: &Template,
    records: &RecordList,
    output_dir: P,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let output_dir = output_dir.as_ref();
    let chunks = split_records(records, options.fill_count);
    if chunks.is_empty() {
        log::warn!("no records to generate from");
        return Ok(BatchReport::default());
    }
    std::fs::create_dir_all(output_dir)?;

    let paths = plan_paths(&chunks, output_dir, options);
    let generator = Generator::new(options.generate.clone());
    options.notify(BatchEvent::Started {
        total: chunks.len(),
    });
    log::info!(
        "generating {} documents from {} records",
        chunks.len(),
        records.len()
    );

    let run = |index: usize| -> Outcome {
        if options.is_cancelled() {
            options.notify(BatchEvent::Cancelled { index });
            return Outcome::Skipped;
        }
        let chunk = &chunks[index];
        let path = &paths[index];
        let data = DataContext::List(chunk.clone());

        match generator.generate_to_file(template, &data, path) {
            Ok(_) => {
                options.notify(BatchEvent::Written {
                    index,
                    path: path.clone(),
                    records: chunk.len(),
                });
                Outcome::Written {
                    path: path.clone(),
                    records: chunk.len(),
                }
            }
            Err(e) => {
                log::warn!("output {} ({}) failed: {e}", index + 1, path.display());
                options.notify(BatchEvent::Failed {
                    index,
                    error: e.to_string(),
                });
                Outcome::Failed(BatchFailure {
                    index,
                    path: path.clone(),
                    error: e.to_string(),
                })
            }
        }
    };

    let outcomes: Vec<Outcome> = if options.parallel {
        (0..chunks.len()).into_par_iter().map(run).collect()
    } else {
        (0..chunks.len()).map(run).collect()
    };

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Written { path, records } => {
                report.outputs.push(path);
                report.processed_records += records;
            }
            Outcome::Failed(failure) => report.failures.push(failure),
            Outcome::Skipped => report.skipped += 1,
        }
    }

    options.notify(BatchEvent::Finished {
        written: report.outputs.len(),
        failed: report.failures.len(),
    });
    log::info!(
        "batch finished: {} written, {} failed, {} skipped",
        report.outputs.len(),
        report.failures.len(),
        report.skipped
    );
    Ok(report)
}

/// Name every output before generation starts, unique within the batch and
/// against files already in `output_dir`.
fn plan_paths(chunks: &[RecordList], output_dir: &Path, options: &BatchOptions) -> Vec<PathBuf> {
    let timestamp = Local::now();
    let rule = options
        .name_rule
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    let mut used: HashSet<String> = HashSet::new();

    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let name = match (rule, chunk.first()) {
                (Some(rule), Some(first)) => file_name_from_rule(rule, first),
                _ => default_file_name(&options.document_type, timestamp, chunk.len(), index + 1),
            };
            let name = unique_name(&name, |candidate| {
                used.contains(candidate) || output_dir.join(candidate).exists()
            });
            used.insert(name.clone());
            output_dir.join(name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;

    fn records(names: &[&str]) -> RecordList {
        names.iter().map(|n| Record::new().with("Name", *n)).collect()
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(!token.is_cancelled());
        shared.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_report_failure_rule() {
        let mut report = BatchReport::default();
        assert!(!report.is_failed());

        report.failures.push(BatchFailure {
            index: 0,
            path: PathBuf::from("a.docx"),
            error: "boom".to_string(),
        });
        assert!(report.is_failed());

        report.outputs.push(PathBuf::from("b.docx"));
        assert!(!report.is_failed());
    }

    #[test]
    fn test_plan_paths_deduplicates_rule_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Same.docx"), b"x").unwrap();

        let chunks = vec![records(&["Same"]), records(&["Same"]), records(&["Other"])];
        let options = BatchOptions::new().with_name_rule("{{Name}}");
        let paths = plan_paths(&chunks, dir.path(), &options);

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Same_1.docx", "Same_2.docx", "Other.docx"]);
    }

    #[test]
    fn test_plan_paths_default_names() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = vec![records(&["a", "b"]), records(&["c"])];
        let options = BatchOptions::new().with_document_type("Notice");
        let paths = plan_paths(&chunks, dir.path(), &options);

        let first = paths[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(first.starts_with("Notice_"));
        assert!(first.ends_with("_2_1.docx"));
        assert_ne!(paths[0], paths[1]);
    }

    #[test]
    fn test_empty_records_report() {
        let dir = tempfile::tempdir().unwrap();
        // Invalid bytes never reach generation when there is nothing to do.
        let template = Template {
            bytes: Vec::new().into(),
            path: None,
        };
        let report =
            generate_batch(&template, &RecordList::new(), dir.path(), &BatchOptions::new()).unwrap();
        assert_eq!(report, BatchReport::default());
    }
}
