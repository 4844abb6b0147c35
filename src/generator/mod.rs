//! Generation orchestration.
//!
//! One generation call loads a fresh tree from the immutable template bytes,
//! expands table loops, expands body loops, fills single values from the
//! primary record, optionally applies read-only protection and serializes
//! the package. Nothing is shared between calls except the template bytes.

pub mod batch;
mod naming;
mod options;

pub use batch::{generate_batch, BatchEvent, BatchFailure, BatchOptions, BatchReport, CancelToken};
pub use naming::{default_file_name, file_name_from_rule, sanitize_file_name};
pub use options::{ErrorMode, GenerateOptions};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::data::{DataContext, Record};
use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::package::{protection, DocxPackage};
use crate::template::expand::FillOutcome;
use crate::template::{self, substitute_paragraph, TemplateIssue, TemplateSummary};

/// Counters describing one generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Placeholders replaced, loop clones included
    pub placeholders_replaced: usize,
    /// Paragraphs whose runs were merged to resolve fragmented placeholders
    pub paragraphs_collapsed: usize,
    /// Table row loops expanded
    pub table_loops: usize,
    /// Body block loops expanded
    pub body_loops: usize,
    /// Rows produced by table loops
    pub rows_inserted: usize,
    /// Blocks produced by body loops
    pub blocks_inserted: usize,
    /// Whether read-only protection was applied
    pub protected: bool,
    /// Malformed markers left as literal text
    pub issues: Vec<TemplateIssue>,
}

impl GenerationStats {
    pub(crate) fn record(&mut self, outcome: FillOutcome) {
        self.placeholders_replaced += outcome.replaced;
        self.paragraphs_collapsed += outcome.collapsed;
    }

    /// Total loops expanded.
    pub fn loops_expanded(&self) -> usize {
        self.table_loops + self.body_loops
    }
}

/// A loaded template: immutable package bytes, validated once.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Debug, Clone)]
pub struct Template {
    bytes: Arc<[u8]>,
    path: Option<PathBuf>,
}

impl Template {
    /// Load a template file.
    ///
    /// A missing or unreadable file is reported as
    /// [`Error::TemplateUnavailable`] before any generation work starts.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::TemplateUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut template = Self::from_bytes(bytes)?;
        template.path = Some(path.to_path_buf());
        Ok(template)
    }

    /// Use in-memory template bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes: Vec<u8> = bytes.into();
        detect_format_from_bytes(&bytes)?;
        Ok(Self {
            bytes: bytes.into(),
            path: None,
        })
    }

    /// The raw template bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Where the template was loaded from, if it came from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// List placeholders, loops and marker problems.
    pub fn inspect(&self) -> Result<TemplateSummary> {
        let package = DocxPackage::from_bytes(&self.bytes)?;
        let mut summary = template::inspect(&package.main_story()?.document);
        for name in package.header_footer_names()? {
            summary.add_placeholders(&package.read_story(&name)?.document);
        }
        Ok(summary)
    }
}

/// Output of one generation call.
#[derive(Debug, Clone)]
pub struct GenerateOutput {
    /// Serialized package
    pub bytes: Vec<u8>,
    /// What the call did
    pub stats: GenerationStats,
}

/// Runs the generation pipeline with fixed options.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GenerateOptions,
}

impl Generator {
    /// Create a generator.
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate one document from the template and data.
    pub fn generate(&self, template: &Template, data: &DataContext) -> Result<GenerateOutput> {
        let mode = self.options.error_mode;
        let mut package = DocxPackage::from_bytes(template.bytes())?;
        let mut stats = GenerationStats::default();

        let mut story = package.main_story()?;
        template::expand_table_loops(&mut story.document, data, mode, &mut stats)?;
        template::expand_body_loops(&mut story.document, data, mode, &mut stats)?;

        let primary = data.primary();
        if let Some(record) = primary {
            fill_singles(&mut story.document, record, &mut stats);
        } else {
            log::debug!("no primary record; single values left unfilled");
        }
        package.write_story(&story)?;

        if self.options.headers_footers {
            if let Some(record) = primary {
                for name in package.header_footer_names()? {
                    let mut part = package.read_story(&name)?;
                    let before = stats.placeholders_replaced;
                    fill_singles(&mut part.document, record, &mut stats);
                    if stats.placeholders_replaced > before {
                        package.write_story(&part)?;
                    }
                }
            }
        }

        if self.options.read_only {
            match protection::apply_read_only(&mut package) {
                Ok(()) => stats.protected = true,
                Err(e) => log::warn!("read-only protection not applied: {e}"),
            }
        }

        let bytes = package.to_bytes()?;
        log::info!(
            "generated document: {} placeholders, {} loops, {} issues",
            stats.placeholders_replaced,
            stats.loops_expanded(),
            stats.issues.len()
        );
        Ok(GenerateOutput { bytes, stats })
    }

    /// Generate and write one document.
    ///
    /// The output directory is created when missing. With `read_only`, the
    /// file also gets the filesystem read-only attribute (best-effort).
    pub fn generate_to_file<P: AsRef<Path>>(
        &self,
        template: &Template,
        data: &DataContext,
        output: P,
    ) -> Result<GenerationStats> {
        let output = output.as_ref();
        let result = self.generate(template, data)?;
        write_output(output, &result.bytes)?;
        if self.options.read_only {
            mark_read_only(output);
        }
        Ok(result.stats)
    }
}

/// Fill single values across every paragraph, table cells included.
fn fill_singles(document: &mut Document, record: &Record, stats: &mut GenerationStats) {
    document.for_each_paragraph_mut(|paragraph| {
        let rewrite = substitute_paragraph(paragraph, record);
        stats.record(FillOutcome {
            replaced: rewrite.replaced,
            collapsed: usize::from(rewrite.collapsed),
        });
    });
}

pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Set the filesystem read-only attribute, warning on failure.
pub(crate) fn mark_read_only(path: &Path) {
    let result = std::fs::metadata(path).and_then(|meta| {
        let mut permissions = meta.permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(path, permissions)
    });
    if let Err(e) = result {
        log::warn!("could not mark {} read-only: {e}", path.display());
    }
}

/// Generate a document from template bytes.
///
/// # Example
///
/// ```no_run
/// use docfill::{generate, DataContext, Record};
///
/// let template = std::fs::read("template.docx")?;
/// let data = DataContext::Single(Record::new().with("Name", "张三"));
/// let filled = generate(&template, &data, false)?;
/// std::fs::write("filled.docx", filled)?;
/// # Ok::<(), docfill::Error>(())
/// ```
pub fn generate(template_bytes: &[u8], data: &DataContext, read_only: bool) -> Result<Vec<u8>> {
    let template = Template::from_bytes(template_bytes)?;
    let generator = Generator::new(GenerateOptions::new().with_read_only(read_only));
    Ok(generator.generate(&template, data)?.bytes)
}

/// Generate a document from a template file into an output file.
pub fn generate_file<P: AsRef<Path>, Q: AsRef<Path>>(
    template_path: P,
    data: &DataContext,
    output_path: Q,
    options: GenerateOptions,
) -> Result<GenerationStats> {
    let template = Template::open(template_path)?;
    Generator::new(options).generate_to_file(&template, data, output_path)
}

/// Async variant of [`generate_file`].
///
/// File I/O goes through `tokio::fs`; the pipeline itself runs on a
/// blocking task.
#[cfg(feature = "async")]
pub async fn generate_file_async<P: AsRef<Path>, Q: AsRef<Path>>(
    template_path: P,
    data: DataContext,
    output_path: Q,
    options: GenerateOptions,
) -> Result<GenerationStats> {
    let template_path = template_path.as_ref().to_path_buf();
    let output_path = output_path.as_ref();
    let read_only = options.read_only;

    let bytes = tokio::fs::read(&template_path)
        .await
        .map_err(|source| Error::TemplateUnavailable {
            path: template_path.clone(),
            source,
        })?;

    let output = tokio::task::spawn_blocking(move || {
        let template = Template::from_bytes(bytes)?;
        Generator::new(options).generate(&template, &data)
    })
    .await
    .map_err(|e| Error::Other(format!("generation task failed: {e}")))??;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output_path, &output.bytes).await?;
    if read_only {
        mark_read_only(output_path);
    }
    Ok(output.stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_from_invalid_bytes() {
        assert!(matches!(
            Template::from_bytes(b"not a docx".to_vec()),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_template_open_missing_file() {
        let result = Template::open("/nonexistent/dir/template.docx");
        assert!(matches!(result, Err(Error::TemplateUnavailable { .. })));
    }

    #[test]
    fn test_stats_loops_expanded() {
        let stats = GenerationStats {
            table_loops: 2,
            body_loops: 1,
            ..Default::default()
        };
        assert_eq!(stats.loops_expanded(), 3);
    }
}
