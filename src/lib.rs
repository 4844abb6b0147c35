//! # docfill
//!
//! DOCX template filling for Rust.
//!
//! A template is an ordinary word-processing document containing `{{key}}`
//! placeholders and `{{LOOP_<name>_START}}` / `{{LOOP_<name>_END}}` marker
//! pairs. Given one record or a list of records, docfill replicates the
//! marked table rows or body blocks once per record and fills every
//! placeholder, keeping the template's formatting.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfill::{generate_file, DataContext, GenerateOptions, RecordList};
//!
//! fn main() -> docfill::Result<()> {
//!     let records = RecordList::from_json_str(r#"[{"Item": "A"}, {"Item": "B"}]"#)?;
//!     let data = DataContext::List(records);
//!
//!     let stats = generate_file("invoice.docx", &data, "out/invoice.docx", GenerateOptions::default())?;
//!     println!("{} placeholders replaced", stats.placeholders_replaced);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Split-run placeholders**: `{{key}}` fragmented across formatting runs
//!   still resolves
//! - **Row and block loops**: table row ranges and top-level body ranges
//! - **Round-trip safe**: parts and elements the engine does not touch are
//!   written back unchanged
//! - **Batch generation**: one document per record chunk, in parallel with Rayon
//! - **Read-only output**: document protection plus the filesystem attribute

pub mod data;
pub mod detect;
pub mod error;
pub mod generator;
pub mod model;
pub mod package;
pub mod template;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use data::{split_records, DataContext, Record, RecordList, Value};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use error::{Error, Result};
pub use generator::{
    generate, generate_batch, generate_file, BatchEvent, BatchOptions, BatchReport, CancelToken,
    ErrorMode, GenerateOptions, GenerateOutput, GenerationStats, Generator, Template,
};
#[cfg(feature = "async")]
pub use generator::generate_file_async;
pub use model::{Block, Document, Paragraph, Run, StructuralClone, Table, TableCell, TableRow};
pub use package::DocxPackage;
pub use template::{LoopSummary, TemplateIssue, TemplateSummary};

use std::path::Path;

/// Inspect a template file without generating anything.
///
/// # Example
///
/// ```no_run
/// use docfill::inspect;
///
/// let summary = inspect("template.docx").unwrap();
/// for key in &summary.placeholders {
///     println!("{}", key);
/// }
/// ```
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<TemplateSummary> {
    Template::open(path)?.inspect()
}

/// Inspect template bytes.
pub fn inspect_bytes(data: &[u8]) -> Result<TemplateSummary> {
    Template::from_bytes(data)?.inspect()
}

/// Builder for loading and filling templates.
///
/// # Example
///
/// ```no_run
/// use docfill::{Docfill, DataContext, Record};
///
/// let data = DataContext::Single(Record::new().with("Name", "张三"));
/// let stats = Docfill::new()
///     .strict()
///     .read_only()
///     .load("template.docx")?
///     .generate_to_file(&data, "out.docx")?;
/// # Ok::<(), docfill::Error>(())
/// ```
pub struct Docfill {
    options: GenerateOptions,
}

impl Docfill {
    /// Create a new Docfill builder.
    pub fn new() -> Self {
        Self {
            options: GenerateOptions::default(),
        }
    }

    /// Enable strict mode: malformed loop markers abort generation.
    pub fn strict(mut self) -> Self {
        self.options = self.options.strict();
        self
    }

    /// Enable lenient mode: malformed loop markers stay literal.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Mark generated documents read-only.
    pub fn read_only(mut self) -> Self {
        self.options = self.options.with_read_only(true);
        self
    }

    /// Enable or disable header and footer substitution.
    pub fn with_headers_footers(mut self, enabled: bool) -> Self {
        self.options = self.options.with_headers_footers(enabled);
        self
    }

    /// Load a template file.
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<DocfillTemplate> {
        Ok(DocfillTemplate {
            template: Template::open(path)?,
            generator: Generator::new(self.options),
        })
    }

    /// Load template bytes.
    pub fn load_bytes(self, data: &[u8]) -> Result<DocfillTemplate> {
        Ok(DocfillTemplate {
            template: Template::from_bytes(data)?,
            generator: Generator::new(self.options),
        })
    }
}

impl Default for Docfill {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded template bound to generation options.
pub struct DocfillTemplate {
    template: Template,
    generator: Generator,
}

impl DocfillTemplate {
    /// Generate one document in memory.
    pub fn generate(&self, data: &DataContext) -> Result<GenerateOutput> {
        self.generator.generate(&self.template, data)
    }

    /// Generate one document into a file.
    pub fn generate_to_file<P: AsRef<Path>>(
        &self,
        data: &DataContext,
        output: P,
    ) -> Result<GenerationStats> {
        self.generator.generate_to_file(&self.template, data, output)
    }

    /// Generate one document per record chunk.
    ///
    /// The builder's generation options replace `options.generate`.
    pub fn batch<P: AsRef<Path>>(
        &self,
        records: &RecordList,
        output_dir: P,
        options: BatchOptions,
    ) -> Result<BatchReport> {
        let options = options.with_generate_options(self.generator.options().clone());
        generate_batch(&self.template, records, output_dir, &options)
    }

    /// List placeholders, loops and marker problems.
    pub fn inspect(&self) -> Result<TemplateSummary> {
        self.template.inspect()
    }

    /// The loaded template.
    pub fn template(&self) -> &Template {
        &self.template
    }
}
