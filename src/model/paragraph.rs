//! Paragraph and run types.

use serde::{Deserialize, Serialize};

use crate::package::XmlElement;

/// A paragraph: an ordered sequence of inline items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph properties (`w:pPr`), copied verbatim
    pub properties: Option<XmlElement>,

    /// Attributes on the paragraph element itself
    pub attributes: Vec<(String, String)>,

    /// Runs and opaque inline elements in document order
    pub content: Vec<Inline>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph holding one unstyled run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(Run::new(text));
        p
    }

    /// Create a paragraph from several unstyled runs, one per fragment.
    pub fn from_runs<S: Into<String>>(fragments: impl IntoIterator<Item = S>) -> Self {
        let mut p = Self::new();
        for fragment in fragments {
            p.add_run(Run::new(fragment));
        }
        p
    }

    /// Append a run.
    pub fn add_run(&mut self, run: Run) {
        self.content.push(Inline::Run(run));
    }

    /// Iterate over the text runs in document order, including runs inside
    /// groups such as hyperlinks.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        let mut runs = Vec::new();
        collect_runs(&self.content, &mut runs);
        runs.into_iter()
    }

    /// Mutable iteration over the text runs in document order.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        let mut runs = Vec::new();
        collect_runs_mut(&mut self.content, &mut runs);
        runs.into_iter()
    }

    /// Number of text runs.
    pub fn run_count(&self) -> usize {
        self.runs().count()
    }

    /// Concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.runs().map(|r| r.text.as_str()).collect()
    }

    /// Remove every run, keeping opaque inline content and group wrappers.
    pub fn clear_runs(&mut self) {
        retain_runs(&mut self.content, &mut |_| false);
    }

    /// Keep only the first run in document order.
    pub fn keep_first_run(&mut self) {
        let mut seen = false;
        retain_runs(&mut self.content, &mut |_| !std::mem::replace(&mut seen, true));
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// A text run the engine may rewrite
    Run(Run),

    /// A wrapper (hyperlink, smart tag, tracked insertion) whose runs stay
    /// rewritable; `element` holds the wrapper without its children
    Group {
        element: XmlElement,
        content: Vec<Inline>,
    },

    /// Anything else (drawings, fields, bookmarks), kept verbatim
    Opaque(XmlElement),
}

fn collect_runs<'a>(items: &'a [Inline], out: &mut Vec<&'a Run>) {
    for item in items {
        match item {
            Inline::Run(run) => out.push(run),
            Inline::Group { content, .. } => collect_runs(content, out),
            Inline::Opaque(_) => {}
        }
    }
}

fn collect_runs_mut<'a>(items: &'a mut [Inline], out: &mut Vec<&'a mut Run>) {
    for item in items {
        match item {
            Inline::Run(run) => out.push(run),
            Inline::Group { content, .. } => collect_runs_mut(content, out),
            Inline::Opaque(_) => {}
        }
    }
}

/// Drop the runs `keep` rejects, visited in document order.
fn retain_runs(items: &mut Vec<Inline>, keep: &mut dyn FnMut(&Run) -> bool) {
    items.retain_mut(|item| match item {
        Inline::Run(run) => keep(run),
        Inline::Group { content, .. } => {
            retain_runs(content, keep);
            true
        }
        Inline::Opaque(_) => true,
    });
}

impl Inline {
    /// The run, if this is one.
    pub fn as_run(&self) -> Option<&Run> {
        match self {
            Inline::Run(run) => Some(run),
            _ => None,
        }
    }
}

/// A run of text with uniform formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run properties (`w:rPr`), copied verbatim
    pub properties: Option<XmlElement>,

    /// Attributes on the run element itself
    pub attributes: Vec<(String, String)>,

    /// Text content; tabs are `\t`, line breaks are `\n`
    pub text: String,
}

impl Run {
    /// Create a new run without formatting.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a run carrying the given properties element.
    pub fn styled(text: impl Into<String>, properties: XmlElement) -> Self {
        Self {
            properties: Some(properties),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
