//! Loop region detection.
//!
//! Regions are found in one forward scan over the text of a container's
//! items: table rows, or top-level body blocks. Items that cannot carry a
//! marker (tables and opaque elements at body level) are passed as `None`.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

fn start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{LOOP_([A-Za-z0-9_]+)_START\}\}").unwrap())
}

fn end_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{LOOP_([A-Za-z0-9_]+)_END\}\}").unwrap())
}

/// The literal END marker for a loop name.
pub fn end_marker(name: &str) -> String {
    format!("{{{{LOOP_{name}_END}}}}")
}

/// The literal START marker for a loop name.
pub fn start_marker(name: &str) -> String {
    format!("{{{{LOOP_{name}_START}}}}")
}

/// A matched START/END pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopRegion {
    /// Loop name
    pub name: String,
    /// Index of the item holding the START marker
    pub start: usize,
    /// Index of the item holding the END marker
    pub end: usize,
}

impl LoopRegion {
    /// Whether both markers sit in the same item.
    pub fn is_inline(&self) -> bool {
        self.start == self.end
    }

    /// Items replicated per record.
    ///
    /// Normally the items strictly between the markers; for an inline region
    /// the marker item itself.
    pub fn template_range(&self) -> Range<usize> {
        if self.is_inline() {
            self.start..self.start + 1
        } else {
            self.start + 1..self.end
        }
    }

    /// Number of template items.
    pub fn template_len(&self) -> usize {
        self.template_range().len()
    }
}

/// A malformed-marker finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateIssue {
    /// Container the markers live in ("body", "table 1", ...)
    pub container: String,
    /// Item index the problem was found at
    pub index: usize,
    /// What is wrong
    pub kind: IssueKind,
}

/// Kinds of malformed markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    /// START marker with no END marker after it
    UnmatchedStart { name: String },
    /// Another START marker inside an open region
    NestedRegion { outer: String, inner: String },
    /// A second region with a name already used in this container
    DuplicateName { name: String },
    /// END marker that closes no region
    OrphanEnd { name: String },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::UnmatchedStart { name } => write!(f, "loop '{name}' has no END marker"),
            IssueKind::NestedRegion { outer, inner } => {
                write!(f, "loop '{inner}' is nested inside loop '{outer}'")
            }
            IssueKind::DuplicateName { name } => write!(f, "loop '{name}' appears more than once"),
            IssueKind::OrphanEnd { name } => write!(f, "END marker for '{name}' closes no loop"),
        }
    }
}

impl fmt::Display for TemplateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (item {}): {}", self.container, self.index + 1, self.kind)
    }
}

/// Result of scanning one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionScan {
    /// Well-formed regions, in document order, non-overlapping
    pub regions: Vec<LoopRegion>,
    /// Problems found; the affected markers are left as literal text
    pub issues: Vec<TemplateIssue>,
}

/// Scan item texts for loop regions.
pub fn detect_regions(container: &str, texts: &[Option<String>]) -> RegionScan {
    let mut scan = RegionScan::default();
    let mut names: HashSet<String> = HashSet::new();
    let issue = |index, kind| TemplateIssue {
        container: container.to_string(),
        index,
        kind,
    };

    let mut i = 0;
    while i < texts.len() {
        let Some(text) = texts[i].as_deref() else {
            i += 1;
            continue;
        };
        let Some(caps) = start_regex().captures(text) else {
            i += 1;
            continue;
        };
        let name = caps[1].to_string();
        let after_start = caps.get(0).map_or(0, |m| m.end());
        let marker = end_marker(&name);

        let end = if text[after_start..].contains(&marker) {
            Some(i)
        } else {
            (i + 1..texts.len()).find(|&j| texts[j].as_deref().is_some_and(|t| t.contains(&marker)))
        };

        let Some(end) = end else {
            scan.issues.push(issue(i, IssueKind::UnmatchedStart { name }));
            i += 1;
            continue;
        };

        let inner = (i + 1..end).find_map(|j| {
            let t = texts[j].as_deref()?;
            start_regex().captures(t).map(|c| (j, c[1].to_string()))
        });
        if let Some((j, inner)) = inner {
            scan.issues
                .push(issue(j, IssueKind::NestedRegion { outer: name, inner }));
            i += 1;
            continue;
        }

        if !names.insert(name.clone()) {
            scan.issues.push(issue(i, IssueKind::DuplicateName { name }));
            i = end + 1;
            continue;
        }

        scan.regions.push(LoopRegion {
            name,
            start: i,
            end,
        });
        i = end + 1;
    }

    for (j, text) in texts.iter().enumerate() {
        let Some(text) = text.as_deref() else {
            continue;
        };
        for caps in end_regex().captures_iter(text) {
            let name = &caps[1];
            let closes = scan.regions.iter().any(|r| r.end == j && r.name == name);
            if !closes {
                scan.issues.push(issue(
                    j,
                    IssueKind::OrphanEnd {
                        name: name.to_string(),
                    },
                ));
            }
        }
    }

    scan
}
