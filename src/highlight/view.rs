//! Full vs highlighted-only views of a document

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the buffer shows the full document or only highlighted lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Full,
    HighlightedOnly,
}

impl ViewMode {
    /// Label for the control that switches away from this mode
    pub fn toggle_label(self) -> &'static str {
        match self {
            ViewMode::Full => "Show Highlighted Only",
            ViewMode::HighlightedOnly => "Show All",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Full => f.write_str("Full"),
            ViewMode::HighlightedOnly => f.write_str("Highlighted"),
        }
    }
}

/// How projected lines are tagged with their original position
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LinePrefix {
    /// The 0-indexed line number, as stored in the highlighted line index
    Index,
    /// The 1-based line number an editor gutter shows
    #[default]
    LineNumber,
    /// No prefix
    None,
}

impl LinePrefix {
    fn apply(self, idx: usize, line: &str) -> String {
        match self {
            LinePrefix::Index => format!("{}: {}", idx, line),
            LinePrefix::LineNumber => format!("{}: {}", idx + 1, line),
            LinePrefix::None => line.to_string(),
        }
    }
}

/// The full document as it was before switching to highlighted-only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    lines: Vec<String>,
}

impl Snapshot {
    /// Split on `'\n'` so that [`Snapshot::text`] reproduces `text` exactly
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Lines whose index is highlighted, in ascending original order
    pub fn project(&self, highlighted: &BTreeSet<usize>, prefix: LinePrefix) -> Vec<String> {
        highlighted
            .iter()
            .filter_map(|&idx| self.lines.get(idx).map(|line| prefix.apply(idx, line)))
            .collect()
    }
}
