//! Command protocol between a rules UI and the highlight session
//!
//! Commands travel as JSON objects tagged by `"command"`, one per line:
//!
//! ```text
//! {"command":"highlight","pattern":"ERROR","color":"#ff0000"}
//! {"command":"removeHighlight","pattern":"ERROR","color":"#ff0000"}
//! {"command":"updateContent","patterns":["ERROR","WARN"],"colors":["red","yellow"]}
//! {"command":"toggleHighlighted","patterns":["ERROR"],"colors":["red"]}
//! {"command":"clear"}
//! {"command":"reportError","message":"something went wrong"}
//! ```
//!
//! The sidebar webview's field names (`text`, `texts`) and its
//! `showErrorMessage` command are accepted as aliases.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::highlight::{Color, Rule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Add a rule and paint its matches
    Highlight {
        #[serde(alias = "text")]
        pattern: String,
        color: Color,
    },
    /// Remove a rule and its decoration
    RemoveHighlight {
        #[serde(alias = "text")]
        pattern: String,
        color: Color,
    },
    /// Remove every rule
    Clear,
    /// Replace the rule list and re-derive all decorations
    UpdateContent {
        #[serde(alias = "texts", default)]
        patterns: Vec<String>,
        #[serde(default)]
        colors: Vec<Color>,
    },
    /// Switch between the full and highlighted-only views
    ToggleHighlighted {
        #[serde(alias = "texts", default)]
        patterns: Vec<String>,
        #[serde(default)]
        colors: Vec<Color>,
    },
    /// Show a message on the host's error surface
    #[serde(alias = "showErrorMessage")]
    ReportError { message: String },
}

impl Command {
    /// Parse one JSON message
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Build an `updateContent` command from a rule list
    pub fn update_content(rules: &[Rule]) -> Self {
        let (patterns, colors) = split_rules(rules);
        Command::UpdateContent { patterns, colors }
    }

    /// Build a `toggleHighlighted` command carrying the rule list
    pub fn toggle_highlighted(rules: &[Rule]) -> Self {
        let (patterns, colors) = split_rules(rules);
        Command::ToggleHighlighted { patterns, colors }
    }

    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Highlight { .. } => "highlight",
            Command::RemoveHighlight { .. } => "removeHighlight",
            Command::Clear => "clear",
            Command::UpdateContent { .. } => "updateContent",
            Command::ToggleHighlighted { .. } => "toggleHighlighted",
            Command::ReportError { .. } => "reportError",
        }
    }
}

fn split_rules(rules: &[Rule]) -> (Vec<String>, Vec<Color>) {
    rules.iter().map(|r| (r.pattern.clone(), r.color)).unzip()
}

/// Pair parallel pattern and color lists
///
/// Patterns without a color get `default_color`; surplus colors are ignored.
pub fn pair_rules(patterns: Vec<String>, colors: Vec<Color>, default_color: Color) -> Vec<Rule> {
    let mut colors = colors.into_iter();
    patterns
        .into_iter()
        .map(|pattern| Rule::new(pattern, colors.next().unwrap_or(default_color)))
        .collect()
}
