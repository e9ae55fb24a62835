//! Pattern compilation and line matching
//!
//! A match decorates from where the pattern starts through the end of
//! the line containing that start, not just the matched substring.

use std::collections::BTreeSet;
use std::ops::Range;

use regex::{Regex, RegexBuilder};

use super::host::DocumentHost;
use super::rule::Rule;
use crate::error::{HighlightError, Result};

/// Line numbers (0-indexed) matched by one rule against the current text
pub type MatchSet = BTreeSet<usize>;

/// A rule with its pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: Rule,
    regex: Regex,
}

/// Result of scanning a document with one rule
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleMatches {
    /// Lines containing at least one match
    pub lines: MatchSet,
    /// Decoration ranges, `[match start, end of line)` in byte offsets
    pub ranges: Vec<Range<usize>>,
}

impl CompiledRule {
    /// Compile a rule's pattern case-insensitively
    pub fn compile(rule: &Rule) -> Result<Self> {
        let regex = RegexBuilder::new(&rule.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| HighlightError::InvalidPattern {
                pattern: rule.pattern.clone(),
                source,
            })?;
        Ok(Self {
            rule: rule.clone(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.rule.pattern
    }

    /// Scan `text` for all non-overlapping matches, start to end
    ///
    /// Offsets are resolved to lines through the host so the ranges agree
    /// with however the host numbers its lines.
    pub fn scan<H: DocumentHost + ?Sized>(&self, text: &str, host: &H) -> RuleMatches {
        let mut matches = RuleMatches::default();
        for m in self.regex.find_iter(text) {
            let line = host.offset_to_line(m.start());
            let end = host.line_end_offset(line).max(m.start());
            matches.ranges.push(m.start()..end);
            matches.lines.insert(line);
        }
        matches
    }
}

/// Byte offsets of line starts, for hosts that keep plain text
#[derive(Debug, Clone, Default)]
pub struct LineMap {
    starts: Vec<usize>,
    len: usize,
}

impl LineMap {
    /// Index the line starts of `text`, splitting on `'\n'`
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            starts,
            len: text.len(),
        }
    }

    /// Line containing a byte offset (offsets past the end map to the last line)
    pub fn offset_to_line(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    /// Offset of the first byte of a line (the text length for lines past the end)
    pub fn line_start_offset(&self, line: usize) -> usize {
        self.starts.get(line).copied().unwrap_or(self.len)
    }

    /// Offset just past the last character of a line, excluding the newline
    pub fn line_end_offset(&self, line: usize) -> usize {
        match self.starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.len,
        }
    }
}
