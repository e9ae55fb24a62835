//! In-memory host for engine and session tests

use std::collections::HashMap;
use std::ops::Range;

use async_trait::async_trait;

use super::host::{DecorationHandle, DocumentHost};
use super::matcher::LineMap;
use super::style::Color;
use crate::error::{HighlightError, Result};

/// A decoration as the host currently holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDecoration {
    pub color: Color,
    pub ranges: Vec<Range<usize>>,
}

/// Host that keeps the document as a string and records every call
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub text: Option<String>,
    pub name: Option<String>,
    pub decorations: HashMap<DecorationHandle, RecordedDecoration>,
    pub released: Vec<DecorationHandle>,
    pub side_views: Vec<(String, String)>,
    pub errors: Vec<String>,
    pub fail_replace: bool,
    pub fail_side_view: bool,
    /// Replacements that succeed before every later one fails
    pub replaces_left: Option<usize>,
    next_handle: u64,
    lines: LineMap,
}

impl RecordingHost {
    /// Host with no document attached
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            name: Some("app.log".to_string()),
            lines: LineMap::new(text),
            ..Default::default()
        }
    }

    /// Change the document behind the engine's back
    pub fn set_text(&mut self, text: &str) {
        self.lines = LineMap::new(text);
        self.text = Some(text.to_string());
    }

    /// Decorations that still paint something
    pub fn visible_decorations(&self) -> Vec<&RecordedDecoration> {
        let mut visible: Vec<_> = self
            .decorations
            .iter()
            .filter(|(_, d)| !d.ranges.is_empty())
            .collect();
        visible.sort_by_key(|(handle, _)| **handle);
        visible.into_iter().map(|(_, d)| d).collect()
    }

    /// Handles allocated and not yet released
    pub fn live_handles(&self) -> usize {
        self.decorations.len()
    }
}

#[async_trait]
impl DocumentHost for RecordingHost {
    fn document_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn offset_to_line(&self, offset: usize) -> usize {
        self.lines.offset_to_line(offset)
    }

    fn line_end_offset(&self, line: usize) -> usize {
        self.lines.line_end_offset(line)
    }

    fn file_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn create_decoration(&mut self, color: Color) -> DecorationHandle {
        self.next_handle += 1;
        let handle = DecorationHandle(self.next_handle);
        self.decorations.insert(
            handle,
            RecordedDecoration {
                color,
                ranges: Vec::new(),
            },
        );
        handle
    }

    fn apply_decoration(&mut self, handle: DecorationHandle, ranges: &[Range<usize>]) {
        if let Some(decoration) = self.decorations.get_mut(&handle) {
            decoration.ranges = ranges.to_vec();
        }
    }

    fn release_decoration(&mut self, handle: DecorationHandle) {
        self.decorations.remove(&handle);
        self.released.push(handle);
    }

    async fn replace_buffer_content(&mut self, text: String) -> Result<()> {
        if self.fail_replace {
            return Err(HighlightError::Message("edit rejected".into()));
        }
        if let Some(left) = self.replaces_left.as_mut() {
            if *left == 0 {
                return Err(HighlightError::Message("edit rejected".into()));
            }
            *left -= 1;
        }
        if self.text.is_none() {
            return Err(HighlightError::NoActiveDocument);
        }
        self.lines = LineMap::new(&text);
        self.text = Some(text);
        Ok(())
    }

    async fn open_side_view(&mut self, content: String, title: String) -> Result<()> {
        if self.fail_side_view {
            return Err(HighlightError::Message("cannot open view".into()));
        }
        self.side_views.push((title, content));
        Ok(())
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
