//! Terminal-side document host
//!
//! Holds the buffers the viewer draws and the decorations the highlight
//! engine paints on them.

use std::collections::BTreeMap;
use std::ops::Range;

use async_trait::async_trait;
use tracing::debug;

use crate::buffer::Buffer;
use crate::error::{HighlightError, Result};
use crate::highlight::{Color, DecorationHandle, DocumentHost, Span, Style};

#[derive(Debug)]
struct Decoration {
    color: Color,
    ranges: Vec<Range<usize>>,
}

/// Document host backed by in-memory buffers
#[derive(Debug, Default)]
pub struct TerminalHost {
    /// The document being highlighted (None when no file was given)
    main: Option<Buffer>,
    /// Read-only highlighted-only view, created on first use
    side: Option<Buffer>,
    /// Live decorations, painted in handle order
    decorations: BTreeMap<DecorationHandle, Decoration>,
    next_handle: u64,
    /// Messages waiting for the minibuffer
    messages: Vec<String>,
}

impl TerminalHost {
    pub fn new(main: Option<Buffer>) -> Self {
        Self {
            main,
            ..Default::default()
        }
    }

    pub fn main(&self) -> Option<&Buffer> {
        self.main.as_ref()
    }

    pub fn side(&self) -> Option<&Buffer> {
        self.side.as_ref()
    }

    /// Take every message reported since the last call, oldest first
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    /// Styled spans for one line of the main buffer
    ///
    /// Offsets are relative to the line start. Later decorations come
    /// later in the list, so they win where spans overlap.
    pub fn spans_for_line(&self, line: usize) -> Vec<Span> {
        let Some(buffer) = &self.main else {
            return Vec::new();
        };
        let start = buffer.line_start_offset(line);
        let end = buffer.line_end_offset(line);

        let mut spans = Vec::new();
        for decoration in self.decorations.values() {
            let style = Style::highlight(decoration.color);
            for range in &decoration.ranges {
                let span = Span::new(
                    range.start.max(start) - start,
                    range.end.min(end).saturating_sub(start),
                    style,
                );
                if !span.is_empty() {
                    spans.push(span);
                }
            }
        }
        spans
    }
}

#[async_trait]
impl DocumentHost for TerminalHost {
    fn document_text(&self) -> Option<String> {
        self.main.as_ref().map(Buffer::text)
    }

    fn offset_to_line(&self, offset: usize) -> usize {
        self.main
            .as_ref()
            .map_or(0, |buffer| buffer.offset_to_line(offset))
    }

    fn line_end_offset(&self, line: usize) -> usize {
        self.main
            .as_ref()
            .map_or(0, |buffer| buffer.line_end_offset(line))
    }

    fn file_name(&self) -> Option<String> {
        let path = self.main.as_ref()?.filename()?;
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn create_decoration(&mut self, color: Color) -> DecorationHandle {
        self.next_handle += 1;
        let handle = DecorationHandle(self.next_handle);
        self.decorations.insert(
            handle,
            Decoration {
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
    }

    async fn replace_buffer_content(&mut self, text: String) -> Result<()> {
        let buffer = self.main.as_mut().ok_or(HighlightError::NoActiveDocument)?;
        buffer.set_text(&text);
        debug!(lines = buffer.line_count(), "replaced buffer content");
        Ok(())
    }

    async fn open_side_view(&mut self, content: String, title: String) -> Result<()> {
        match &mut self.side {
            Some(side) => {
                side.set_text(&content);
                side.set_name(title);
            }
            None => {
                let mut side = Buffer::from_text(title, &content);
                side.set_read_only(true);
                self.side = Some(side);
            }
        }
        Ok(())
    }

    fn report_error(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
