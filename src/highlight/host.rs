//! Interface to the editor hosting a highlight session
//!
//! The engine never touches a concrete buffer. Everything it needs from
//! the surrounding editor (text, line geometry, decorations, and the two
//! round-trips that rewrite what the user sees) goes through
//! [`DocumentHost`].

use std::ops::Range;

use async_trait::async_trait;

use super::style::Color;
use crate::error::Result;

/// Opaque handle to one applied color + range-set decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationHandle(pub u64);

#[async_trait]
pub trait DocumentHost: Send {
    /// Full current buffer contents, or `None` when no document is attached
    fn document_text(&self) -> Option<String>;

    /// Map a byte offset to a 0-indexed line number
    fn offset_to_line(&self, offset: usize) -> usize;

    /// Byte offset of the end of a line, excluding its newline
    fn line_end_offset(&self, line: usize) -> usize;

    /// Base name of the file backing the document, if any
    fn file_name(&self) -> Option<String>;

    /// Allocate a decoration that paints its ranges with `color`
    fn create_decoration(&mut self, color: Color) -> DecorationHandle;

    /// Set the ranges a decoration covers, replacing any previous set
    fn apply_decoration(&mut self, handle: DecorationHandle, ranges: &[Range<usize>]);

    /// Remove a decoration's visible effect
    fn clear_decoration(&mut self, handle: DecorationHandle) {
        self.apply_decoration(handle, &[]);
    }

    /// Drop a handle the engine will never use again
    fn release_decoration(&mut self, _handle: DecorationHandle) {}

    /// Replace the whole buffer with `text`
    async fn replace_buffer_content(&mut self, text: String) -> Result<()>;

    /// Show `content` in a side view titled `title`, reusing an open one
    async fn open_side_view(&mut self, content: String, title: String) -> Result<()>;

    /// Surface a message to the user without blocking
    fn report_error(&mut self, message: &str);
}
