//! Buffer representation - a collection of lines with associated metadata

use std::path::{Path, PathBuf};

use crate::highlight::LineMap;
use crate::line::Line;

/// A buffer containing text and metadata
///
/// Text is split on `'\n'` only, so [`Buffer::text`] gives back exactly
/// what was loaded, trailing newline and `\r` included.
#[derive(Debug)]
pub struct Buffer {
    /// Lines of text
    lines: Vec<Line>,
    /// Byte offsets of line starts in the joined text
    line_map: LineMap,
    /// Buffer name (e.g., "app.log", "app.log [highlighted #1]")
    name: String,
    /// Associated file path (None for unnamed buffers)
    filename: Option<PathBuf>,
    /// Read-only view (side views)
    read_only: bool,
}

impl Buffer {
    /// Create a buffer holding `text`
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let mut buffer = Self {
            lines: Vec::new(),
            line_map: LineMap::default(),
            name: name.into(),
            filename: None,
            read_only: false,
        };
        buffer.set_text(text);
        buffer
    }

    /// Create a buffer from file contents
    ///
    /// Invalid UTF-8 is replaced with U+FFFD rather than rejected.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        let mut buffer = Self::from_text(name, &content);
        buffer.filename = Some(path.to_path_buf());
        Ok(buffer)
    }

    /// Get buffer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the buffer
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get filename if set
    pub fn filename(&self) -> Option<&PathBuf> {
        self.filename.as_ref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Get number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    /// Get all lines
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The whole buffer as one string
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the whole buffer
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(Line::from).collect();
        self.line_map = LineMap::new(text);
    }

    /// Line containing a byte offset of [`Buffer::text`]
    pub fn offset_to_line(&self, offset: usize) -> usize {
        self.line_map.offset_to_line(offset)
    }

    /// Byte offset where a line starts
    pub fn line_start_offset(&self, line: usize) -> usize {
        self.line_map.line_start_offset(line)
    }

    /// Byte offset where a line ends, excluding its newline
    pub fn line_end_offset(&self, line: usize) -> usize {
        self.line_map.line_end_offset(line)
    }
}
