//! Line representation and display-width helpers

use unicode_width::UnicodeWidthChar;

/// A single line of text in a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// The text content (without trailing newline)
    text: String,
}

impl Line {
    /// Get the text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if the line is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Display cells taken by the line, expanding tabs to `tab_width` stops
    pub fn display_width(&self, tab_width: usize) -> usize {
        self.text
            .chars()
            .fold(0, |col, ch| col + char_width(ch, col, tab_width))
    }
}

/// Display cells for `ch` when drawn at column `col`
pub fn char_width(ch: char, col: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - col % tab_width
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(1)
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self {
            text: s.to_string(),
        }
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Self { text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_line() {
        let line = Line::from("Hello");
        assert_eq!(line.text(), "Hello");
        assert!(!line.is_empty());
        assert!(Line::default().is_empty());
    }

    #[test]
    fn test_display_width_wide_chars() {
        assert_eq!(Line::from("你好").display_width(8), 4);
        assert_eq!(Line::from("Hello 😀").display_width(8), 8);
    }

    #[test]
    fn test_tabs_expand_to_stops() {
        assert_eq!(Line::from("\tx").display_width(4), 5);
        assert_eq!(Line::from("ab\tx").display_width(4), 5);
        assert_eq!(Line::from("abcd\tx").display_width(4), 9);
        assert_eq!(char_width('\t', 3, 0), 1);
    }
}
