//! Colors and styled spans
//!
//! Rule colors arrive either as ANSI color names or as the `#rrggbb`
//! strings a color picker produces. Both are kept as [`Color`] so a host
//! can render them however its surface allows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HighlightError;

/// Highlight colors (ANSI 16-color palette plus 24-bit RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb(u8, u8, u8),
}

const NAMED: [(&str, Color); 17] = [
    ("default", Color::Default),
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("bright-black", Color::BrightBlack),
    ("bright-red", Color::BrightRed),
    ("bright-green", Color::BrightGreen),
    ("bright-yellow", Color::BrightYellow),
    ("bright-blue", Color::BrightBlue),
    ("bright-magenta", Color::BrightMagenta),
    ("bright-cyan", Color::BrightCyan),
    ("bright-white", Color::BrightWhite),
];

impl Color {
    /// Parse `#rrggbb` or the short `#rgb` form
    fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Color::Rgb(r, g, b))
            }
            3 => {
                let mut channels = digits.chars().map(|c| {
                    let v = c.to_digit(16).unwrap_or(0) as u8;
                    v * 16 + v
                });
                Some(Color::Rgb(channels.next()?, channels.next()?, channels.next()?))
            }
            _ => None,
        }
    }

    /// Whether text drawn on this background reads better in black
    pub fn is_light(&self) -> bool {
        match self {
            Color::Rgb(r, g, b) => {
                // ITU-R BT.601 luma
                let luma = 299 * *r as u32 + 587 * *g as u32 + 114 * *b as u32;
                luma > 150_000
            }
            Color::Yellow
            | Color::White
            | Color::Cyan
            | Color::Green
            | Color::BrightYellow
            | Color::BrightWhite
            | Color::BrightCyan
            | Color::BrightGreen => true,
            _ => false,
        }
    }
}

impl FromStr for Color {
    type Err = HighlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            return Color::from_hex(s)
                .ok_or_else(|| HighlightError::Message(format!("Invalid color: {}", s)));
        }
        let name = s.to_lowercase().replace(['_', ' '], "-");
        let name = match name.strip_prefix("bright") {
            Some(rest) if !rest.starts_with('-') => format!("bright-{}", rest),
            _ => name,
        };
        NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| *c)
            .ok_or_else(|| HighlightError::Message(format!("Invalid color: {}", s)))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Rgb(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
            named => {
                let name = NAMED
                    .iter()
                    .find(|(_, c)| c == named)
                    .map(|(n, _)| *n)
                    .unwrap_or("default");
                f.write_str(name)
            }
        }
    }
}

impl TryFrom<String> for Color {
    type Error = HighlightError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Bold text
    pub bold: bool,
    /// Reverse video (swap fg/bg)
    pub reverse: bool,
}

impl Style {
    /// Create a style with just background color
    pub fn bg(color: Color) -> Self {
        Self {
            bg: color,
            ..Default::default()
        }
    }

    /// Background highlight with a readable foreground
    pub fn highlight(color: Color) -> Self {
        let fg = if color.is_light() { Color::Black } else { Color::Default };
        Self::bg(color).with_fg(fg)
    }

    /// Create a reverse video style (for the mode line)
    pub fn reverse() -> Self {
        Self {
            reverse: true,
            ..Default::default()
        }
    }

    /// Builder: set foreground color
    pub fn with_fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A styled span of text within a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where this span starts (inclusive)
    pub start: usize,
    /// Byte offset where this span ends (exclusive)
    pub end: usize,
    /// Style to apply to this span
    pub style: Style,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, style: Style) -> Self {
        Self { start, end, style }
    }

    /// Check if this span contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}
