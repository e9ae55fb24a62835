//! Display rendering

use std::io::Write;

use crossterm::{
    queue,
    style::{Attribute, Print, ResetColor, SetAttribute},
};

use crate::buffer::Buffer;
use crate::error::Result;
use crate::highlight::{Rule, Span, Style, ViewMode};
use crate::host::TerminalHost;
use crate::line::{char_width, Line};
use crate::terminal::{queue_style, Terminal};
use crate::window::{Pane, Window};

/// A run of text drawn in one style
pub type Segment = (Style, String);

/// Everything one frame draws
pub struct Frame<'a> {
    pub windows: &'a [Window],
    pub current: usize,
    pub host: &'a TerminalHost,
    pub rules: &'a [Rule],
    pub mode: ViewMode,
    /// Prompt label and the input typed so far
    pub prompt: Option<(&'a str, &'a str)>,
}

/// Display state
pub struct Display {
    /// Whether a full redraw is needed
    needs_redraw: bool,
    /// Message to show in minibuffer (bottom line)
    message: Option<String>,
    /// Whether to show line numbers
    pub show_line_numbers: bool,
    /// Tab stop width
    tab_width: usize,
}

impl Display {
    pub fn new(show_line_numbers: bool, tab_width: usize) -> Self {
        Self {
            needs_redraw: true,
            message: None,
            show_line_numbers,
            tab_width,
        }
    }

    /// Toggle line numbers on/off
    pub fn toggle_line_numbers(&mut self) {
        self.show_line_numbers = !self.show_line_numbers;
        self.needs_redraw = true;
    }

    /// Mark that a full redraw is needed
    pub fn force_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Set a message to display
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    /// Clear the message
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// The message currently shown
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Render the viewer
    ///
    /// Layout from the top: each window followed by its mode line, then
    /// the rules bar, then the minibuffer.
    pub fn render(&mut self, terminal: &mut Terminal, frame: &Frame<'_>) -> Result<()> {
        let cols = terminal.cols() as usize;
        let rows = terminal.rows();

        terminal.set_cursor_visible(false)?;
        if self.needs_redraw {
            terminal.clear_screen()?;
        }

        for (i, window) in frame.windows.iter().enumerate() {
            let is_current = i == frame.current;
            self.render_window(terminal, window, frame, cols, is_current)?;
        }

        if rows >= 2 {
            terminal.move_cursor(rows - 2, 0)?;
            for (style, text) in fit_segments(rules_bar(frame.rules, frame.mode), cols) {
                terminal.apply_style(&style)?;
                terminal.write_str(&text)?;
            }
            terminal.reset_attributes()?;
            terminal.clear_to_eol()?;
        }

        self.render_minibuffer(terminal, rows.saturating_sub(1), cols, frame.prompt)?;

        terminal.flush()?;
        self.needs_redraw = false;
        Ok(())
    }

    /// Width of the line number gutter, separator included
    fn line_number_width(&self, line_count: usize) -> usize {
        if !self.show_line_numbers {
            return 0;
        }
        line_count.max(1).to_string().len().max(3) + 1
    }

    /// Render a single window
    fn render_window(
        &self,
        terminal: &mut Terminal,
        window: &Window,
        frame: &Frame<'_>,
        cols: usize,
        is_current: bool,
    ) -> Result<()> {
        let buffer = match window.pane() {
            Pane::Main => frame.host.main(),
            Pane::Side => frame.host.side(),
        };

        let top_row = window.top_row();
        let height = window.height() as usize;
        let top_line = window.top_line();

        let lnum_width = self.line_number_width(buffer.map_or(0, Buffer::line_count));
        let text_cols = cols.saturating_sub(lnum_width);

        for row_offset in 0..height {
            let screen_row = top_row + row_offset as u16;
            let line_idx = top_line + row_offset;

            terminal.move_cursor(screen_row, 0)?;

            match buffer.and_then(|b| b.line(line_idx)) {
                Some(line) => {
                    if self.show_line_numbers {
                        let lnum_str = format!("{:>width$} ", line_idx + 1, width = lnum_width - 1);
                        terminal.set_dim(true)?;
                        terminal.write_str(&lnum_str)?;
                        terminal.set_dim(false)?;
                    }

                    let spans = match window.pane() {
                        Pane::Main => frame.host.spans_for_line(line_idx),
                        Pane::Side => Vec::new(),
                    };
                    for (style, text) in layout_line(line, &spans, Some(text_cols), self.tab_width) {
                        terminal.apply_style(&style)?;
                        terminal.write_str(&text)?;
                    }
                    terminal.reset_attributes()?;
                }
                None => {
                    // Past the end of the buffer (like vim's ~)
                    terminal.set_dim(true)?;
                    terminal.write_char('~')?;
                    terminal.set_dim(false)?;
                }
            }

            terminal.clear_to_eol()?;
        }

        let label = match window.pane() {
            Pane::Main => frame.mode.to_string(),
            Pane::Side => "read-only".to_string(),
        };
        let mode_line = mode_line(buffer, &label, top_line, is_current, cols);
        terminal.move_cursor(top_row + height as u16, 0)?;
        terminal.apply_style(&Style::reverse())?;
        terminal.write_str(&mode_line)?;
        terminal.reset_attributes()?;

        Ok(())
    }

    /// Render the minibuffer: the prompt while one is active, else the message
    fn render_minibuffer(
        &self,
        terminal: &mut Terminal,
        row: u16,
        cols: usize,
        prompt: Option<(&str, &str)>,
    ) -> Result<()> {
        terminal.move_cursor(row, 0)?;

        match prompt {
            Some((label, input)) => {
                let text = truncate_to_width(&format!("{}: {}", label, input), cols);
                terminal.write_str(&text)?;
                terminal.clear_to_eol()?;
                let col = Line::from(text).display_width(self.tab_width);
                terminal.move_cursor(row, col.min(cols.saturating_sub(1)) as u16)?;
                terminal.set_cursor_visible(true)?;
            }
            None => {
                if let Some(msg) = self.message() {
                    terminal.write_str(&truncate_to_width(msg, cols))?;
                }
                terminal.clear_to_eol()?;
            }
        }
        Ok(())
    }
}

/// Build the mode line for a window, padded or truncated to `cols`
fn mode_line(
    buffer: Option<&Buffer>,
    label: &str,
    top_line: usize,
    is_current: bool,
    cols: usize,
) -> String {
    let indicator = if is_current { "=" } else { "-" };
    let line = match buffer {
        Some(buffer) => {
            let filename = buffer
                .filename()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| "no file".to_string());
            let line_count = buffer.line_count();
            let top = top_line + 1;
            let percent = if line_count <= 1 {
                "All".to_string()
            } else if top == 1 {
                "Top".to_string()
            } else if top >= line_count {
                "Bot".to_string()
            } else {
                format!("{}%", top * 100 / line_count)
            };
            let ro = if buffer.is_read_only() { "%%" } else { "--" };
            format!(
                "{}{} logmark: {} ({}) [{}] L{} {} ",
                ro,
                indicator,
                buffer.name(),
                filename,
                label,
                top,
                percent
            )
        }
        None => format!("--{} logmark: no document ", indicator),
    };

    let width = Line::from(line.as_str()).display_width(1);
    if width < cols {
        format!("{}{}", line, "-".repeat(cols - width))
    } else {
        truncate_to_width(&line, cols)
    }
}

/// Rules bar: every rule in its own color, then the toggle hint
pub fn rules_bar(rules: &[Rule], mode: ViewMode) -> Vec<Segment> {
    let mut segments = vec![(Style::default().with_bold(), "Rules:".to_string())];
    if rules.is_empty() {
        segments.push((Style::default(), " (none, a to add)".to_string()));
    }
    for rule in rules {
        segments.push((Style::default(), " ".to_string()));
        segments.push((Style::highlight(rule.color), format!(" {} ", rule.pattern)));
    }
    segments.push((Style::default(), format!("   t: {}", mode.toggle_label())));
    segments
}

/// Cut segments off at `cols` display columns
fn fit_segments(segments: Vec<Segment>, cols: usize) -> Vec<Segment> {
    let mut remaining = cols;
    let mut fitted = Vec::new();
    for (style, text) in segments {
        if remaining == 0 {
            break;
        }
        let text = truncate_to_width(&text, remaining);
        remaining -= Line::from(text.as_str()).display_width(1);
        fitted.push((style, text));
    }
    fitted
}

/// Split a line into styled runs for drawing
///
/// Where spans overlap the last one wins. Tabs are expanded to spaces.
/// With `max_cols` set, a line too wide to fit is cut one column short
/// and ends in `$`.
pub fn layout_line(
    line: &Line,
    spans: &[Span],
    max_cols: Option<usize>,
    tab_width: usize,
) -> Vec<Segment> {
    let mut limit = usize::MAX;
    let mut truncated = false;
    if let Some(max) = max_cols {
        if max == 0 {
            return Vec::new();
        }
        if line.display_width(tab_width) > max {
            truncated = true;
            limit = max - 1;
        }
    }

    let mut segments: Vec<Segment> = Vec::new();
    let mut col = 0;
    for (idx, ch) in line.text().char_indices() {
        let style = spans
            .iter()
            .rev()
            .find(|span| span.contains(idx))
            .map(|span| span.style)
            .unwrap_or_default();
        let width = char_width(ch, col, tab_width);
        if col + width > limit {
            break;
        }
        col += width;

        if !matches!(segments.last(), Some((last, _)) if *last == style) {
            segments.push((style, String::new()));
        }
        if let Some((_, text)) = segments.last_mut() {
            push_char(text, ch, width);
        }
    }

    if truncated {
        segments.push((Style::default(), "$".to_string()));
    }
    segments
}

fn push_char(text: &mut String, ch: char, width: usize) {
    if ch == '\t' {
        text.extend(std::iter::repeat(' ').take(width));
    } else {
        text.push(ch);
    }
}

/// Write the main buffer with its highlights to `out`, for `--print`
///
/// Without `color` the output is plain text with tabs expanded.
pub fn print_document<W: Write>(
    out: &mut W,
    host: &TerminalHost,
    tab_width: usize,
    show_line_numbers: bool,
    color: bool,
) -> Result<()> {
    let Some(buffer) = host.main() else {
        return Ok(());
    };
    let count = buffer.line_count();
    let width = count.to_string().len();

    for (idx, line) in buffer.lines().iter().enumerate() {
        // The split after a trailing newline is not a line of its own
        if idx + 1 == count && line.is_empty() && count > 1 {
            break;
        }
        if show_line_numbers {
            queue!(out, Print(format!("{:>width$} ", idx + 1, width = width)))?;
        }
        let spans = host.spans_for_line(idx);
        for (style, text) in layout_line(line, &spans, None, tab_width) {
            if color && !style.is_default() {
                queue_style(out, &style)?;
                queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
            } else {
                queue!(out, Print(text))?;
            }
        }
        if idx + 1 < count {
            queue!(out, Print('\n'))?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Truncate a string to fit within a display width
fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = char_width(ch, width, 1);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result
}
