//! Window representation - a viewport into the main or side buffer

/// Which buffer a window shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    /// The document being highlighted
    Main,
    /// The read-only highlighted-only side view
    Side,
}

/// A window displaying a portion of a buffer
#[derive(Debug)]
pub struct Window {
    /// Buffer being displayed
    pane: Pane,
    /// First visible line in the window
    top_line: usize,
    /// Row on screen where window starts
    top_row: u16,
    /// Number of text rows in window (excluding mode line)
    height: u16,
}

impl Window {
    /// Create a new window for a pane
    pub fn new(pane: Pane, top_row: u16, height: u16) -> Self {
        Self {
            pane,
            top_line: 0,
            top_row,
            height,
        }
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    /// Get the top visible line
    pub fn top_line(&self) -> usize {
        self.top_line
    }

    /// Get top row on screen
    pub fn top_row(&self) -> u16 {
        self.top_row
    }

    /// Get window height in rows
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Place the window on screen
    pub fn set_geometry(&mut self, top_row: u16, height: u16) {
        self.top_row = top_row;
        self.height = height;
    }

    /// Rows scrolled by PageUp / PageDown
    pub fn page(&self) -> usize {
        (self.height as usize).saturating_sub(2).max(1)
    }

    /// Scroll down by n lines, keeping at least the last line on screen
    pub fn scroll_down(&mut self, n: usize, line_count: usize) {
        let new_top = self.top_line.saturating_add(n);
        self.top_line = new_top.min(line_count.saturating_sub(1));
    }

    /// Scroll up by n lines
    pub fn scroll_up(&mut self, n: usize) {
        self.top_line = self.top_line.saturating_sub(n);
    }

    /// Jump to the first line
    pub fn goto_top(&mut self) {
        self.top_line = 0;
    }

    /// Jump so the last page of the buffer fills the window
    pub fn goto_bottom(&mut self, line_count: usize) {
        self.top_line = line_count.saturating_sub(self.height as usize);
    }

    /// Pull the window back in range after the buffer shrank
    pub fn clamp(&mut self, line_count: usize) {
        self.top_line = self.top_line.min(line_count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrolling() {
        let mut window = Window::new(Pane::Main, 0, 10);
        window.scroll_down(5, 100);
        assert_eq!(window.top_line(), 5);
        window.scroll_down(500, 100);
        assert_eq!(window.top_line(), 99);
        window.scroll_up(3);
        assert_eq!(window.top_line(), 96);
        window.scroll_up(500);
        assert_eq!(window.top_line(), 0);
    }

    #[test]
    fn test_top_and_bottom() {
        let mut window = Window::new(Pane::Side, 0, 10);
        window.goto_bottom(25);
        assert_eq!(window.top_line(), 15);
        window.goto_bottom(4);
        assert_eq!(window.top_line(), 0);
        window.scroll_down(3, 25);
        window.goto_top();
        assert_eq!(window.top_line(), 0);
        assert_eq!(window.pane(), Pane::Side);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut window = Window::new(Pane::Main, 0, 10);
        window.scroll_down(40, 100);
        window.clamp(3);
        assert_eq!(window.top_line(), 2);
        window.clamp(0);
        assert_eq!(window.top_line(), 0);
    }

    #[test]
    fn test_geometry_and_page() {
        let mut window = Window::new(Pane::Main, 0, 10);
        assert_eq!(window.page(), 8);
        window.set_geometry(12, 1);
        assert_eq!(window.top_row(), 12);
        assert_eq!(window.height(), 1);
        assert_eq!(window.page(), 1);
    }
}
