//! Viewer state and main loop

use tracing::debug;

use crate::display::{Display, Frame};
use crate::error::Result;
use crate::highlight::Color;
use crate::host::TerminalHost;
use crate::input::Key;
use crate::protocol::Command;
use crate::session::Session;
use crate::terminal::Terminal;
use crate::window::{Pane, Window};

/// What to do when a prompt completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    /// First step of adding a rule: the pattern
    AddPattern,
    /// Second step: the color for `pattern`
    AddColor { pattern: String },
    RemovePattern,
}

/// Minibuffer prompt state
#[derive(Debug, Clone)]
pub struct PromptState {
    /// The prompt string (e.g., "Highlight pattern")
    pub prompt: String,
    /// Current input
    pub input: String,
    /// What to do when complete
    pub action: PromptAction,
    /// Used when the input is left empty
    pub default: Option<String>,
}

impl PromptState {
    /// Label shown before the input
    fn label(&self) -> String {
        match &self.default {
            Some(def) if self.input.is_empty() => format!("{} (default {})", self.prompt, def),
            _ => self.prompt.clone(),
        }
    }
}

pub struct App {
    session: Session<TerminalHost>,
    display: Display,
    windows: Vec<Window>,
    current_window: usize,
    prompt: Option<PromptState>,
    running: bool,
}

impl App {
    pub fn new(session: Session<TerminalHost>, display: Display) -> Self {
        Self {
            session,
            display,
            windows: vec![Window::new(Pane::Main, 0, 1)],
            current_window: 0,
            prompt: None,
            running: true,
        }
    }

    /// Run the key loop until the user quits
    pub async fn run(&mut self, terminal: &mut Terminal) -> Result<()> {
        self.display.force_redraw();
        if let Some(msg) = self.session.host_mut().take_messages().pop() {
            self.display.set_message(msg);
        }

        while self.running {
            self.layout(terminal.rows());

            let label = self.prompt.as_ref().map(PromptState::label);
            let frame = Frame {
                windows: &self.windows,
                current: self.current_window,
                host: self.session.host(),
                rules: self.session.rules().list(),
                mode: self.session.view_mode(),
                prompt: label
                    .as_deref()
                    .zip(self.prompt.as_ref().map(|p| p.input.as_str())),
            };
            self.display.render(terminal, &frame)?;

            let key_event = terminal.read_key()?;
            if let Some(key) = Key::from_event(key_event) {
                if key == Key::Ctrl('l') {
                    terminal.update_size()?;
                }
                self.handle_key(key).await;
            }
        }

        Ok(())
    }

    /// Stack the windows: main on top, side view below once one exists
    fn layout(&mut self, rows: u16) {
        if self.session.host().side().is_some() && self.windows.len() == 1 {
            self.windows.push(Window::new(Pane::Side, 0, 1));
        }

        // The bottom two rows hold the rules bar and the minibuffer
        let available = rows.saturating_sub(2);
        let count = self.windows.len() as u16;
        let mut top_row = 0;
        for i in 0..self.windows.len() {
            let share = if i + 1 == self.windows.len() {
                available.saturating_sub(top_row)
            } else {
                available / count
            };
            let line_count = self.line_count(self.windows[i].pane());
            let window = &mut self.windows[i];
            window.set_geometry(top_row, share.saturating_sub(1).max(1));
            window.clamp(line_count);
            top_row += share;
        }
    }

    fn line_count(&self, pane: Pane) -> usize {
        let host = self.session.host();
        let buffer = match pane {
            Pane::Main => host.main(),
            Pane::Side => host.side(),
        };
        buffer.map_or(0, |b| b.line_count())
    }

    /// Handle a key press
    async fn handle_key(&mut self, key: Key) {
        if self.prompt.is_some() {
            return self.handle_prompt_key(key).await;
        }
        self.display.clear_message();

        match key {
            Key::Char('q') | Key::Ctrl('c') => self.running = false,
            Key::Char('a') => self.start_prompt("Highlight pattern", PromptAction::AddPattern, None),
            Key::Char('d') => self.start_prompt("Remove pattern", PromptAction::RemovePattern, None),
            Key::Char('c') => self.dispatch(Command::Clear).await,
            Key::Char('t') => {
                let command = Command::toggle_highlighted(self.session.rules().list());
                self.dispatch(command).await;
            }
            Key::Char('n') => self.display.toggle_line_numbers(),
            Key::Tab => {
                self.current_window = (self.current_window + 1) % self.windows.len();
            }
            Key::Ctrl('l') => self.display.force_redraw(),
            _ => {
                if !self.scroll(key) {
                    self.display.set_message("Key not bound");
                }
            }
        }
    }

    /// Move the current window; false if `key` is not a motion key
    fn scroll(&mut self, key: Key) -> bool {
        let line_count = self.line_count(self.windows[self.current_window].pane());
        let window = &mut self.windows[self.current_window];
        match key {
            Key::Up | Key::Char('k') => window.scroll_up(1),
            Key::Down | Key::Char('j') => window.scroll_down(1, line_count),
            Key::PageUp => window.scroll_up(window.page()),
            Key::PageDown => window.scroll_down(window.page(), line_count),
            Key::Home | Key::Char('g') => window.goto_top(),
            Key::End | Key::Char('G') => window.goto_bottom(line_count),
            _ => return false,
        }
        true
    }

    /// Start a minibuffer prompt
    fn start_prompt(&mut self, prompt: &str, action: PromptAction, default: Option<String>) {
        self.prompt = Some(PromptState {
            prompt: prompt.to_string(),
            input: String::new(),
            action,
            default,
        });
    }

    /// Handle key press during prompt mode
    async fn handle_prompt_key(&mut self, key: Key) {
        if key.is_abort() {
            self.prompt = None;
            self.display.set_message("Quit");
            return;
        }

        if key == Key::Enter {
            if let Some(prompt) = self.prompt.take() {
                let input = if prompt.input.is_empty() {
                    prompt.default.unwrap_or_default()
                } else {
                    prompt.input
                };
                self.complete_prompt(prompt.action, input).await;
            }
            return;
        }

        if let Some(prompt) = self.prompt.as_mut() {
            match key {
                Key::Backspace => {
                    prompt.input.pop();
                }
                Key::Char(ch) => prompt.input.push(ch),
                _ => {}
            }
        }
    }

    /// Complete a prompt action
    async fn complete_prompt(&mut self, action: PromptAction, input: String) {
        let default_color = self.session.default_color();
        match action {
            PromptAction::AddPattern => {
                if input.trim().is_empty() {
                    // Let the session reject it so the message is the usual one
                    let command = Command::Highlight {
                        pattern: input,
                        color: default_color,
                    };
                    return self.dispatch(command).await;
                }
                self.start_prompt(
                    "Color",
                    PromptAction::AddColor { pattern: input },
                    Some(default_color.to_string()),
                );
            }
            PromptAction::AddColor { pattern } => match input.parse::<Color>() {
                Ok(color) => self.dispatch(Command::Highlight { pattern, color }).await,
                Err(e) => self.display.set_message(e.to_string()),
            },
            PromptAction::RemovePattern => {
                let color = self
                    .session
                    .rules()
                    .get(&input)
                    .map_or(default_color, |rule| rule.color);
                let command = Command::RemoveHighlight {
                    pattern: input,
                    color,
                };
                self.dispatch(command).await;
            }
        }
    }

    /// Send a command to the session and surface whatever it reported
    async fn dispatch(&mut self, command: Command) {
        if let Err(e) = self.session.dispatch(command).await {
            debug!(error = %e, "command rejected");
        }
        // The minibuffer has room for one line, so the latest wins
        if let Some(msg) = self.session.host_mut().take_messages().pop() {
            self.display.set_message(msg);
        }
        self.display.force_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::highlight::{DocumentHost, EngineOptions, ViewMode};
    use pretty_assertions::assert_eq;

    const LOG: &str = "INFO x\nERROR y\nWARN z\nERROR WARN\n";

    fn app() -> App {
        let host = TerminalHost::new(Some(Buffer::from_text("app.log", LOG)));
        let session = Session::new(host, EngineOptions::default(), Color::Rgb(255, 0, 0));
        App::new(session, Display::new(false, 8))
    }

    async fn keys(app: &mut App, keys: &[Key]) {
        for key in keys {
            app.handle_key(*key).await;
        }
    }

    async fn type_str(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(Key::Char(ch)).await;
        }
    }

    async fn add_rule(app: &mut App, pattern: &str, color: &str) {
        app.handle_key(Key::Char('a')).await;
        type_str(app, pattern).await;
        app.handle_key(Key::Enter).await;
        type_str(app, color).await;
        app.handle_key(Key::Enter).await;
    }

    fn patterns(app: &App) -> Vec<String> {
        app.session
            .rules()
            .list()
            .iter()
            .map(|r| r.pattern.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_add_rule_with_default_color() {
        let mut app = app();
        add_rule(&mut app, "ERROR", "").await;
        assert_eq!(patterns(&app), vec!["ERROR"]);
        assert_eq!(
            app.session.rules().get("ERROR").map(|r| r.color),
            Some(Color::Rgb(255, 0, 0))
        );
        assert!(app.prompt.is_none());
    }

    #[tokio::test]
    async fn test_color_prompt_shows_default() {
        let mut app = app();
        app.handle_key(Key::Char('a')).await;
        type_str(&mut app, "WARN").await;
        app.handle_key(Key::Enter).await;
        assert_eq!(
            app.prompt.as_ref().map(PromptState::label).as_deref(),
            Some("Color (default #ff0000)")
        );
        type_str(&mut app, "yel").await;
        app.handle_key(Key::Backspace).await;
        assert_eq!(app.prompt.as_ref().map(PromptState::label).as_deref(), Some("Color"));
    }

    #[tokio::test]
    async fn test_bad_color_and_duplicate_messages() {
        let mut app = app();
        add_rule(&mut app, "ERROR", "chartreuse").await;
        assert!(patterns(&app).is_empty());
        assert_eq!(app.display.message(), Some("Invalid color: chartreuse"));

        add_rule(&mut app, "ERROR", "red").await;
        add_rule(&mut app, "ERROR", "blue").await;
        assert_eq!(
            app.display.message(),
            Some("Duplicate text. Please add unique text to the list.")
        );

        app.handle_key(Key::Char('a')).await;
        app.handle_key(Key::Enter).await;
        assert_eq!(app.display.message(), Some("Please specify the text to highlight."));
    }

    #[tokio::test]
    async fn test_abort_prompt() {
        let mut app = app();
        app.handle_key(Key::Char('a')).await;
        type_str(&mut app, "ERR").await;
        app.handle_key(Key::Ctrl('g')).await;
        assert!(app.prompt.is_none());
        assert!(patterns(&app).is_empty());
        assert_eq!(app.display.message(), Some("Quit"));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let mut app = app();
        add_rule(&mut app, "ERROR", "red").await;
        add_rule(&mut app, "WARN", "yellow").await;

        app.handle_key(Key::Char('d')).await;
        type_str(&mut app, "ERROR").await;
        app.handle_key(Key::Enter).await;
        assert_eq!(patterns(&app), vec!["WARN"]);

        app.handle_key(Key::Char('c')).await;
        assert!(patterns(&app).is_empty());
        assert!(app.session.engine().highlighted_lines().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_and_side_window() {
        let mut app = app();
        add_rule(&mut app, "ERROR", "red").await;

        app.handle_key(Key::Char('t')).await;
        assert_eq!(app.session.view_mode(), ViewMode::HighlightedOnly);
        assert_eq!(
            app.session.host().document_text().as_deref(),
            Some("2: ERROR y\n4: ERROR WARN")
        );
        assert_eq!(
            app.session.host().side().map(|b| b.name()),
            Some("app.log [highlighted #1]")
        );

        app.layout(24);
        assert_eq!(app.windows.len(), 2);
        assert_eq!(app.windows[1].pane(), Pane::Side);
        assert_eq!(app.windows[0].height() + app.windows[1].height() + 2, 22);

        app.handle_key(Key::Tab).await;
        assert_eq!(app.current_window, 1);

        app.handle_key(Key::Char('t')).await;
        assert_eq!(app.session.host().document_text().as_deref(), Some(LOG));
    }

    #[tokio::test]
    async fn test_scrolling_and_quit() {
        let mut app = app();
        app.layout(4);
        keys(&mut app, &[Key::Down, Key::Char('j'), Key::Char('j')]).await;
        assert_eq!(app.windows[0].top_line(), 3);
        keys(&mut app, &[Key::Char('k'), Key::Char('g')]).await;
        assert_eq!(app.windows[0].top_line(), 0);
        keys(&mut app, &[Key::Char('G')]).await;
        assert_eq!(app.windows[0].top_line(), 4);

        app.handle_key(Key::Char('q')).await;
        assert!(!app.running);
    }
}
