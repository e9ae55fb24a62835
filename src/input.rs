//! Input handling - key reading and translation

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A key press the viewer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// Control chord, stored lowercase (C-g is `Ctrl('g')`)
    Ctrl(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

impl Key {
    /// Translate a crossterm KeyEvent
    ///
    /// Only press events count; Windows also delivers release and repeat.
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        let KeyEvent {
            code, modifiers, kind, ..
        } = event;

        if kind != KeyEventKind::Press {
            return None;
        }

        let key = match code {
            KeyCode::Char(ch) if modifiers.contains(KeyModifiers::CONTROL) => {
                Key::Ctrl(ch.to_ascii_lowercase())
            }
            KeyCode::Char(ch) => Key::Char(ch),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            _ => return None,
        };
        Some(key)
    }

    /// Whether this key aborts a prompt (C-g or Esc)
    pub fn is_abort(&self) -> bool {
        matches!(self, Key::Esc | Key::Ctrl('g'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
        Key::from_event(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_plain_and_control_chars() {
        assert_eq!(press(KeyCode::Char('a'), KeyModifiers::NONE), Some(Key::Char('a')));
        assert_eq!(press(KeyCode::Char('G'), KeyModifiers::SHIFT), Some(Key::Char('G')));
        assert_eq!(
            press(KeyCode::Char('C'), KeyModifiers::CONTROL),
            Some(Key::Ctrl('c'))
        );
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(press(KeyCode::PageDown, KeyModifiers::NONE), Some(Key::PageDown));
        assert_eq!(press(KeyCode::Tab, KeyModifiers::NONE), Some(Key::Tab));
        assert_eq!(press(KeyCode::F(1), KeyModifiers::NONE), None);
    }

    #[test]
    fn test_release_is_ignored() {
        let event = KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(Key::from_event(event), None);
    }

    #[test]
    fn test_abort_keys() {
        assert!(Key::Esc.is_abort());
        assert!(Key::Ctrl('g').is_abort());
        assert!(!Key::Char('g').is_abort());
    }
}
