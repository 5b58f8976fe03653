use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Action;
use crate::mode::Mode;

/// Result of handling a key event
#[derive(Debug, Clone, PartialEq)]
pub enum KeyResult {
    /// Continue in current mode
    Continue,
    /// Switch to a different mode
    SwitchMode(Mode),
    /// Run a normal-mode action
    Perform(Action),
    /// Return to normal mode
    Finish,
    Quit,
}

/// Esc or Ctrl+[
pub fn is_escape(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('[') && key.modifiers.contains(KeyModifiers::CONTROL))
}

pub fn is_ctrl(key: KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_variants() {
        assert!(is_escape(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_escape(KeyEvent::new(KeyCode::Char('['), KeyModifiers::CONTROL)));
        assert!(!is_escape(KeyEvent::new(KeyCode::Char('['), KeyModifiers::NONE)));
    }

    #[test]
    fn test_is_ctrl() {
        assert!(is_ctrl(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), 'u'));
        assert!(!is_ctrl(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::NONE), 'u'));
    }
}
