use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::{Action, KeyMap};
use crate::input::{is_ctrl, KeyResult};
use crate::mode::Mode;

/// Normal mode: translates keys into actions through the configured key map
pub struct NormalHandler {
    keys: KeyMap,
}

impl NormalHandler {
    pub fn new(keys: KeyMap) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &KeyMap {
        &self.keys
    }

    pub fn handle_key(&self, key: KeyEvent) -> KeyResult {
        if is_ctrl(key, 'c') {
            return KeyResult::Quit;
        }

        let action = match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                match self.keys.get(c) {
                    Some(action) => action,
                    None => return KeyResult::Continue,
                }
            }
            KeyCode::Left => Action::ColumnLeft,
            KeyCode::Right => Action::ColumnRight,
            KeyCode::Enter => Action::ToggleSort,
            KeyCode::PageDown => Action::NextPage,
            KeyCode::PageUp => Action::PrevPage,
            KeyCode::Home => Action::FirstPage,
            KeyCode::End => Action::LastPage,
            _ => return KeyResult::Continue,
        };

        match action {
            Action::Search => KeyResult::SwitchMode(Mode::Search),
            Action::Quit => KeyResult::Quit,
            other => KeyResult::Perform(other),
        }
    }
}
