use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::input::{is_ctrl, is_escape, KeyResult};
use crate::table::Explorer;

/// Search mode: edits the explorer query in place, one keystroke at a time
#[derive(Debug, Default)]
pub struct SearchHandler {
    /// Query in effect when search mode was entered; Esc restores it
    previous: String,
}

impl SearchHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_search(&mut self, explorer: &Explorer) {
        self.previous = explorer.query().to_string();
    }

    pub fn handle_key(&mut self, key: KeyEvent, explorer: &mut Explorer) -> KeyResult {
        if is_escape(key) {
            explorer.set_query(&self.previous);
            return KeyResult::Finish;
        }
        if is_ctrl(key, 'u') {
            explorer.clear_query();
            return KeyResult::Continue;
        }

        match key.code {
            KeyCode::Enter => KeyResult::Finish,
            KeyCode::Backspace => {
                explorer.pop_query_char();
                KeyResult::Continue
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                explorer.push_query_char(c);
                KeyResult::Continue
            }
            _ => KeyResult::Continue,
        }
    }

    /// Message shown when a search is committed
    pub fn summary(explorer: &Explorer) -> Option<String> {
        if explorer.query().is_empty() {
            return None;
        }
        Some(match explorer.match_count() {
            0 => format!("No matches for '{}'", explorer.query()),
            n => format!("{} matching row(s)", n),
        })
    }
}
