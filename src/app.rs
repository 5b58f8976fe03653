use std::io;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, error, info};

use crate::config::{Action, AppConfig, KeyMap};
use crate::fileio::{self, FileIO, LoadResult};
use crate::input::KeyResult;
use crate::mode::normal::NormalHandler;
use crate::mode::search::SearchHandler;
use crate::mode::Mode;
use crate::style::Style;
use crate::table::{Explorer, ExportFormat};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// One line of feedback under the status bar; cleared by the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

pub struct App {
    pub explorer: Explorer,
    pub file_io: FileIO,
    pub config: AppConfig,
    pub style: Style,
    pub mode: Mode,
    /// Column the sort keys act on
    pub selected_col: usize,
    pub message: Option<Message>,
    pub should_quit: bool,
    /// Terminal size at the last draw, for mouse hit-testing
    pub viewport: Rect,
    normal_handler: NormalHandler,
    search_handler: SearchHandler,
}

impl App {
    pub fn new(load: LoadResult, file_io: FileIO, config: AppConfig) -> Self {
        let explorer = Explorer::new(load.table, config.page_size);
        let style = Style::with_theme(config.theme.clone());
        let normal_handler = NormalHandler::new(config.keys.clone());

        let mut app = Self {
            explorer,
            file_io,
            config,
            style,
            mode: Mode::Normal,
            selected_col: 0,
            message: None,
            should_quit: false,
            viewport: Rect::default(),
            normal_handler,
            search_handler: SearchHandler::new(),
        };
        if !load.warnings.is_empty() {
            app.warn(load.warnings.join("; "));
        }
        app
    }

    pub fn keys(&self) -> &KeyMap {
        self.normal_handler.keys()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.message = Some(Message { level: Level::Info, text: text.into() });
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.message = Some(Message { level: Level::Warning, text: text.into() });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.message = Some(Message { level: Level::Error, text: text.into() });
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            self.viewport = terminal.size()?;
            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => {
                        self.message = None;
                        self.handle_key(key);
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let result = match self.mode {
            Mode::Normal => self.normal_handler.handle_key(key),
            Mode::Search => self.search_handler.handle_key(key, &mut self.explorer),
        };
        self.process_key_result(result);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(col) = ui::header_column_at(self, self.viewport, mouse.column, mouse.row) {
            self.message = None;
            self.selected_col = col;
            self.toggle_sort_at(col);
        }
    }

    fn process_key_result(&mut self, result: KeyResult) {
        match result {
            KeyResult::Continue => {}
            KeyResult::SwitchMode(mode) => {
                if mode == Mode::Search {
                    self.search_handler.start_search(&self.explorer);
                }
                self.mode = mode;
            }
            KeyResult::Finish => {
                if self.mode == Mode::Search {
                    if let Some(summary) = SearchHandler::summary(&self.explorer) {
                        self.info(summary);
                    }
                }
                self.mode = Mode::Normal;
            }
            KeyResult::Perform(action) => self.perform(action),
            KeyResult::Quit => self.should_quit = true,
        }
    }

    pub fn perform(&mut self, action: Action) {
        let col_count = self.explorer.table().col_count();

        match action {
            Action::Search => self.process_key_result(KeyResult::SwitchMode(Mode::Search)),
            Action::Quit => self.should_quit = true,
            Action::ColumnLeft => self.selected_col = self.selected_col.saturating_sub(1),
            Action::ColumnRight => {
                self.selected_col = (self.selected_col + 1).min(col_count.saturating_sub(1));
            }
            Action::ToggleSort => self.toggle_sort_at(self.selected_col),
            Action::SortColumn(col) => {
                if col < col_count {
                    self.selected_col = col;
                    self.toggle_sort_at(col);
                } else {
                    self.warn(format!("No column {}", col + 1));
                }
            }
            Action::ClearSort => {
                self.explorer.clear_sort();
                self.info("Sort cleared");
            }
            Action::NextPage => self.explorer.next_page(),
            Action::PrevPage => self.explorer.prev_page(),
            Action::FirstPage => self.explorer.first_page(),
            Action::LastPage => self.explorer.last_page(),
            Action::CyclePageSize => {
                self.explorer.cycle_page_size();
                self.info(format!("{} rows per page", self.explorer.page_state().page_size));
            }
            Action::ExportDelimited => self.export(ExportFormat::Delimited),
            Action::ExportRecords => self.export(ExportFormat::Records),
            Action::Reload => self.reload(),
        }
    }

    fn toggle_sort_at(&mut self, col: usize) {
        self.explorer.toggle_sort_at(col);
        debug!(sort = %self.explorer.sort(), "Sort changed");
        self.info(format!("Sort: {}", self.explorer.sort()));
    }

    fn export(&mut self, format: ExportFormat) {
        let payload = match self.explorer.export(format, self.config.export_delimiter) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                self.info("Nothing to export");
                return;
            }
            Err(e) => {
                error!(error = %e, "Export failed");
                self.error(format!("Export failed: {}", e));
                return;
            }
        };

        match fileio::save_export(&payload, &self.config.export_dir) {
            Ok(path) => {
                info!(path = %path.display(), rows = self.explorer.match_count(), mime = payload.mime_type, "Exported view");
                self.info(format!("Exported {} rows to {}", self.explorer.match_count(), path.display()));
            }
            Err(e) => {
                error!(error = %e, dir = %self.config.export_dir.display(), "Failed to write export");
                self.error(format!("Export failed: {}", e));
            }
        }
    }

    /// Re-read the file; on failure the current table stays
    fn reload(&mut self) {
        match self.file_io.load_table() {
            Ok(load) => {
                let rows = load.table.row_count();
                self.explorer.load(load.table);
                self.selected_col = 0;
                if load.warnings.is_empty() {
                    self.info(format!("Reloaded {} ({} rows)", self.file_io.file_name(), rows));
                } else {
                    self.warn(format!("Reloaded with warnings: {}", load.warnings.join("; ")));
                }
            }
            Err(e) => {
                error!(error = %e, path = %self.file_io.file_path.display(), "Reload failed");
                self.error(format!("Reload failed: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::io::Write;
    use std::path::PathBuf;

    use crate::table::SortState;

    const PEOPLE: &str = "name,age\nBob,30\nAmy,9\nSam,41\n";

    fn app_for(content: &str, export_dir: PathBuf) -> (App, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();

        let file_io = FileIO::new(file.path().to_path_buf(), None).unwrap();
        let load = file_io.load_table().unwrap();
        let config = AppConfig { export_dir, ..AppConfig::default() };
        (App::new(load, file_io, config), file)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn first_names(app: &App) -> Vec<String> {
        app.explorer.visible_rows().iter().map(|r| r.get(0).to_string()).collect()
    }

    #[test]
    fn test_search_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _file) = app_for(PEOPLE, dir.path().to_path_buf());

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, Mode::Search);
        type_str(&mut app, "am");
        assert_eq!(first_names(&app), vec!["Amy", "Sam"]);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.message.as_ref().map(|m| m.text.as_str()), Some("2 matching row(s)"));
    }

    #[test]
    fn test_sort_keys() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _file) = app_for(PEOPLE, dir.path().to_path_buf());

        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.selected_col, 1);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(first_names(&app), vec!["Amy", "Bob", "Sam"]);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.explorer.sort(), &SortState::Descending("age".to_string()));

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.explorer.sort(), &SortState::Unsorted);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.selected_col, 0);
        assert_eq!(app.explorer.sort(), &SortState::Ascending("name".to_string()));

        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.message.as_ref().map(|m| m.level), Some(Level::Warning));
    }

    #[test]
    fn test_column_selection_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _file) = app_for(PEOPLE, dir.path().to_path_buf());

        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.selected_col, 0);
        type_str(&mut app, "lll");
        assert_eq!(app.selected_col, 1);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _file) = app_for(PEOPLE, dir.path().to_path_buf());

        type_str(&mut app, "2");
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('E'));

        let first = std::fs::read_to_string(dir.path().join("data.csv")).unwrap();
        assert_eq!(first, "name,age\n\"Amy\",\"9\"\n\"Bob\",\"30\"\n\"Sam\",\"41\"");
        assert!(dir.path().join("data-1.csv").exists());

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("data.json")).unwrap()).unwrap();
        assert_eq!(json[0]["name"], "Amy");
        assert_eq!(json.as_array().map(|a| a.len()), Some(3));
    }

    #[test]
    fn test_export_empty_view_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _file) = app_for(PEOPLE, dir.path().to_path_buf());

        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "nobody");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.explorer.query(), "");

        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "nobody");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('e'));

        assert_eq!(app.message.as_ref().map(|m| m.text.as_str()), Some("Nothing to export"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_reload_picks_up_changes_and_resets_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, file) = app_for(PEOPLE, dir.path().to_path_buf());

        press(&mut app, KeyCode::Char('s'));
        std::fs::write(file.path(), "name,age\nZed,1\n").unwrap();
        press(&mut app, KeyCode::Char('r'));

        assert_eq!(first_names(&app), vec!["Zed"]);
        assert_eq!(app.explorer.sort(), &SortState::Unsorted);
        assert_eq!(app.message.as_ref().map(|m| m.level), Some(Level::Info));
    }

    #[test]
    fn test_failed_reload_keeps_table() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, file) = app_for(PEOPLE, dir.path().to_path_buf());

        std::fs::write(file.path(), "").unwrap();
        press(&mut app, KeyCode::Char('r'));

        assert_eq!(first_names(&app), vec!["Bob", "Amy", "Sam"]);
        assert_eq!(app.message.as_ref().map(|m| m.level), Some(Level::Error));
    }

    #[test]
    fn test_paging_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::from("n\n");
        for i in 0..120 {
            content.push_str(&format!("{}\n", i));
        }
        let (mut app, _file) = app_for(&content, dir.path().to_path_buf());
        assert_eq!(app.explorer.page_info().total_pages, 3);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.explorer.page_state().current_page, 2);
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.explorer.page_state().current_page, 3);
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.explorer.page_state().current_page, 2);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.explorer.page_state().current_page, 1);

        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.explorer.page_info().total_pages, 2);
    }

    #[test]
    fn test_header_click_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _file) = app_for(PEOPLE, dir.path().to_path_buf());
        app.viewport = Rect::new(0, 0, 80, 24);

        // search bar on row 0, table border on row 1, header on row 2; gutter is 3 wide
        let click = |column| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };

        app.handle_mouse(click(2));
        assert_eq!(app.explorer.sort(), &SortState::Unsorted);

        app.handle_mouse(click(5));
        assert_eq!(app.explorer.sort(), &SortState::Ascending("name".to_string()));

        // "name ▲" is 6 wide, so "age" starts at 1 + 3 + 1 + 6 + 1
        app.handle_mouse(click(13));
        assert_eq!(app.selected_col, 1);
        assert_eq!(app.explorer.sort(), &SortState::Ascending("age".to_string()));
    }

    #[test]
    fn test_quit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _file) = app_for(PEOPLE, dir.path().to_path_buf());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
