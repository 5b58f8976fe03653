use ratatui::style::{Color, Modifier, Style as RatStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::mode::Mode;

/// Color as written in a theme file
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    /// "red", "lightcyan", ...
    Named(NamedColor),
    /// [255, 128, 0]
    Rgb([u8; 3]),
    /// 256-color palette index
    Indexed(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    White,
    Reset,
}

impl From<NamedColor> for Color {
    fn from(n: NamedColor) -> Color {
        match n {
            NamedColor::Black => Color::Black,
            NamedColor::Red => Color::Red,
            NamedColor::Green => Color::Green,
            NamedColor::Yellow => Color::Yellow,
            NamedColor::Blue => Color::Blue,
            NamedColor::Magenta => Color::Magenta,
            NamedColor::Cyan => Color::Cyan,
            NamedColor::Gray => Color::Gray,
            NamedColor::DarkGray => Color::DarkGray,
            NamedColor::LightRed => Color::LightRed,
            NamedColor::LightGreen => Color::LightGreen,
            NamedColor::LightYellow => Color::LightYellow,
            NamedColor::LightBlue => Color::LightBlue,
            NamedColor::LightMagenta => Color::LightMagenta,
            NamedColor::LightCyan => Color::LightCyan,
            NamedColor::White => Color::White,
            NamedColor::Reset => Color::Reset,
        }
    }
}

impl From<ThemeColor> for Color {
    fn from(tc: ThemeColor) -> Color {
        match tc {
            ThemeColor::Named(n) => n.into(),
            ThemeColor::Rgb([r, g, b]) => Color::Rgb(r, g, b),
            ThemeColor::Indexed(i) => Color::Indexed(i),
        }
    }
}

/// Colors and modifiers for one screen element
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<ThemeColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<ThemeColor>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub dim: bool,
}

impl ElementStyle {
    pub fn fg(color: ThemeColor) -> Self {
        Self { fg: Some(color), ..Default::default() }
    }

    pub fn with_bg(mut self, color: ThemeColor) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn to_ratatui(&self) -> RatStyle {
        let mut style = RatStyle::default();
        if let Some(fg) = self.fg {
            style = style.fg(fg.into());
        }
        if let Some(bg) = self.bg {
            style = style.bg(bg.into());
        }
        let flags = [
            (self.bold, Modifier::BOLD),
            (self.italic, Modifier::ITALIC),
            (self.underline, Modifier::UNDERLINED),
            (self.dim, Modifier::DIM),
        ];
        for (on, modifier) in flags {
            if on {
                style = style.add_modifier(modifier);
            }
        }
        style
    }
}

/// A complete color scheme. Theme files may leave out fields; they fall back to the light theme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,
    pub background: Option<ThemeColor>,

    // Table body
    pub cell: ElementStyle,
    pub cell_alt: ElementStyle,
    pub row_number: ElementStyle,

    // Header row
    pub header: ElementStyle,
    pub header_selected: ElementStyle,
    pub header_sorted: ElementStyle,

    // Search bar
    pub search_prompt: ElementStyle,
    pub search_text: ElementStyle,

    // Status bar
    pub status_bar: ElementStyle,
    pub status_mode_normal: ElementStyle,
    pub status_mode_search: ElementStyle,
    pub page_info: ElementStyle,

    pub message_info: ElementStyle,
    pub message_warning: ElementStyle,
    pub message_error: ElementStyle,

    pub empty_state: ElementStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn dark() -> Self {
        use NamedColor::*;
        let c = ThemeColor::Named;
        Self {
            name: "dark".to_string(),
            background: Some(c(Black)),
            cell: ElementStyle::fg(c(White)),
            cell_alt: ElementStyle::fg(c(Gray)),
            row_number: ElementStyle::fg(c(DarkGray)),
            header: ElementStyle::fg(c(LightGreen)).with_bold(),
            header_selected: ElementStyle::fg(c(Black)).with_bg(c(LightCyan)).with_bold(),
            header_sorted: ElementStyle::fg(c(LightYellow)).with_bold(),
            search_prompt: ElementStyle::fg(c(LightCyan)).with_bold(),
            search_text: ElementStyle::fg(c(White)),
            status_bar: ElementStyle::fg(c(White)).with_bg(c(DarkGray)),
            status_mode_normal: ElementStyle::fg(c(Black)).with_bg(c(LightBlue)).with_bold(),
            status_mode_search: ElementStyle::fg(c(Black)).with_bg(c(LightYellow)).with_bold(),
            page_info: ElementStyle::fg(c(LightCyan)).with_bg(c(DarkGray)),
            message_info: ElementStyle::fg(c(White)),
            message_warning: ElementStyle::fg(c(LightYellow)),
            message_error: ElementStyle::fg(c(LightRed)).with_bold(),
            empty_state: ElementStyle::fg(c(Gray)).with_italic(),
        }
    }

    /// The default theme; leaves the terminal background alone
    pub fn light() -> Self {
        use NamedColor::*;
        let c = ThemeColor::Named;
        Self {
            name: "light".to_string(),
            background: None,
            cell: ElementStyle::fg(c(Black)),
            cell_alt: ElementStyle::fg(c(DarkGray)),
            row_number: ElementStyle::fg(c(Gray)),
            header: ElementStyle::fg(c(Blue)).with_bold(),
            header_selected: ElementStyle::fg(c(White)).with_bg(c(Blue)).with_bold(),
            header_sorted: ElementStyle::fg(c(Magenta)).with_bold().with_underline(),
            search_prompt: ElementStyle::fg(c(Blue)).with_bold(),
            search_text: ElementStyle::fg(c(Black)),
            status_bar: ElementStyle::fg(c(Black)).with_bg(c(Gray)),
            status_mode_normal: ElementStyle::fg(c(White)).with_bg(c(Blue)).with_bold(),
            status_mode_search: ElementStyle::fg(c(Black)).with_bg(c(Yellow)).with_bold(),
            page_info: ElementStyle::fg(c(Blue)).with_bg(c(Gray)),
            message_info: ElementStyle::fg(c(Black)),
            message_warning: ElementStyle::fg(c(Yellow)),
            message_error: ElementStyle::fg(c(Red)).with_bold(),
            empty_state: ElementStyle::fg(c(DarkGray)).with_italic(),
        }
    }

    pub fn solarized_dark() -> Self {
        let base03 = ThemeColor::Rgb([0, 43, 54]);
        let base02 = ThemeColor::Rgb([7, 54, 66]);
        let base01 = ThemeColor::Rgb([88, 110, 117]);
        let base0 = ThemeColor::Rgb([131, 148, 150]);
        let base1 = ThemeColor::Rgb([147, 161, 161]);
        let yellow = ThemeColor::Rgb([181, 137, 0]);
        let orange = ThemeColor::Rgb([203, 75, 22]);
        let red = ThemeColor::Rgb([220, 50, 47]);
        let blue = ThemeColor::Rgb([38, 139, 210]);
        let cyan = ThemeColor::Rgb([42, 161, 152]);

        Self {
            name: "solarized-dark".to_string(),
            background: Some(base03),
            cell: ElementStyle::fg(base0),
            cell_alt: ElementStyle::fg(base1),
            row_number: ElementStyle::fg(base01),
            header: ElementStyle::fg(cyan).with_bold(),
            header_selected: ElementStyle::fg(base03).with_bg(blue).with_bold(),
            header_sorted: ElementStyle::fg(yellow).with_bold(),
            search_prompt: ElementStyle::fg(cyan).with_bold(),
            search_text: ElementStyle::fg(base1),
            status_bar: ElementStyle::fg(base1).with_bg(base02),
            status_mode_normal: ElementStyle::fg(base03).with_bg(blue).with_bold(),
            status_mode_search: ElementStyle::fg(base03).with_bg(yellow).with_bold(),
            page_info: ElementStyle::fg(cyan).with_bg(base02),
            message_info: ElementStyle::fg(base0),
            message_warning: ElementStyle::fg(orange),
            message_error: ElementStyle::fg(red).with_bold(),
            empty_state: ElementStyle::fg(base01).with_italic(),
        }
    }

    /// Load a theme from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read theme file {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("Failed to parse theme file {}: {}", path.display(), e))
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "solarized" | "solarized-dark" => Some(Self::solarized_dark()),
            _ => None,
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["dark", "light", "solarized-dark"]
    }
}

/// Hands out ratatui styles for the active theme
pub struct Style {
    pub theme: Theme,
}

impl Style {
    pub fn with_theme(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn cell(&self, alternate: bool) -> RatStyle {
        if alternate {
            self.theme.cell_alt.to_ratatui()
        } else {
            self.theme.cell.to_ratatui()
        }
    }

    pub fn row_number(&self) -> RatStyle {
        self.theme.row_number.to_ratatui()
    }

    /// Header cell style; selection wins over the sorted highlight
    pub fn header(&self, selected: bool, sorted: bool) -> RatStyle {
        match (selected, sorted) {
            (true, _) => self.theme.header_selected.to_ratatui(),
            (false, true) => self.theme.header_sorted.to_ratatui(),
            (false, false) => self.theme.header.to_ratatui(),
        }
    }

    pub fn search_prompt(&self) -> RatStyle {
        self.theme.search_prompt.to_ratatui()
    }

    pub fn search_text(&self) -> RatStyle {
        self.theme.search_text.to_ratatui()
    }

    pub fn status_bar(&self) -> RatStyle {
        self.theme.status_bar.to_ratatui()
    }

    pub fn status_mode(&self, mode: &Mode) -> RatStyle {
        match mode {
            Mode::Normal => self.theme.status_mode_normal.to_ratatui(),
            Mode::Search => self.theme.status_mode_search.to_ratatui(),
        }
    }

    pub fn page_info(&self) -> RatStyle {
        self.theme.page_info.to_ratatui()
    }

    pub fn message_info(&self) -> RatStyle {
        self.theme.message_info.to_ratatui()
    }

    pub fn message_warning(&self) -> RatStyle {
        self.theme.message_warning.to_ratatui()
    }

    pub fn message_error(&self) -> RatStyle {
        self.theme.message_error.to_ratatui()
    }

    pub fn empty_state(&self) -> RatStyle {
        self.theme.empty_state.to_ratatui()
    }

    pub fn background(&self) -> Option<Color> {
        self.theme.background.map(|c| c.into())
    }
}
