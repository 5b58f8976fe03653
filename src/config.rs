use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::style::Theme;
use crate::table::PageSize;

/// Everything a key press in normal mode can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Search,
    ColumnLeft,
    ColumnRight,
    ToggleSort,
    ClearSort,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    CyclePageSize,
    ExportDelimited,
    ExportRecords,
    Reload,
    Quit,
    /// Toggle sort on the n-th column (0-based); bound to the digit keys
    #[serde(skip)]
    SortColumn(usize),
}

/// Character -> action bindings for normal mode
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMap {
    map: HashMap<char, Action>,
}

impl KeyMap {
    pub fn get(&self, c: char) -> Option<Action> {
        if let Some(action) = self.map.get(&c) {
            return Some(*action);
        }

        // digits fall through to "sort by the n-th column"
        match c.to_digit(10) {
            Some(d) if d > 0 => Some(Action::SortColumn(d as usize - 1)),
            _ => None,
        }
    }

    pub fn bind(&mut self, c: char, action: Action) {
        self.map.insert(c, action);
    }

    /// First key bound to `action`, for help text
    pub fn key_for(&self, action: Action) -> Option<char> {
        let mut keys: Vec<char> = self.map.iter().filter(|(_, a)| **a == action).map(|(c, _)| *c).collect();
        keys.sort_unstable();
        keys.first().copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            map: HashMap::from([
                ('/', Action::Search),
                ('h', Action::ColumnLeft),
                ('l', Action::ColumnRight),
                ('s', Action::ToggleSort),
                ('x', Action::ClearSort),
                ('n', Action::NextPage),
                ('p', Action::PrevPage),
                ('g', Action::FirstPage),
                ('G', Action::LastPage),
                ('z', Action::CyclePageSize),
                ('e', Action::ExportDelimited),
                ('E', Action::ExportRecords),
                ('r', Action::Reload),
                ('q', Action::Quit),
            ]),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, io::Error),
    Parse(PathBuf, toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read config {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "Failed to parse config {}: {}", path.display(), e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The config file as written on disk; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    page_size: Option<PageSize>,
    export_dir: Option<PathBuf>,
    export_delimiter: Option<String>,
    theme: Option<String>,
    theme_file: Option<PathBuf>,
    keys: HashMap<String, Action>,
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub page_size: PageSize,
    pub export_dir: PathBuf,
    pub export_delimiter: u8,
    pub theme: Theme,
    pub keys: KeyMap,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            export_dir: PathBuf::from("."),
            export_delimiter: b',',
            theme: Theme::default(),
            keys: KeyMap::default(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or from the default location when it exists.
    /// No file at the default location means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path, inner),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        let mut config = Self::default();

        if let Some(size) = file.page_size {
            config.page_size = size;
        }
        if let Some(dir) = file.export_dir {
            config.export_dir = dir;
        }
        if let Some(delim) = file.export_delimiter {
            config.export_delimiter = parse_delimiter(&delim)
                .ok_or_else(|| ConfigError::Invalid(format!("export_delimiter '{}'", delim)))?;
        }
        if let Some(path) = file.theme_file {
            config.theme = Theme::from_file(&path).map_err(ConfigError::Invalid)?;
        } else if let Some(name) = file.theme {
            config.theme = Theme::by_name(&name)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown theme '{}' (built-in: {})", name, Theme::builtin_names().join(", "))))?;
        }
        for (key, action) in file.keys {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => config.keys.bind(c, action),
                _ => return Err(ConfigError::Invalid(format!("key '{}' must be a single character", key))),
            }
        }

        Ok(config)
    }
}

/// `$XDG_CONFIG_HOME/tabscope/config.toml`, falling back to `~/.config`
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("tabscope").join("config.toml"))
}

/// Parse a delimiter name or single character into a byte
pub fn parse_delimiter(s: &str) -> Option<u8> {
    match s.to_lowercase().as_str() {
        "comma" | "," => Some(b','),
        "tab" | "\\t" | "\t" => Some(b'\t'),
        "semicolon" | ";" => Some(b';'),
        "pipe" | "|" => Some(b'|'),
        _ if s.len() == 1 && s.as_bytes()[0] != b'"' && s.as_bytes()[0] != b'\n' => Some(s.as_bytes()[0]),
        _ => None,
    }
}
