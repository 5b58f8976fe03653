use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::table::table::{dedup_headers, Row, Table};
use crate::table::ExportPayload;

/// Candidate delimiters for sniffing, in tie-break order
const SNIFF_DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Detected file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Csv,
    Tsv,
    /// Delimited text with an unspecific extension (`.txt`); delimiter is sniffed
    Text,
}

impl FileFormat {
    /// Detect format from file extension
    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            "txt" => Some(FileFormat::Text),
            _ => None,
        }
    }

    /// Get the delimiter implied by the format, if any
    fn delimiter(&self) -> Option<u8> {
        match self {
            FileFormat::Csv => Some(b','),
            FileFormat::Tsv => Some(b'\t'),
            FileFormat::Text => None,
        }
    }
}

/// Why a file could not be turned into a table
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Parse { line: Option<u64>, message: String },
    NoHeader,
    UnsupportedFile(PathBuf),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "Could not read file: {}", e),
            LoadError::Parse { line: Some(line), message } => {
                write!(f, "Error parsing file (line {}): {}", line, message)
            }
            LoadError::Parse { line: None, message } => write!(f, "Error parsing file: {}", message),
            LoadError::NoHeader => write!(f, "File has no header row"),
            LoadError::UnsupportedFile(path) => {
                write!(f, "Not a delimited text file: {} (expected .csv, .tsv, .tab or .txt)", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line());
        let message = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io_err) => LoadError::Io(io_err),
            _ => LoadError::Parse { line, message },
        }
    }
}

/// Result of loading a file, including any warnings
#[derive(Debug)]
pub struct LoadResult {
    pub table: Table,
    pub delimiter: u8,
    pub warnings: Vec<String>,
}

pub struct FileIO {
    pub file_path: PathBuf,
    format: FileFormat,
    delimiter: Option<u8>,
}

impl FileIO {
    /// Files without a delimited-text extension are rejected here, before any read
    pub fn new(file_path: PathBuf, delimiter: Option<u8>) -> Result<Self, LoadError> {
        let format = FileFormat::from_extension(&file_path)
            .ok_or_else(|| LoadError::UnsupportedFile(file_path.clone()))?;

        Ok(Self { file_path, format, delimiter })
    }

    pub fn file_name(&self) -> String {
        self.file_path.display().to_string()
    }

    /// Load table from file, returning warnings about any modifications
    pub fn load_table(&self) -> Result<LoadResult, LoadError> {
        let bytes = fs::read(&self.file_path)?;

        let delimiter = self
            .delimiter
            .or_else(|| self.format.delimiter())
            .unwrap_or_else(|| sniff_delimiter(&bytes));

        let result = parse_table(bytes.as_slice(), delimiter)?;
        info!(
            path = %self.file_path.display(),
            rows = result.table.row_count(),
            cols = result.table.col_count(),
            delimiter = %delimiter_name(delimiter),
            "Loaded table"
        );
        Ok(result)
    }
}

/// Parse delimited text into a table.
///
/// The first non-empty line holds the headers and empty lines are skipped. Short rows
/// are padded with empty values and extra fields are dropped; both are reported as
/// warnings. Nothing is returned on failure, so a caller never sees a partial table.
pub fn parse_table(input: &[u8], delimiter: u8) -> Result<LoadResult, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut record = csv::StringRecord::new();

    let header_record = loop {
        if !csv_reader.read_record(&mut record)? {
            return Err(LoadError::NoHeader);
        }
        if !is_empty_line(input, &record, csv_reader.position()) {
            break record.clone();
        }
    };

    let raw_headers: Vec<String> = header_record
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}').to_string() } else { h.to_string() })
        .collect();
    let (headers, renamed) = dedup_headers(raw_headers);
    let width = headers.len();

    let mut warnings = Vec::new();
    for (from, to) in &renamed {
        warnings.push(format!("Renamed duplicate column '{}' to '{}'", from, to));
    }

    let mut rows = Vec::new();
    let mut padded = 0usize;
    let mut truncated = 0usize;

    while csv_reader.read_record(&mut record)? {
        if is_empty_line(input, &record, csv_reader.position()) {
            continue;
        }

        if record.len() < width {
            padded += 1;
        } else if record.len() > width {
            truncated += 1;
        }

        let mut values: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        values.resize(width, String::new());
        rows.push(Row::new(values));
    }

    if padded > 0 {
        warnings.push(format!("Padded {} short row(s) with empty values", padded));
    }
    if truncated > 0 {
        warnings.push(format!("Dropped extra fields in {} row(s) (header has {} columns)", truncated, width));
    }
    for w in &warnings {
        warn!(warning = %w, "Load warning");
    }

    Ok(LoadResult {
        table: Table::new(headers, rows),
        delimiter,
        warnings,
    })
}

/// Whether `record` came from a line with nothing on it. A quoted empty value (`""`)
/// is a real one-field row and is kept.
fn is_empty_line(input: &[u8], record: &csv::StringRecord, end: &csv::Position) -> bool {
    if record.iter().any(|field| !field.is_empty()) || record.len() > 1 {
        return false;
    }
    let start = record.position().map_or(0, |p| p.byte() as usize);
    let end = (end.byte() as usize).min(input.len());
    input
        .get(start..end)
        .map_or(true, |raw| raw.iter().all(|&b| b == b'\r' || b == b'\n'))
}

/// Guess the delimiter from the first non-empty line: the candidate that occurs most
/// often outside quotes wins, defaulting to a comma.
pub fn sniff_delimiter(sample: &[u8]) -> u8 {
    let line = sample
        .split(|&b| b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .find(|l| !l.is_empty())
        .unwrap_or(&[]);

    let mut counts = [0usize; SNIFF_DELIMITERS.len()];
    let mut in_quotes = false;
    for &b in line {
        if b == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(i) = SNIFF_DELIMITERS.iter().position(|&d| d == b) {
            counts[i] += 1;
        }
    }

    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }

    if counts[best] == 0 {
        b','
    } else {
        SNIFF_DELIMITERS[best]
    }
}

/// Human-readable delimiter name
pub fn delimiter_name(delimiter: u8) -> String {
    match delimiter {
        b',' => "comma".to_string(),
        b'\t' => "tab".to_string(),
        b';' => "semicolon".to_string(),
        b'|' => "pipe".to_string(),
        other => format!("'{}'", other as char),
    }
}

/// Write an export payload into `dir` under its suggested file name.
///
/// An existing file is never overwritten: `data.csv`, `data-1.csv`, `data-2.csv`, ...
/// are tried in turn. Returns the path written.
pub fn save_export(payload: &ExportPayload, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let name = Path::new(&payload.file_name);
    let stem = name.file_stem().and_then(|s| s.to_str()).unwrap_or("data");
    let ext = name.extension().and_then(|s| s.to_str());

    let mut n = 0usize;
    loop {
        let file_name = match (n, ext) {
            (0, _) => payload.file_name.clone(),
            (n, Some(ext)) => format!("{}-{}.{}", stem, n, ext),
            (n, None) => format!("{}-{}", stem, n),
        };
        let path = dir.join(file_name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(&payload.bytes)?;
                file.flush()?;
                debug!(path = %path.display(), bytes = payload.bytes.len(), mime = payload.mime_type, "Wrote export");
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}
