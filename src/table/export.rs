//! Serialization of a row set to delimited text or JSON records.

use std::io;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::table::Row;

/// Export target format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Delimited text, every value quoted
    Delimited,
    /// Pretty JSON array of objects keyed by header name
    Records,
}

/// Bytes ready for the download/save collaborator, with a suggested name and media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// Serialize `rows` in `format`.
///
/// Returns `Ok(None)` for an empty row set: there is nothing to export.
pub fn export<'a, I>(
    headers: &[String],
    rows: I,
    format: ExportFormat,
    delimiter: u8,
) -> io::Result<Option<ExportPayload>>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut rows = rows.into_iter().peekable();
    if rows.peek().is_none() {
        return Ok(None);
    }

    let payload = match format {
        ExportFormat::Delimited => {
            let (file_name, mime_type) = if delimiter == b'\t' {
                ("data.tsv", "text/tab-separated-values;charset=utf-8")
            } else {
                ("data.csv", "text/csv;charset=utf-8")
            };
            ExportPayload {
                bytes: to_delimited(headers, rows, delimiter)?,
                file_name: file_name.to_string(),
                mime_type,
            }
        }
        ExportFormat::Records => ExportPayload {
            bytes: to_records(headers, rows)?,
            file_name: "data.json".to_string(),
            mime_type: "application/json;charset=utf-8",
        },
    };

    Ok(Some(payload))
}

/// Delimited text: a header line, then one line per row with every value wrapped in
/// double quotes (inner quotes doubled). Lines are joined by `\n` with no trailing
/// newline.
///
/// Header names are written bare unless they contain the delimiter, a quote or a line
/// break, in which case they are quoted the same way.
pub fn to_delimited<'a, I>(headers: &[String], rows: I, delimiter: u8) -> io::Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut out = Vec::new();

    {
        let mut header_writer = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);
        header_writer.write_record(headers).map_err(io::Error::other)?;
        header_writer.flush()?;
    }

    {
        let mut row_writer = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);
        for row in rows {
            row_writer
                .write_record((0..headers.len()).map(|col| row.get(col)))
                .map_err(io::Error::other)?;
        }
        row_writer.flush()?;
    }

    if out.last() == Some(&b'\n') {
        out.pop();
    }

    Ok(out)
}

/// Pretty-printed (2-space) JSON array, one object per row, keys in header order
pub fn to_records<'a, I>(headers: &[String], rows: I) -> io::Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Row>,
{
    let records: Vec<Record<'_>> = rows.into_iter().map(|row| Record { headers, row }).collect();
    Ok(serde_json::to_vec_pretty(&records)?)
}

/// A row viewed as a map from header to value
struct Record<'a> {
    headers: &'a [String],
    row: &'a Row,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (col, header) in self.headers.iter().enumerate() {
            map.serialize_entry(header, self.row.get(col))?;
        }
        map.end()
    }
}
