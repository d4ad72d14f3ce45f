use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use crate::table::Row;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes `rows` under `headers`: one header line, then one line per row
/// with missing fields written as empty cells. Cells are quoted only when
/// they contain a delimiter, quote or line break.
pub fn write_csv<'a>(
    headers: &[String],
    rows: impl IntoIterator<Item = &'a Row>,
) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(headers.iter().map(|h| row.get(h).unwrap_or("")))?;
    }
    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
