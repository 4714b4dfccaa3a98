use crate::common::error::Result;
use crate::common::types::RawRow;
use csv::{ReaderBuilder, Trim};

const UTF8_BOM: char = '\u{feff}';

/// Decode header-keyed CSV text into raw rows.
///
/// Blank lines are skipped and rows with missing or extra cells are
/// tolerated: missing cells are simply absent from the row, extra cells
/// without a header are ignored.
pub fn decode_rows(text: &str) -> Result<Vec<RawRow>> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows: Vec<RawRow> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .filter(|(header, _)| !header.is_empty())
                .collect(),
        );
    }
    Ok(rows)
}
