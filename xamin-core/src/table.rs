use crate::types::{CodecError, Dialect, Table};

const FORMAT: &str = "csv";

/// Parse delimited text into a [`Table`], sniffing its dialect first.
///
/// Blank lines are skipped and rows may have differing lengths.
pub fn decode_table(bytes: &[u8], delimiters: &[u8]) -> Result<Table, CodecError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        CodecError::new(
            format!("invalid UTF-8 at byte {}", e.valid_up_to()),
            FORMAT,
        )
    })?;

    let dialect = Dialect::infer(text, delimiters);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CodecError::new(e.to_string(), FORMAT))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { rows, dialect })
}

/// Write a [`Table`] back out with its dialect, quoting only where required.
pub fn encode_table(table: &Table) -> Result<Vec<u8>, CodecError> {
    let terminator = if table.dialect.crlf {
        csv::Terminator::CRLF
    } else {
        csv::Terminator::Any(b'\n')
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(table.dialect.delimiter)
        .terminator(terminator)
        .quote_style(csv::QuoteStyle::Necessary)
        .flexible(true)
        .from_writer(Vec::new());

    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| CodecError::new(e.to_string(), FORMAT))?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| CodecError::new(e.to_string(), FORMAT))?;

    if !table.dialect.trailing_newline {
        let ending: &[u8] = if table.dialect.crlf { b"\r\n" } else { b"\n" };
        if bytes.ends_with(ending) {
            bytes.truncate(bytes.len() - ending.len());
        }
    }

    Ok(bytes)
}
