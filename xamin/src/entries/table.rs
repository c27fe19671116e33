use super::traits::{mismatched, EntryFormat};
use xamin_core::{
    decode_table, encode_table, sniff_delimiter, CodecError, EntryData, FormatKind, Hint, Table,
};

/// Comma or tab separated tables.
///
/// Round trips are exact for files that only quote where needed; redundant
/// quoting and blank lines are normalised away on save.
pub struct CsvFormat {
    delimiters: Vec<u8>,
}

impl CsvFormat {
    pub fn new(delimiters: impl Into<Vec<u8>>) -> Self {
        Self {
            delimiters: delimiters.into(),
        }
    }
}

impl EntryFormat for CsvFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::csv()
    }

    fn display_name(&self) -> &str {
        "CSV"
    }

    fn extensions(&self) -> &[&str] {
        &["csv", "tsv"]
    }

    fn is_type(&self, hint: &Hint) -> bool {
        hint.utf8()
            .map(|text| sniff_delimiter(text, &self.delimiters).is_some())
            .unwrap_or(false)
    }

    fn default_data(&self) -> EntryData {
        EntryData::Table(Table::default())
    }

    fn decode(&self, bytes: &[u8]) -> Result<EntryData, CodecError> {
        decode_table(bytes, &self.delimiters).map(EntryData::Table)
    }

    fn encode(&self, data: &EntryData) -> Result<Vec<u8>, CodecError> {
        match data {
            EntryData::Table(table) => encode_table(table),
            other => Err(mismatched(FormatKind::CSV, other)),
        }
    }

    fn exact_round_trip(&self) -> bool {
        false
    }
}
