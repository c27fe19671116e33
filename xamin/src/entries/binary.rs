use super::traits::{mismatched, EntryFormat};
use xamin_core::{CodecError, EntryData, FormatKind, Hint};

/// Raw bytes, kept unchanged.
pub struct BinaryFormat;

impl BinaryFormat {
    pub fn new() -> Self {
        Self
    }
}

impl EntryFormat for BinaryFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::binary()
    }

    fn display_name(&self) -> &str {
        "Binary"
    }

    fn extensions(&self) -> &[&str] {
        &["bin", "dat"]
    }

    fn score(&self) -> u32 {
        5
    }

    fn is_type(&self, hint: &Hint) -> bool {
        !hint.is_text()
    }

    fn default_data(&self) -> EntryData {
        EntryData::Binary(Vec::new())
    }

    fn decode(&self, bytes: &[u8]) -> Result<EntryData, CodecError> {
        Ok(EntryData::Binary(bytes.to_vec()))
    }

    fn encode(&self, data: &EntryData) -> Result<Vec<u8>, CodecError> {
        match data {
            EntryData::Binary(bytes) => Ok(bytes.clone()),
            other => Err(mismatched(FormatKind::BINARY, other)),
        }
    }
}
