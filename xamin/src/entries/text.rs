use super::traits::{mismatched, EntryFormat};
use xamin_core::{CodecError, EntryData, FormatKind, Hint};

/// Plain UTF-8 text. Low score so that structured text formats win.
pub struct TextFormat;

impl TextFormat {
    pub fn new() -> Self {
        Self
    }
}

impl EntryFormat for TextFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::text()
    }

    fn display_name(&self) -> &str {
        "Text"
    }

    fn extensions(&self) -> &[&str] {
        &["txt", "text", "log", "md"]
    }

    fn score(&self) -> u32 {
        5
    }

    fn is_type(&self, hint: &Hint) -> bool {
        hint.is_text()
    }

    fn default_data(&self) -> EntryData {
        EntryData::Text(String::new())
    }

    fn decode(&self, bytes: &[u8]) -> Result<EntryData, CodecError> {
        String::from_utf8(bytes.to_vec())
            .map(EntryData::Text)
            .map_err(|e| {
                CodecError::new(
                    format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
                    FormatKind::TEXT,
                )
            })
    }

    fn encode(&self, data: &EntryData) -> Result<Vec<u8>, CodecError> {
        match data {
            EntryData::Text(text) => Ok(text.as_bytes().to_vec()),
            other => Err(mismatched(FormatKind::TEXT, other)),
        }
    }
}
