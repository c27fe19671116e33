use super::hex_view::{hex_dump, BYTES_PER_LINE};
use super::traits::{Activity, ActivityResult};
use crate::entries::{EntryError, EntryHandle};
use xamin_core::EntryData;

pub const NAME: &str = "raw-view";

/// Fallback for entries no other activity handles: the encoded content as
/// text, or a hex dump when it is not UTF-8.
pub struct RawView {
    entry: EntryHandle,
}

impl RawView {
    pub fn new(entry: EntryHandle) -> ActivityResult<Self> {
        Ok(Self { entry })
    }

    pub fn contents(&self) -> ActivityResult<String> {
        let entry = self.entry.read();
        let data = entry.data().ok_or(EntryError::NotLoaded)?;

        let bytes = match data {
            EntryData::Text(text) => return Ok(text.clone()),
            EntryData::Binary(bytes) => bytes.clone(),
            other => entry.format().encode(other).map_err(|source| EntryError::Encode {
                kind: entry.kind(),
                source,
            })?,
        };

        Ok(match String::from_utf8(bytes) {
            Ok(text) if !text.contains('\0') => text,
            Ok(text) => hex_dump(text.as_bytes(), BYTES_PER_LINE).join("\n"),
            Err(e) => hex_dump(e.as_bytes(), BYTES_PER_LINE).join("\n"),
        })
    }
}

impl Activity for RawView {
    fn name(&self) -> &str {
        NAME
    }

    fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    fn describe(&self) -> String {
        let kind = self.entry.read().kind();
        match self.contents() {
            Ok(contents) => format!("{}: {} ({} lines)", NAME, kind, contents.lines().count()),
            Err(_) => format!("{}: {} (not loaded)", NAME, kind),
        }
    }
}
