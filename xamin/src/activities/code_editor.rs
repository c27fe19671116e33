use super::traits::{Activity, ActivityError, ActivityResult};
use super::{ensure_kind, instance_label};
use crate::entries::{EntryError, EntryHandle};
use xamin_core::FormatKind;

pub const NAME: &str = "code-editor";

/// Edits an entry as plain text through its format's encoding.
pub struct CodeEditor {
    entry: EntryHandle,
    label: String,
}

impl CodeEditor {
    pub fn new(entry: EntryHandle) -> ActivityResult<Self> {
        ensure_kind(NAME, &entry, &[FormatKind::text(), FormatKind::yaml()])?;
        Ok(Self {
            entry,
            label: instance_label(NAME),
        })
    }

    /// Owner name used for the entry's writer slot.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> ActivityResult<String> {
        let entry = self.entry.read();
        let data = entry.data().ok_or(EntryError::NotLoaded)?;
        if let Some(text) = data.as_text() {
            return Ok(text.to_string());
        }

        let bytes = entry.format().encode(data).map_err(|source| self.invalid(source))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Replace the whole text. Fails without touching the entry if the text
    /// does not decode in the entry's format.
    pub fn set_text(&self, text: &str) -> ActivityResult<()> {
        let format = self.entry.read().format().clone();
        let data = format
            .decode(text.as_bytes())
            .map_err(|source| self.invalid(source))?;
        self.entry.update(&self.label, |current| *current = data)?;
        Ok(())
    }

    /// Insert lines before line `at` (0-based). Past the end appends.
    pub fn insert_lines(&self, at: usize, lines: &[&str]) -> ActivityResult<()> {
        let text = self.text()?;
        let trailing_newline = text.ends_with('\n');

        let mut current: Vec<&str> = text.lines().collect();
        let at = at.min(current.len());
        current.splice(at..at, lines.iter().copied());

        let mut updated = current.join("\n");
        if trailing_newline || (text.is_empty() && !lines.is_empty()) {
            updated.push('\n');
        }
        self.set_text(&updated)
    }

    pub fn line_count(&self) -> usize {
        self.text().map(|t| t.lines().count()).unwrap_or(0)
    }

    fn invalid(&self, source: xamin_core::CodecError) -> ActivityError {
        ActivityError::Invalid {
            activity: NAME.to_string(),
            source,
        }
    }
}

impl Activity for CodeEditor {
    fn name(&self) -> &str {
        NAME
    }

    fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    fn describe(&self) -> String {
        format!("{}: {} lines", NAME, self.line_count())
    }

    fn deactivate(&mut self) {
        self.entry.release_writer(&self.label);
    }
}

impl Drop for CodeEditor {
    fn drop(&mut self) {
        self.entry.release_writer(&self.label);
    }
}
