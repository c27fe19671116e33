use super::traits::{Activity, ActivityResult};
use super::{ensure_kind, instance_label};
use crate::entries::{EntryError, EntryHandle};
use xamin_core::{EntryData, FormatKind};

pub const NAME: &str = "hex-view";

pub const BYTES_PER_LINE: usize = 16;

/// Offset, hex bytes and printable ASCII, one line per `width` bytes.
///
/// ```text
/// 00000000  78 61 6d 69 6e 0a                                 |xamin.|
/// ```
pub fn hex_dump(bytes: &[u8], width: usize) -> Vec<String> {
    let width = width.max(1);
    bytes
        .chunks(width)
        .enumerate()
        .map(|(i, chunk)| {
            let hex = chunk
                .iter()
                .map(|b| hex::encode([*b]))
                .collect::<Vec<_>>()
                .join(" ");
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!("{:08x}  {:<w$}  |{}|", i * width, hex, ascii, w = width * 3 - 1)
        })
        .collect()
}

/// Hex dump of binary entries with in-place byte patching.
pub struct HexView {
    entry: EntryHandle,
    label: String,
}

impl HexView {
    pub fn new(entry: EntryHandle) -> ActivityResult<Self> {
        ensure_kind(NAME, &entry, &[FormatKind::binary()])?;
        Ok(Self {
            entry,
            label: instance_label(NAME),
        })
    }

    pub fn len(&self) -> usize {
        self.entry
            .with_data(|d| d.as_bytes().map(<[u8]>::len).unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lines(&self) -> ActivityResult<Vec<String>> {
        let lines = self
            .entry
            .with_data(|d| d.as_bytes().map(|b| hex_dump(b, BYTES_PER_LINE)))?;
        lines.ok_or_else(|| EntryError::NotLoaded.into())
    }

    /// Overwrite bytes starting at `offset`. Returns false, leaving the data
    /// untouched, if the patch would run past the end.
    pub fn patch(&self, offset: usize, bytes: &[u8]) -> ActivityResult<bool> {
        let patched = self.entry.update_if(&self.label, |data| {
            let patched = match data {
                EntryData::Binary(current) => offset
                    .checked_add(bytes.len())
                    .and_then(|end| current.get_mut(offset..end))
                    .map(|target| target.copy_from_slice(bytes))
                    .is_some(),
                _ => false,
            };
            (patched, patched)
        })?;
        Ok(patched)
    }
}

impl Activity for HexView {
    fn name(&self) -> &str {
        NAME
    }

    fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    fn describe(&self) -> String {
        format!("{}: {} bytes", NAME, self.len())
    }

    fn deactivate(&mut self) {
        self.entry.release_writer(&self.label);
    }
}

impl Drop for HexView {
    fn drop(&mut self) {
        self.entry.release_writer(&self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{BinaryFormat, Entry, EntryId};
    use std::sync::Arc;

    fn binary_handle(bytes: &[u8]) -> EntryHandle {
        let mut entry = Entry::new(None, Arc::new(BinaryFormat::new()));
        entry.set_data(EntryData::Binary(bytes.to_vec()));
        EntryHandle::new(EntryId(1), entry)
    }

    #[test]
    fn dump_format() {
        let lines = hex_dump(b"xamin\n", 16);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("00000000  78 61 6d 69 6e 0a "));
        assert!(lines[0].ends_with("|xamin.|"));

        let lines = hex_dump(&[0u8; 20], 16);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("00000010  00 00 00 00"));
    }

    #[test]
    fn patch_within_bounds_only() {
        let view = HexView::new(binary_handle(&[0, 1, 2, 3])).unwrap();
        assert!(view.patch(1, &[0xAA, 0xBB]).unwrap());
        assert_eq!(view.entry().revision(), 1);
        assert!(!view.patch(3, &[1, 2]).unwrap());
        assert!(!view.patch(usize::MAX, &[1]).unwrap());
        assert_eq!(view.entry().revision(), 1);
        assert_eq!(
            view.entry().with_data(|d| d.as_bytes().map(<[u8]>::to_vec)).unwrap(),
            Some(vec![0, 0xAA, 0xBB, 3])
        );
        assert_eq!(view.describe(), "hex-view: 4 bytes");
    }
}
