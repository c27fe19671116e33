use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Default number of leading bytes read for content sniffing.
pub const DEFAULT_HINT_SIZE: usize = 2048;

/// The leading bytes of a file, used to guess its format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hint {
    bytes: Vec<u8>,
}

impl Hint {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Take at most `size` bytes from already loaded content.
    pub fn from_content(content: &[u8], size: usize) -> Self {
        Self::new(&content[..content.len().min(size)])
    }

    /// Read at most `size` bytes from the start of the file at `path`.
    pub fn read(path: &Path, size: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut bytes = Vec::with_capacity(size);
        file.take(size as u64).read_to_end(&mut bytes)?;
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The hint as UTF-8 text.
    ///
    /// A multi-byte sequence cut off by the end of the hint is dropped rather
    /// than making the whole hint invalid.
    pub fn utf8(&self) -> Option<&str> {
        match std::str::from_utf8(&self.bytes) {
            Ok(text) => Some(text),
            Err(e) if e.error_len().is_none() => {
                std::str::from_utf8(&self.bytes[..e.valid_up_to()]).ok()
            }
            Err(_) => None,
        }
    }

    /// UTF-8 without NUL bytes.
    pub fn is_text(&self) -> bool {
        self.utf8().is_some() && !self.bytes.contains(&0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_hint() {
        let hint = Hint::new("Hello, 世界");
        assert_eq!(hint.utf8(), Some("Hello, 世界"));
        assert!(hint.is_text());
    }

    #[test]
    fn truncated_multibyte_sequence_is_still_text() {
        let content = "ab世".as_bytes();
        // Cut in the middle of the three-byte character
        let hint = Hint::from_content(content, 3);
        assert_eq!(hint.utf8(), Some("ab"));
        assert!(hint.is_text());
    }

    #[test]
    fn invalid_bytes_are_not_text() {
        let hint = Hint::new(vec![0xFF, 0xFE, 0x41, 0x42]);
        assert_eq!(hint.utf8(), None);
        assert!(!hint.is_text());
    }

    #[test]
    fn nul_bytes_are_not_text() {
        let hint = Hint::new(vec![0x41, 0x00, 0x42]);
        assert!(hint.utf8().is_some());
        assert!(!hint.is_text());
    }

    #[test]
    fn from_content_truncates() {
        let hint = Hint::from_content(b"0123456789", 4);
        assert_eq!(hint.bytes(), b"0123");
        assert_eq!(Hint::from_content(b"01", 4).bytes(), b"01");
    }
}
