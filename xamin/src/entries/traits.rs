use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use xamin_core::{CodecError, EntryData, FormatKind, Hint};

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Unsupported format: no entry format matches '{}'", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("Failed to encode {kind} data: {source}")]
    Encode {
        kind: FormatKind,
        #[source]
        source: CodecError,
    },

    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot save {0} entry because it has no path")]
    MissingPath(FormatKind),

    #[error("The file '{}' changed on disk since it was loaded", .0.display())]
    FileChanged(PathBuf),

    #[error("Invalid locator '{0}': {1}")]
    InvalidLocator(String, String),

    #[error("Entry is being edited by another activity ({0})")]
    WriterBusy(String),

    #[error("Entry data has not been loaded")]
    NotLoaded,
}

pub type EntryResult<T> = Result<T, EntryError>;

impl EntryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EntryError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Encoding and decoding for one format kind.
///
/// Implementations are registered with the
/// [`EntryRegistry`](super::EntryRegistry) and shared by every entry of that
/// kind.
pub trait EntryFormat: Send + Sync {
    fn kind(&self) -> FormatKind;

    fn display_name(&self) -> &str;

    /// Lower-case file extensions (without the dot) claimed by this format.
    fn extensions(&self) -> &[&str];

    /// Precedence when several formats match. Generic formats score low,
    /// specialised ones higher.
    fn score(&self) -> u32 {
        10
    }

    /// Whether the leading bytes of a file look like this format.
    fn is_type(&self, hint: &Hint) -> bool;

    fn default_data(&self) -> EntryData;

    fn decode(&self, bytes: &[u8]) -> Result<EntryData, CodecError>;

    fn encode(&self, data: &EntryData) -> Result<Vec<u8>, CodecError>;

    /// True when decoding then encoding unmodified content reproduces the
    /// original bytes.
    fn exact_round_trip(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatInfo {
    pub kind: FormatKind,
    pub display_name: String,
    pub extensions: Vec<String>,
    pub score: u32,
    pub exact_round_trip: bool,
}

impl FormatInfo {
    pub fn of(format: &dyn EntryFormat) -> Self {
        Self {
            kind: format.kind(),
            display_name: format.display_name().to_string(),
            extensions: format.extensions().iter().map(|e| e.to_string()).collect(),
            score: format.score(),
            exact_round_trip: format.exact_round_trip(),
        }
    }
}

/// Error for data handed to a format that does not own it.
pub(crate) fn mismatched(kind: &str, data: &EntryData) -> CodecError {
    let found = match data {
        EntryData::Text(_) => "text",
        EntryData::Table(_) => "table",
        EntryData::Binary(_) => "binary",
        EntryData::Tree(_) => "tree",
        EntryData::Project(_) => "project",
    };
    CodecError::new(format!("cannot encode {} data", found), kind)
}
