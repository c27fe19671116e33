use crate::project::ProjectManifest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an entry format ("text", "csv", ...).
///
/// Kinds are open-ended so that plug-ins can register formats of their own;
/// the built-in identifiers are exposed as associated constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatKind(String);

impl FormatKind {
    pub const TEXT: &'static str = "text";
    pub const CSV: &'static str = "csv";
    pub const BINARY: &'static str = "binary";
    pub const YAML: &'static str = "yaml";
    pub const PROJECT: &'static str = "project";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn text() -> Self {
        Self::new(Self::TEXT)
    }

    pub fn csv() -> Self {
        Self::new(Self::CSV)
    }

    pub fn binary() -> Self {
        Self::new(Self::BINARY)
    }

    pub fn yaml() -> Self {
        Self::new(Self::YAML)
    }

    pub fn project() -> Self {
        Self::new(Self::PROJECT)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormatKind {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Delimiter and line layout of a delimited-text table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    pub delimiter: u8,
    pub crlf: bool,
    pub trailing_newline: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            crlf: false,
            trailing_newline: true,
        }
    }
}

/// Rows of string cells plus the dialect they were read with.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
    pub dialect: Dialect,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            dialect: Dialect::default(),
        }
    }

    /// Rows by columns of the first row, or `None` for an empty table.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.rows.first().map(|first| (self.rows.len(), first.len()))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.as_str())
    }

    /// Overwrite a cell, padding a short row with empty cells when needed.
    /// Returns false if the row does not exist.
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) -> bool {
        let Some(r) = self.rows.get_mut(row) else {
            return false;
        };
        if r.len() <= column {
            let Some(len) = column.checked_add(1) else {
                return false;
            };
            r.resize(len, String::new());
        }
        r[column] = value.into();
        true
    }
}

/// The parsed, in-memory representation of an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum EntryData {
    Text(String),
    Table(Table),
    Binary(Vec<u8>),
    Tree(serde_yaml::Value),
    Project(ProjectManifest),
}

impl EntryData {
    /// Length along each dimension of the data.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            EntryData::Text(text) => vec![text.lines().count()],
            EntryData::Table(table) => table
                .shape()
                .map(|(rows, columns)| vec![rows, columns])
                .unwrap_or_default(),
            EntryData::Binary(bytes) => vec![bytes.len()],
            EntryData::Tree(value) => match value {
                serde_yaml::Value::Mapping(m) => vec![m.len()],
                serde_yaml::Value::Sequence(s) => vec![s.len()],
                serde_yaml::Value::Null => vec![0],
                _ => vec![1],
            },
            EntryData::Project(manifest) => vec![manifest.entries.len()],
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntryData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            EntryData::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            EntryData::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&serde_yaml::Value> {
        match self {
            EntryData::Tree(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_project(&self) -> Option<&ProjectManifest> {
        match self {
            EntryData::Project(manifest) => Some(manifest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CodecError {
    pub message: String,
    pub format: String,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.format)
    }
}

impl std::error::Error for CodecError {}

impl CodecError {
    pub fn new(message: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            format: format.into(),
        }
    }
}
