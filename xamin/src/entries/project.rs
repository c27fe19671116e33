use super::traits::{mismatched, EntryFormat};
use once_cell::sync::Lazy;
use regex::Regex;
use xamin_core::{
    decode_project, encode_project, CodecError, EntryData, FormatKind, Hint, ProjectManifest,
};

static COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"#.*").unwrap());

static PROJECT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!Project\r?\n\s*(meta|entries):").unwrap());

/// Xamin project files: a `!Project` tagged YAML listing other entries.
pub struct ProjectFormat;

impl ProjectFormat {
    pub fn new() -> Self {
        Self
    }
}

impl EntryFormat for ProjectFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::project()
    }

    fn display_name(&self) -> &str {
        "Xamin project"
    }

    fn extensions(&self) -> &[&str] {
        &["xamin", "yaml", "yml"]
    }

    fn score(&self) -> u32 {
        20
    }

    fn is_type(&self, hint: &Hint) -> bool {
        let Some(text) = hint.utf8() else {
            return false;
        };
        let stripped = COMMENTS.replace_all(text, "");
        PROJECT_HEADER.is_match(stripped.trim())
    }

    fn default_data(&self) -> EntryData {
        EntryData::Project(ProjectManifest::new(env!("CARGO_PKG_VERSION")))
    }

    fn decode(&self, bytes: &[u8]) -> Result<EntryData, CodecError> {
        decode_project(bytes).map(EntryData::Project)
    }

    fn encode(&self, data: &EntryData) -> Result<Vec<u8>, CodecError> {
        match data {
            EntryData::Project(manifest) => encode_project(manifest),
            other => Err(mismatched(FormatKind::PROJECT, other)),
        }
    }

    fn exact_round_trip(&self) -> bool {
        false
    }
}
