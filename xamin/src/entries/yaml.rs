use super::traits::{mismatched, EntryFormat};
use xamin_core::{decode_tree, encode_tree, looks_like_tree, CodecError, EntryData, FormatKind, Hint};

/// YAML documents, held as a value tree. Comments and styling are lost on save.
pub struct YamlFormat;

impl YamlFormat {
    pub fn new() -> Self {
        Self
    }
}

impl EntryFormat for YamlFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::yaml()
    }

    fn display_name(&self) -> &str {
        "YAML"
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn is_type(&self, hint: &Hint) -> bool {
        hint.utf8().map(looks_like_tree).unwrap_or(false)
    }

    fn default_data(&self) -> EntryData {
        EntryData::Tree(serde_yaml::Value::Mapping(serde_yaml::Mapping::new()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<EntryData, CodecError> {
        decode_tree(bytes).map(EntryData::Tree)
    }

    fn encode(&self, data: &EntryData) -> Result<Vec<u8>, CodecError> {
        match data {
            EntryData::Tree(value) => encode_tree(value),
            other => Err(mismatched(FormatKind::YAML, other)),
        }
    }

    fn exact_round_trip(&self) -> bool {
        false
    }
}
