use crate::types::CodecError;
use serde_yaml::{Mapping, Value};

const FORMAT: &str = "yaml";

/// Parse a YAML document. An empty document becomes an empty mapping.
pub fn decode_tree(bytes: &[u8]) -> Result<Value, CodecError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        CodecError::new(
            format!("invalid UTF-8 at byte {}", e.valid_up_to()),
            FORMAT,
        )
    })?;

    if text.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }

    serde_yaml::from_str(text).map_err(|e| CodecError::new(e.to_string(), FORMAT))
}

/// Serialize a YAML document. Comments and styling of the source are not kept.
pub fn encode_tree(value: &Value) -> Result<Vec<u8>, CodecError> {
    serde_yaml::to_string(value)
        .map(String::into_bytes)
        .map_err(|e| CodecError::new(e.to_string(), FORMAT))
}

/// Whether a (possibly truncated) text parses as a YAML mapping or sequence.
///
/// The last line is dropped before parsing, since a hint may end mid-line.
pub fn looks_like_tree(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().collect();
    let block = lines[..lines.len().saturating_sub(1)].join("\n");

    match serde_yaml::from_str::<Value>(&block) {
        Ok(Value::Mapping(_)) | Ok(Value::Sequence(_)) => true,
        Ok(Value::Tagged(tagged)) => {
            matches!(tagged.value, Value::Mapping(_) | Value::Sequence(_))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_mapping() {
        let value = decode_tree(b"name: sample\nscans: 16\n").unwrap();
        assert_eq!(value["name"].as_str(), Some("sample"));
        assert_eq!(value["scans"].as_u64(), Some(16));
    }

    #[test]
    fn decode_empty_document() {
        assert_eq!(decode_tree(b"  \n").unwrap(), Value::Mapping(Mapping::new()));
    }

    #[test]
    fn decode_malformed_document() {
        let err = decode_tree(b"key: [unclosed\n").unwrap_err();
        assert_eq!(err.format, "yaml");
    }

    #[test]
    fn sniff_tree() {
        assert!(looks_like_tree("a: 1\nb: 2\nc: 3"));
        assert!(looks_like_tree("- one\n- two\n- thr"));
        assert!(!looks_like_tree("This is my\ntest text file."));
        assert!(!looks_like_tree(""));
    }

    #[test]
    fn encode_then_decode_preserves_values() {
        let value = decode_tree(b"b: [1, 2]\na: text\n").unwrap();
        let encoded = encode_tree(&value).unwrap();
        assert_eq!(decode_tree(&encoded).unwrap(), value);
    }
}
