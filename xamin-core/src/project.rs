use crate::types::{CodecError, FormatKind};
use serde::Serialize;
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

/// YAML tag marking the root of a project file.
pub const PROJECT_TAG: &str = "Project";

const FORMAT: &str = "project";

/// A project file: metadata plus named references to other entries.
///
/// On disk it is a tagged YAML mapping:
///
/// ```yaml
/// !Project
/// meta:
///   version: 0.2.0
/// entries:
///   spectrum.csv:
///     kind: csv
///     path: spectrum.csv
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectManifest {
    pub version: String,
    pub entries: Vec<ProjectRecord>,
}

/// One entry listed in a project. Paths are stored as written, usually
/// relative to the project file's directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub name: String,
    pub kind: FormatKind,
    pub path: Option<String>,
}

impl ProjectManifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            entries: Vec::new(),
        }
    }

    pub fn record(&self, name: &str) -> Option<&ProjectRecord> {
        self.entries.iter().find(|r| r.name == name)
    }
}

pub fn decode_project(bytes: &[u8]) -> Result<ProjectManifest, CodecError> {
    let value: Value =
        serde_yaml::from_slice(bytes).map_err(|e| CodecError::new(e.to_string(), FORMAT))?;

    let root = match value {
        Value::Tagged(tagged) if is_project_tag(&tagged.tag) => tagged.value,
        _ => {
            return Err(CodecError::new(
                format!("document is not tagged !{}", PROJECT_TAG),
                FORMAT,
            ))
        }
    };

    let Value::Mapping(root) = root else {
        return Err(CodecError::new("project root must be a mapping", FORMAT));
    };

    let version = root
        .get("meta")
        .and_then(|meta| meta.get("version"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut entries = Vec::new();
    match root.get("entries") {
        None | Some(Value::Null) => {}
        Some(Value::Mapping(records)) => {
            for (name, record) in records {
                let name = name
                    .as_str()
                    .ok_or_else(|| CodecError::new("entry names must be strings", FORMAT))?;
                let kind = record
                    .get("kind")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        CodecError::new(format!("entry '{}' has no kind", name), FORMAT)
                    })?;
                let path = record.get("path").and_then(Value::as_str);

                entries.push(ProjectRecord {
                    name: name.to_string(),
                    kind: FormatKind::new(kind),
                    path: path.map(str::to_string),
                });
            }
        }
        Some(_) => return Err(CodecError::new("'entries' must be a mapping", FORMAT)),
    }

    Ok(ProjectManifest { version, entries })
}

pub fn encode_project(manifest: &ProjectManifest) -> Result<Vec<u8>, CodecError> {
    let mut meta = Mapping::new();
    meta.insert("version".into(), manifest.version.clone().into());

    let mut records = Mapping::new();
    for record in &manifest.entries {
        let mut fields = Mapping::new();
        fields.insert("kind".into(), record.kind.as_str().into());
        if let Some(path) = &record.path {
            fields.insert("path".into(), path.clone().into());
        }
        records.insert(record.name.clone().into(), Value::Mapping(fields));
    }

    let mut root = Mapping::new();
    root.insert("meta".into(), Value::Mapping(meta));
    root.insert("entries".into(), Value::Mapping(records));

    let document = Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(PROJECT_TAG),
        value: Value::Mapping(root),
    }));

    serde_yaml::to_string(&document)
        .map(String::into_bytes)
        .map_err(|e| CodecError::new(e.to_string(), FORMAT))
}

fn is_project_tag(tag: &Tag) -> bool {
    tag.to_string().trim_start_matches('!') == PROJECT_TAG
}
