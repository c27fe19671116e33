use super::traits::{Activity, ActivityResult};
use super::ensure_kind;
use crate::entries::{EntryError, EntryHandle};
use serde_yaml::Value;
use xamin_core::{EntryData, FormatKind};

pub const NAME: &str = "tree-view";

/// Read-only outline of YAML documents and projects.
pub struct TreeView {
    entry: EntryHandle,
}

impl TreeView {
    pub fn new(entry: EntryHandle) -> ActivityResult<Self> {
        ensure_kind(NAME, &entry, &[FormatKind::yaml(), FormatKind::project()])?;
        Ok(Self { entry })
    }

    /// Keys of a top-level mapping, or `[index] value` for a sequence.
    pub fn items(&self) -> ActivityResult<Vec<String>> {
        let items = self.entry.with_data(top_level_items)?;
        items.ok_or_else(|| EntryError::NotLoaded.into())
    }
}

fn top_level_items(data: &EntryData) -> Option<Vec<String>> {
    match data {
        EntryData::Tree(value) => Some(value_items(value)),
        EntryData::Project(manifest) => {
            Some(manifest.entries.iter().map(|r| r.name.clone()).collect())
        }
        _ => None,
    }
}

fn value_items(value: &Value) -> Vec<String> {
    match value {
        Value::Mapping(map) => map.keys().map(scalar_label).collect(),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("[{}] {}", i, scalar_label(item)))
            .collect(),
        Value::Tagged(tagged) => value_items(&tagged.value),
        other => vec![scalar_label(other)],
    }
}

fn scalar_label(value: &Value) -> String {
    match value {
        Value::Null => "~".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => format!("[{} items]", items.len()),
        Value::Mapping(map) => format!("{{{} keys}}", map.len()),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, scalar_label(&tagged.value)),
    }
}

impl Activity for TreeView {
    fn name(&self) -> &str {
        NAME
    }

    fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    fn describe(&self) -> String {
        let count = self.items().map(|i| i.len()).unwrap_or(0);
        format!("{}: {} top-level items", NAME, count)
    }
}
