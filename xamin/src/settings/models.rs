use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub entries: EntrySettings,

    #[serde(default)]
    pub activities: ActivitySettings,

    #[serde(default)]
    pub project: ProjectSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySettings {
    /// Leading bytes read for content sniffing.
    #[serde(default = "default_hint_size")]
    pub hint_size: usize,

    /// Candidate CSV delimiters in order of preference.
    #[serde(default = "default_csv_delimiters")]
    pub csv_delimiters: String,

    /// Sniff the content of files whose extension no format claims.
    #[serde(default)]
    pub sniff_content: bool,

    /// Extension (without the dot) to format kind overrides, e.g. `dat: text`.
    #[serde(default)]
    pub extensions: HashMap<String, String>,
}

fn default_hint_size() -> usize {
    xamin_core::DEFAULT_HINT_SIZE
}

fn default_csv_delimiters() -> String {
    String::from_utf8_lossy(xamin_core::DEFAULT_DELIMITERS).to_string()
}

impl Default for EntrySettings {
    fn default() -> Self {
        Self {
            hint_size: default_hint_size(),
            csv_delimiters: default_csv_delimiters(),
            sniff_content: false,
            extensions: HashMap::new(),
        }
    }
}

impl EntrySettings {
    /// Delimiters as bytes. Multi-byte characters cannot delimit CSV and are skipped.
    pub fn delimiter_bytes(&self) -> Vec<u8> {
        self.csv_delimiters
            .chars()
            .filter(char::is_ascii)
            .map(|c| c as u8)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitySettings {
    /// Built-in activities that are not registered.
    #[serde(default)]
    pub disabled: BTreeSet<String>,

    /// Priority overrides by activity name.
    #[serde(default)]
    pub priorities: HashMap<String, i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Name given to project entries without a path; `{num}` is replaced by a counter.
    #[serde(default = "default_unsaved_name")]
    pub unsaved_name: String,
}

fn default_unsaved_name() -> String {
    "<unsaved> ({num})".to_string()
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            unsaved_name: default_unsaved_name(),
        }
    }
}
