use super::traits::{Activity, ActivityResult};
use super::ensure_kind;
use crate::entries::{EntryError, EntryHandle};
use crate::project::resolve_record_path;
use serde::Serialize;
use std::path::PathBuf;
use xamin_core::{EntryData, FormatKind};

pub const NAME: &str = "project-explorer";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerItem {
    pub name: String,
    pub kind: FormatKind,
    pub path: Option<PathBuf>,
    pub exists: bool,
}

/// Lists the entries of a project with their paths resolved against the
/// project file's directory.
pub struct ProjectExplorer {
    entry: EntryHandle,
}

impl ProjectExplorer {
    pub fn new(entry: EntryHandle) -> ActivityResult<Self> {
        ensure_kind(NAME, &entry, &[FormatKind::project()])?;
        Ok(Self { entry })
    }

    pub fn items(&self) -> ActivityResult<Vec<ExplorerItem>> {
        let entry = self.entry.read();
        let base = entry.path().and_then(|p| p.parent()).map(|p| p.to_path_buf());

        let Some(EntryData::Project(manifest)) = entry.data() else {
            return Err(EntryError::NotLoaded.into());
        };

        Ok(manifest
            .entries
            .iter()
            .map(|record| {
                let path = record
                    .path
                    .as_deref()
                    .map(|p| resolve_record_path(base.as_deref(), p));
                ExplorerItem {
                    name: record.name.clone(),
                    kind: record.kind.clone(),
                    exists: path.as_deref().map(|p| p.is_file()).unwrap_or(false),
                    path,
                }
            })
            .collect())
    }
}

impl Activity for ProjectExplorer {
    fn name(&self) -> &str {
        NAME
    }

    fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    fn describe(&self) -> String {
        match self.items() {
            Ok(items) => {
                let missing = items.iter().filter(|i| i.path.is_some() && !i.exists).count();
                if missing > 0 {
                    format!("{}: {} entries ({} missing)", NAME, items.len(), missing)
                } else {
                    format!("{}: {} entries", NAME, items.len())
                }
            }
            Err(_) => format!("{}: not loaded", NAME),
        }
    }
}
