mod naming;

pub use naming::{assign_names, common_path};

use crate::entries::{Entry, EntryError, EntryRegistry, EntryResult, ProjectFormat};
use crate::settings::ProjectSettings;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use xamin_core::{CodecError, EntryData, FormatKind, ProjectManifest, ProjectRecord};

/// Absolute path of a record path stored in a project file.
pub fn resolve_record_path(project_dir: Option<&Path>, stored: &str) -> PathBuf {
    let stored = Path::new(stored);
    match project_dir {
        Some(dir) if stored.is_relative() => dir.join(stored),
        _ => stored.to_path_buf(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectEntry {
    pub name: String,
    pub kind: FormatKind,
    pub path: Option<PathBuf>,
}

/// A set of named entries saved together in a project file.
///
/// Entry paths are held as absolute paths and written relative to the
/// project file's directory when they live below it.
#[derive(Debug, Clone)]
pub struct Project {
    path: Option<PathBuf>,
    version: String,
    entries: Vec<ProjectEntry>,
    unsaved_name: String,
}

impl Project {
    pub fn new(path: Option<PathBuf>, settings: &ProjectSettings) -> Self {
        Self {
            path,
            version: env!("CARGO_PKG_VERSION").to_string(),
            entries: Vec::new(),
            unsaved_name: settings.unsaved_name.clone(),
        }
    }

    pub fn from_manifest(
        path: Option<PathBuf>,
        manifest: &ProjectManifest,
        settings: &ProjectSettings,
    ) -> Self {
        let dir = path.as_deref().and_then(Path::parent);
        let entries = manifest
            .entries
            .iter()
            .map(|record| ProjectEntry {
                name: record.name.clone(),
                kind: record.kind.clone(),
                path: record.path.as_deref().map(|p| resolve_record_path(dir, p)),
            })
            .collect();

        Self {
            version: manifest.version.clone(),
            entries,
            unsaved_name: settings.unsaved_name.clone(),
            path,
        }
    }

    /// Read a project file through the registry.
    pub fn load(registry: &EntryRegistry, path: &Path, settings: &ProjectSettings) -> EntryResult<Self> {
        let entry = registry.load(path)?;
        match entry.data() {
            Some(EntryData::Project(manifest)) => {
                let project = Self::from_manifest(Some(path.to_path_buf()), manifest, settings);
                debug!("Loaded project {:?} with {} entries", path, project.entries.len());
                Ok(project)
            }
            _ => Err(EntryError::Parse {
                path: path.to_path_buf(),
                source: CodecError::new(
                    format!("expected a project file, found {}", entry.kind()),
                    FormatKind::PROJECT,
                ),
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entries(&self) -> &[ProjectEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&ProjectEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Add entries for files not yet in the project. Files whose format
    /// cannot be resolved are logged and skipped. Returns the number added.
    pub fn add_files<P: AsRef<Path>>(&mut self, registry: &EntryRegistry, paths: &[P]) -> usize {
        let mut added = 0;

        for path in paths {
            let path = absolute(path.as_ref());

            if self.entries.iter().any(|e| e.path.as_deref() == Some(path.as_path())) {
                debug!("{:?} is already in the project", path);
                continue;
            }
            if !path.is_file() {
                warn!("Skipping {:?}: not a file", path);
                continue;
            }

            match registry.resolve(&path) {
                Ok(kind) => {
                    self.entries.push(ProjectEntry {
                        name: String::new(),
                        kind,
                        path: Some(path),
                    });
                    added += 1;
                }
                Err(e) => error!("Could not find an entry format for {:?}: {}", path, e),
            }
        }

        if added > 0 {
            self.assign_unique_names();
        }
        added
    }

    /// Add an entry that has no file yet.
    pub fn add_unsaved(&mut self, kind: FormatKind) {
        self.entries.push(ProjectEntry {
            name: String::new(),
            kind,
            path: None,
        });
        self.assign_unique_names();
    }

    pub fn remove(&mut self, name: &str) -> Option<ProjectEntry> {
        let index = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(index))
    }

    /// Rename every entry from the paths' common directory.
    pub fn assign_unique_names(&mut self) {
        let paths: Vec<Option<&Path>> = self.entries.iter().map(|e| e.path.as_deref()).collect();
        let names = assign_names(&paths, &self.unsaved_name);
        for (entry, name) in self.entries.iter_mut().zip(names) {
            entry.name = name;
        }
    }

    pub fn to_manifest(&self) -> ProjectManifest {
        let dir = self.path.as_deref().and_then(Path::parent);
        let mut manifest = ProjectManifest::new(self.version.clone());
        manifest.entries = self
            .entries
            .iter()
            .map(|entry| ProjectRecord {
                name: entry.name.clone(),
                kind: entry.kind.clone(),
                path: entry.path.as_deref().map(|p| stored_path(dir, p)),
            })
            .collect();
        manifest
    }

    /// The project as an entry ready to be saved or shown by activities.
    pub fn to_entry(&self, registry: &EntryRegistry) -> Entry {
        let format = registry
            .get(&FormatKind::project())
            .unwrap_or_else(|| Arc::new(ProjectFormat::new()));
        let mut entry = Entry::new(self.path.clone(), format);
        entry.set_data(EntryData::Project(self.to_manifest()));
        entry
    }

    pub fn save(&self, registry: &EntryRegistry, overwrite: bool) -> EntryResult<()> {
        let mut entry = self.to_entry(registry);
        entry.save(overwrite)?;
        info!("Saved project with {} entries to {:?}", self.entries.len(), self.path);
        Ok(())
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn stored_path(project_dir: Option<&Path>, path: &Path) -> String {
    project_dir
        .and_then(|dir| path.strip_prefix(dir).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_paths_resolve_against_project_dir() {
        let dir = Path::new("/data/projects");
        assert_eq!(
            resolve_record_path(Some(dir), "run1/a.csv"),
            PathBuf::from("/data/projects/run1/a.csv")
        );
        assert_eq!(resolve_record_path(Some(dir), "/abs/a.csv"), PathBuf::from("/abs/a.csv"));
        assert_eq!(resolve_record_path(None, "a.csv"), PathBuf::from("a.csv"));
    }

    #[test]
    fn manifest_paths_are_relative_below_project_dir() {
        let mut project = Project::new(
            Some(PathBuf::from("/data/demo.xamin")),
            &ProjectSettings::default(),
        );
        project.entries.push(ProjectEntry {
            name: String::new(),
            kind: FormatKind::csv(),
            path: Some(PathBuf::from("/data/run1/a.csv")),
        });
        project.entries.push(ProjectEntry {
            name: String::new(),
            kind: FormatKind::text(),
            path: Some(PathBuf::from("/elsewhere/b.txt")),
        });
        project.add_unsaved(FormatKind::text());

        let manifest = project.to_manifest();
        let paths: Vec<Option<&str>> = manifest.entries.iter().map(|r| r.path.as_deref()).collect();
        assert_eq!(paths, vec![Some("run1/a.csv"), Some("/elsewhere/b.txt"), None]);
        assert_eq!(manifest.entries[2].name, "<unsaved> (3)");
    }
}
