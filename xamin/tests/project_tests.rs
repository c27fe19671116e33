use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use xamin::activities::ProjectExplorer;
use xamin::dispatcher::ActivityDispatcher;
use xamin::entries::EntryRegistry;
use xamin::project::Project;
use xamin::session::Session;
use xamin::settings::{ActivitySettings, ProjectSettings};
use xamin_core::FormatKind;

fn setup() -> (EntryRegistry, TempDir) {
    (EntryRegistry::new(), TempDir::new().unwrap())
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_add_files_skips_existing_and_unknown() {
    let (registry, dir) = setup();
    let a = write(&dir, "run1/spectrum.csv", "x,y\n1,2\n");
    let b = write(&dir, "run2/spectrum.csv", "x,y\n3,4\n");
    let unknown = write(&dir, "run2/readme.xyz", "?");

    let mut project = Project::new(Some(dir.path().join("demo.xamin")), &ProjectSettings::default());
    assert_eq!(project.add_files(&registry, &[a.clone(), unknown]), 1);
    assert_eq!(project.entries()[0].name, "spectrum.csv");

    assert_eq!(project.add_files(&registry, &[a.clone(), b.clone()]), 1);
    let names: Vec<&str> = project.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["run1/spectrum.csv", "run2/spectrum.csv"]);
    assert_eq!(project.entry("run2/spectrum.csv").map(|e| e.kind.clone()), Some(FormatKind::csv()));
}

#[test]
fn test_save_and_load_keep_relative_paths() {
    let (registry, dir) = setup();
    let a = write(&dir, "data/a.txt", "hello");
    let b = write(&dir, "data/b.yaml", "k: v\n");

    let project_path = dir.path().join("demo.xamin");
    let mut project = Project::new(Some(project_path.clone()), &ProjectSettings::default());
    project.add_files(&registry, &[a.clone(), b]);
    project.add_unsaved(FormatKind::text());
    project.save(&registry, false).unwrap();

    let saved = fs::read_to_string(&project_path).unwrap();
    assert!(saved.starts_with("!Project"));
    assert!(saved.contains("path: data/a.txt"));
    assert!(!saved.contains(&dir.path().display().to_string()));

    let loaded = Project::load(&registry, &project_path, &ProjectSettings::default()).unwrap();
    assert_eq!(loaded.entries().len(), 3);
    assert_eq!(loaded.entry("a.txt").and_then(|e| e.path.clone()), Some(a));
    assert_eq!(loaded.entries()[2].name, "<unsaved> (3)");
    assert_eq!(loaded.entries()[2].path, None);
}

#[test]
fn test_project_file_resolves_and_opens_explorer() {
    let (registry, dir) = setup();
    let a = write(&dir, "a.txt", "hello");
    let project_path = dir.path().join("demo.yaml");
    let mut project = Project::new(Some(project_path.clone()), &ProjectSettings::default());
    project.add_files(&registry, &[a]);
    project.save(&registry, false).unwrap();

    assert_eq!(registry.resolve(&project_path).unwrap(), FormatKind::project());

    let dispatcher = Arc::new(ActivityDispatcher::with_builtins(&ActivitySettings::default()));
    let mut session = Session::new(Arc::new(registry), dispatcher);
    let id = session.open(&project_path.to_string_lossy()).unwrap();

    let activity = session.open_activity(id, None).unwrap();
    assert_eq!(activity.name(), "project-explorer");
    assert_eq!(activity.describe(), "project-explorer: 1 entries");

    let explorer = ProjectExplorer::new(session.entry(id).unwrap()).unwrap();
    assert!(explorer.items().unwrap()[0].exists);
}

#[test]
fn test_loading_non_project_fails() {
    let (registry, dir) = setup();
    let path = write(&dir, "plain.yaml", "a: 1\nb: 2\n");
    assert!(Project::load(&registry, &path, &ProjectSettings::default()).is_err());
}

#[test]
fn test_custom_unsaved_name() {
    let settings = ProjectSettings {
        unsaved_name: "untitled-{num}".to_string(),
    };
    let mut project = Project::new(None, &settings);
    project.add_unsaved(FormatKind::csv());
    project.add_unsaved(FormatKind::text());
    let names: Vec<&str> = project.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["untitled-1", "untitled-2"]);
}
