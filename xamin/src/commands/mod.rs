use crate::activities::ActivityInfo;
use crate::dispatcher::ActivityDispatcher;
use crate::entries::{EntryId, EntryRegistry, FormatInfo};
use crate::project::{Project, ProjectEntry};
use crate::session::{Session, SessionEvent, SessionResult};
use crate::settings::{ProjectSettings, Settings};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use xamin_core::FormatKind;

/// Registries shared by the session and every command.
pub struct App {
    pub settings: Settings,
    pub registry: Arc<EntryRegistry>,
    pub dispatcher: Arc<ActivityDispatcher>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let registry = Arc::new(EntryRegistry::with_settings(&settings.entries));
        let dispatcher = Arc::new(ActivityDispatcher::with_builtins(&settings.activities));
        Self {
            settings,
            registry,
            dispatcher,
        }
    }

    pub fn session(&self) -> Session {
        Session::new(self.registry.clone(), self.dispatcher.clone())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenReport {
    pub locator: String,
    pub path: Option<PathBuf>,
    pub kind: FormatKind,
    pub shape: Vec<usize>,
    pub modified: Option<DateTime<Utc>>,
    pub activities: Vec<String>,
    pub fallback: Option<String>,
    pub summary: String,
}

impl fmt::Display for OpenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} {:?}", self.locator, self.kind, self.shape)?;
        if let Some(modified) = &self.modified {
            writeln!(f, "  modified: {}", modified.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        match &self.fallback {
            Some(fallback) => writeln!(f, "  activities: none (fallback: {})", fallback)?,
            None => writeln!(f, "  activities: {}", self.activities.join(", "))?,
        }
        write!(f, "  {}", self.summary)
    }
}

/// Outcome of opening one locator. Failures carry the rendered error.
pub type OpenOutcome = std::result::Result<OpenReport, String>;

/// Open every locator in the background and report on each, in order.
pub async fn open_all(session: &mut Session, locators: &[String]) -> Vec<OpenOutcome> {
    let mut outcomes: Vec<Option<OpenOutcome>> = locators.iter().map(|_| None).collect();
    let mut pending: HashMap<EntryId, Vec<usize>> = HashMap::new();

    for (i, locator) in locators.iter().enumerate() {
        match session.open_in_background(locator) {
            Ok(id) => pending.entry(id).or_default().push(i),
            Err(e) => outcomes[i] = Some(Err(e.to_string())),
        }
    }

    while !pending.is_empty() {
        let Some(event) = session.next_event().await else {
            break;
        };
        debug!("Session event: {:?}", event);

        match event {
            SessionEvent::Opened(id) => {
                for i in pending.remove(&id).unwrap_or_default() {
                    outcomes[i] = Some(report(session, &locators[i], id).map_err(|e| e.to_string()));
                }
            }
            SessionEvent::LoadFailed { id, error, .. } => {
                for i in pending.remove(&id).unwrap_or_default() {
                    outcomes[i] = Some(Err(error.to_string()));
                }
            }
            SessionEvent::Discarded(id) => {
                for i in pending.remove(&id).unwrap_or_default() {
                    outcomes[i] = Some(Err("closed before it finished loading".to_string()));
                }
            }
            SessionEvent::Saved(_) | SessionEvent::SaveFailed { .. } => {}
        }
    }

    outcomes
        .into_iter()
        .map(|o| o.unwrap_or_else(|| Err("no result".to_string())))
        .collect()
}

/// Describe an open entry and start its preferred activity.
pub fn report(session: &mut Session, locator: &str, id: EntryId) -> SessionResult<OpenReport> {
    let handle = session.entry(id)?;
    let (path, kind, shape, modified) = {
        let entry = handle.read();
        (
            entry.path().map(Path::to_path_buf),
            entry.kind(),
            entry.shape(),
            entry.modified().map(DateTime::<Utc>::from),
        )
    };

    let activities = session.activities_for(id)?.names();
    let fallback = if activities.is_empty() {
        Some(session.dispatcher().fallback().name().to_string())
    } else {
        None
    };
    let summary = session.open_activity(id, None)?.describe();

    Ok(OpenReport {
        locator: locator.to_string(),
        path,
        kind,
        shape,
        modified,
        activities,
        fallback,
        summary,
    })
}

pub fn list_formats(registry: &EntryRegistry) -> Vec<FormatInfo> {
    registry.formats()
}

pub fn render_format(format: &FormatInfo) -> String {
    format!(
        "{:<10} {:<24} score {:>3}  {}",
        format.kind,
        format.extensions.join(", "),
        format.score,
        if format.exact_round_trip { "exact" } else { "lossy" }
    )
}

/// Registered activities in dispatch order.
pub fn list_activities(dispatcher: &ActivityDispatcher) -> Vec<ActivityInfo> {
    dispatcher.descriptors().iter().map(|d| d.info()).collect()
}

pub fn render_activity(activity: &ActivityInfo) -> String {
    let kinds: Vec<&str> = activity.kinds.iter().map(FormatKind::as_str).collect();
    format!(
        "{:<18} priority {:>3}  {}",
        activity.name,
        activity.priority,
        kinds.join(", ")
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub path: PathBuf,
    pub version: String,
    pub entries: Vec<ProjectEntry>,
}

impl ProjectReport {
    fn of(project: &Project, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            version: project.version().to_string(),
            entries: project.entries().to_vec(),
        }
    }
}

impl fmt::Display for ProjectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (version {})", self.path.display(), self.version)?;
        for entry in &self.entries {
            let path = entry
                .path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            write!(f, "\n  {:<24} {:<8} {}", entry.name, entry.kind, path)?;
        }
        Ok(())
    }
}

/// Create a project file listing `files`.
pub fn new_project(
    registry: &EntryRegistry,
    settings: &ProjectSettings,
    project_path: &Path,
    files: &[PathBuf],
) -> Result<ProjectReport> {
    if project_path.exists() {
        bail!("{} already exists", project_path.display());
    }

    let project_path = crate::entries::locator::to_path(&project_path.to_string_lossy())
        .context("Invalid project path")?;

    let mut project = Project::new(Some(project_path.clone()), settings);
    let added = project.add_files(registry, files);
    if added == 0 {
        bail!("None of the given files could be added to the project");
    }

    project
        .save(registry, false)
        .with_context(|| format!("Failed to save project {}", project_path.display()))?;

    Ok(ProjectReport::of(&project, &project_path))
}

pub fn show_project(
    registry: &EntryRegistry,
    settings: &ProjectSettings,
    project_path: &Path,
) -> Result<ProjectReport> {
    let project = Project::load(registry, project_path, settings)
        .with_context(|| format!("Failed to open project {}", project_path.display()))?;
    Ok(ProjectReport::of(&project, project_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn format_listing_marks_lossy_formats() {
        let app = App::new(Settings::default());
        let lines: Vec<String> = list_formats(&app.registry).iter().map(render_format).collect();
        assert!(lines.iter().any(|l| l.starts_with("csv") && l.ends_with("lossy")));
        assert!(lines.iter().any(|l| l.starts_with("text") && l.ends_with("exact")));
    }

    #[test]
    fn activity_listing_in_dispatch_order() {
        let app = App::new(Settings::default());
        let names: Vec<String> = list_activities(&app.dispatcher)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names[0], "project-explorer");
        assert_eq!(names.last().map(String::as_str), Some("tree-view"));
    }

    #[tokio::test]
    async fn open_all_reports_each_locator_in_order() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("data.csv");
        let xyz = dir.path().join("data.xyz");
        std::fs::write(&csv, "a,b\n1,2\n").unwrap();
        std::fs::write(&xyz, "?").unwrap();

        let app = App::new(Settings::default());
        let mut session = app.session();
        let locators = vec![
            csv.display().to_string(),
            xyz.display().to_string(),
            dir.path().join("missing.txt").display().to_string(),
            csv.display().to_string(),
        ];
        let outcomes = open_all(&mut session, &locators).await;

        assert_eq!(outcomes.len(), 4);
        let report = outcomes[0].as_ref().unwrap();
        assert_eq!(report.kind, FormatKind::csv());
        assert_eq!(report.activities, vec!["table-view".to_string()]);
        assert!(outcomes[1].as_ref().unwrap_err().contains("data.xyz"));
        assert!(outcomes[2].is_err());
        assert!(outcomes[3].is_ok());
        assert_eq!(session.entries().len(), 1);
    }

    #[test]
    fn project_new_then_show() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "hello").unwrap();
        std::fs::write(&b, "x,y\n1,2\n").unwrap();
        let unknown = dir.path().join("c.xyz");
        std::fs::write(&unknown, "?").unwrap();

        let app = App::new(Settings::default());
        let project_path = dir.path().join("demo.xamin");
        let created = new_project(
            &app.registry,
            &app.settings.project,
            &project_path,
            &[a, b, unknown],
        )
        .unwrap();
        assert_eq!(created.entries.len(), 2);

        let shown = show_project(&app.registry, &app.settings.project, &project_path).unwrap();
        let names: Vec<&str> = shown.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.csv"]);
        assert!(shown.to_string().contains("b.csv"));

        assert!(new_project(&app.registry, &app.settings.project, &project_path, &[]).is_err());
    }
}
