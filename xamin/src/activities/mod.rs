mod code_editor;
mod hex_view;
mod project_explorer;
mod raw_view;
mod table_view;
mod traits;
mod tree_view;

pub use code_editor::CodeEditor;
pub use hex_view::{hex_dump, HexView};
pub use project_explorer::{ExplorerItem, ProjectExplorer};
pub use raw_view::RawView;
pub use table_view::TableView;
pub use traits::{
    Activity, ActivityDescriptor, ActivityError, ActivityFactory, ActivityInfo, ActivityResult,
};
pub use tree_view::TreeView;

use crate::entries::EntryHandle;
use crate::settings::ActivitySettings;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use xamin_core::FormatKind;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Unique owner name for one activity instance, e.g. `table-view#3`.
fn instance_label(name: &str) -> String {
    format!("{}#{}", name, NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
}

fn ensure_kind(activity: &str, entry: &EntryHandle, kinds: &[FormatKind]) -> ActivityResult<()> {
    let kind = entry.read().kind();
    if kinds.contains(&kind) {
        Ok(())
    } else {
        Err(ActivityError::Incompatible {
            activity: activity.to_string(),
            kind,
        })
    }
}

fn boxed<A: Activity + 'static>(activity: ActivityResult<A>) -> ActivityResult<Box<dyn Activity>> {
    activity.map(|a| Box::new(a) as Box<dyn Activity>)
}

/// The built-in activities, minus those disabled in settings and with
/// configured priority overrides applied.
pub fn builtin_descriptors(settings: &ActivitySettings) -> Vec<ActivityDescriptor> {
    let all = vec![
        ActivityDescriptor::new(
            code_editor::NAME,
            [FormatKind::text(), FormatKind::yaml()],
            10,
            |entry: EntryHandle| boxed(CodeEditor::new(entry)),
        ),
        ActivityDescriptor::new(table_view::NAME, [FormatKind::csv()], 10, |entry: EntryHandle| {
            boxed(TableView::new(entry))
        }),
        ActivityDescriptor::new(
            tree_view::NAME,
            [FormatKind::yaml(), FormatKind::project()],
            5,
            |entry: EntryHandle| boxed(TreeView::new(entry)),
        ),
        ActivityDescriptor::new(hex_view::NAME, [FormatKind::binary()], 10, |entry: EntryHandle| {
            boxed(HexView::new(entry))
        }),
        ActivityDescriptor::new(
            project_explorer::NAME,
            [FormatKind::project()],
            20,
            |entry: EntryHandle| boxed(ProjectExplorer::new(entry)),
        ),
    ];

    all.into_iter()
        .filter(|d| {
            let disabled = settings.disabled.contains(d.name());
            if disabled {
                debug!("Activity '{}' disabled in settings", d.name());
            }
            !disabled
        })
        .map(|d| match settings.priorities.get(d.name()) {
            Some(&priority) => d.with_priority(priority),
            None => d,
        })
        .collect()
}

/// The generic viewer used when no registered activity accepts a kind.
pub fn fallback_descriptor() -> ActivityDescriptor {
    ActivityDescriptor::new(raw_view::NAME, Vec::new(), 0, |entry: EntryHandle| boxed(RawView::new(entry)))
}
