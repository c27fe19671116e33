use crate::activities::{
    builtin_descriptors, fallback_descriptor, ActivityDescriptor, ActivityError, ActivityResult,
};
use crate::settings::ActivitySettings;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};
use xamin_core::FormatKind;

type Snapshot = Arc<Vec<Arc<ActivityDescriptor>>>;

/// Maps format kinds to the activities able to operate on them.
///
/// Descriptors are kept sorted by priority (higher first), ties in
/// registration order. Registration replaces the list rather than mutating
/// it, so sequences handed out earlier keep their view.
pub struct ActivityDispatcher {
    descriptors: RwLock<Snapshot>,
    fallback: Arc<ActivityDescriptor>,
}

impl ActivityDispatcher {
    pub fn new() -> Self {
        Self {
            descriptors: RwLock::new(Arc::new(Vec::new())),
            fallback: Arc::new(fallback_descriptor()),
        }
    }

    /// A dispatcher holding the built-in activities.
    pub fn with_builtins(settings: &ActivitySettings) -> Self {
        let dispatcher = Self::new();
        for descriptor in builtin_descriptors(settings) {
            // Built-in names are distinct
            if let Err(e) = dispatcher.register(descriptor) {
                debug!("Skipping built-in activity: {}", e);
            }
        }
        info!("Registered {} activities", dispatcher.descriptors.read().len());
        dispatcher
    }

    pub fn register(&self, descriptor: ActivityDescriptor) -> ActivityResult<()> {
        let mut guard = self.descriptors.write();

        if guard.iter().any(|d| d.same_capability(&descriptor)) {
            return Err(ActivityError::DuplicateActivity {
                name: descriptor.name().to_string(),
                kinds: descriptor.kinds_label(),
            });
        }

        let position = guard
            .iter()
            .position(|d| d.priority() < descriptor.priority())
            .unwrap_or(guard.len());

        debug!(
            "Registering activity '{}' for [{}] with priority {}",
            descriptor.name(),
            descriptor.kinds_label(),
            descriptor.priority()
        );

        let mut updated: Vec<Arc<ActivityDescriptor>> = guard.iter().cloned().collect();
        updated.insert(position, Arc::new(descriptor));
        *guard = Arc::new(updated);
        Ok(())
    }

    /// Activities accepting `kind`, best first. Empty means the fallback
    /// should be used.
    pub fn activities_for(&self, kind: &FormatKind) -> ActivitiesFor {
        ActivitiesFor {
            snapshot: self.descriptors.read().clone(),
            kind: kind.clone(),
        }
    }

    pub fn fallback(&self) -> Arc<ActivityDescriptor> {
        self.fallback.clone()
    }

    /// All registered descriptors in dispatch order.
    pub fn descriptors(&self) -> Vec<Arc<ActivityDescriptor>> {
        self.descriptors.read().iter().cloned().collect()
    }
}

impl Default for ActivityDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// The activities matching one kind.
///
/// Nothing is filtered up front; each call to [`ActivitiesFor::iter`] walks
/// the registration snapshot again.
#[derive(Clone)]
pub struct ActivitiesFor {
    snapshot: Snapshot,
    kind: FormatKind,
}

impl ActivitiesFor {
    pub fn kind(&self) -> &FormatKind {
        &self.kind
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ActivityDescriptor>> + '_ {
        self.snapshot.iter().filter(move |d| d.accepts(&self.kind))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|d| d.name().to_string()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&Arc<ActivityDescriptor>> {
        self.iter().find(|d| d.name() == name)
    }
}

impl<'a> IntoIterator for &'a ActivitiesFor {
    type Item = &'a Arc<ActivityDescriptor>;
    type IntoIter = Box<dyn Iterator<Item = &'a Arc<ActivityDescriptor>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::{Activity, RawView};
    use crate::entries::EntryHandle;

    fn descriptor(name: &str, kinds: &[&str], priority: i32) -> ActivityDescriptor {
        ActivityDescriptor::new(
            name,
            kinds.iter().map(|k| FormatKind::new(*k)),
            priority,
            |entry: EntryHandle| RawView::new(entry).map(|v| Box::new(v) as Box<dyn Activity>),
        )
    }

    #[test]
    fn ordered_by_priority_then_registration() {
        let dispatcher = ActivityDispatcher::new();
        dispatcher.register(descriptor("low", &["csv"], 1)).unwrap();
        dispatcher.register(descriptor("first", &["csv"], 5)).unwrap();
        dispatcher.register(descriptor("second", &["csv"], 5)).unwrap();
        dispatcher.register(descriptor("high", &["csv", "text"], 9)).unwrap();
        dispatcher.register(descriptor("other", &["text"], 7)).unwrap();

        let names = dispatcher.activities_for(&FormatKind::csv()).names();
        assert_eq!(names, vec!["high", "first", "second", "low"]);
    }

    #[test]
    fn duplicate_is_rejected_but_other_kinds_are_not() {
        let dispatcher = ActivityDispatcher::new();
        dispatcher.register(descriptor("viewer", &["csv"], 1)).unwrap();
        assert!(matches!(
            dispatcher.register(descriptor("viewer", &["csv"], 3)),
            Err(ActivityError::DuplicateActivity { .. })
        ));
        dispatcher.register(descriptor("viewer", &["text"], 1)).unwrap();
        assert_eq!(dispatcher.descriptors().len(), 2);
    }

    #[test]
    fn sequence_is_restartable_and_keeps_its_snapshot() {
        let dispatcher = ActivityDispatcher::new();
        dispatcher.register(descriptor("a", &["csv"], 1)).unwrap();

        let activities = dispatcher.activities_for(&FormatKind::csv());
        dispatcher.register(descriptor("b", &["csv"], 2)).unwrap();

        assert_eq!(activities.iter().count(), 1);
        assert_eq!(activities.iter().count(), 1);
        assert_eq!(dispatcher.activities_for(&FormatKind::csv()).names(), vec!["b", "a"]);
    }

    #[test]
    fn unknown_kind_is_empty_with_fallback() {
        let dispatcher = ActivityDispatcher::with_builtins(&ActivitySettings::default());
        assert!(dispatcher.activities_for(&FormatKind::new("xyz")).is_empty());
        assert_eq!(dispatcher.fallback().name(), "raw-view");
    }

    #[test]
    fn builtin_dispatch() {
        let dispatcher = ActivityDispatcher::with_builtins(&ActivitySettings::default());
        assert_eq!(dispatcher.activities_for(&FormatKind::csv()).names(), vec!["table-view"]);
        assert_eq!(
            dispatcher.activities_for(&FormatKind::yaml()).names(),
            vec!["code-editor", "tree-view"]
        );
        assert_eq!(
            dispatcher.activities_for(&FormatKind::project()).names(),
            vec!["project-explorer", "tree-view"]
        );
    }
}
