use crate::entries::{EntryError, EntryHandle};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use xamin_core::{CodecError, FormatKind};

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Activity '{name}' is already registered for [{kinds}]")]
    DuplicateActivity { name: String, kinds: String },

    #[error("Activity '{activity}' cannot operate on {kind} entries")]
    Incompatible { activity: String, kind: FormatKind },

    #[error("Activity '{activity}' rejected the edit: {source}")]
    Invalid {
        activity: String,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Entry(#[from] EntryError),
}

pub type ActivityResult<T> = Result<T, ActivityError>;

/// A headless view controller bound to one entry.
pub trait Activity: Send + Sync {
    fn name(&self) -> &str;

    fn entry(&self) -> &EntryHandle;

    /// One-line summary of what the activity currently shows.
    fn describe(&self) -> String;

    /// Called once the activity is attached to its entry in a session.
    fn activate(&mut self) -> ActivityResult<()> {
        if self.entry().read().is_loaded() {
            Ok(())
        } else {
            Err(EntryError::NotLoaded.into())
        }
    }

    /// Called when the activity is closed. Editing activities give up the
    /// entry's writer slot here.
    fn deactivate(&mut self) {}
}

/// Builds an activity for an entry.
pub trait ActivityFactory: Send + Sync {
    fn create(&self, entry: EntryHandle) -> ActivityResult<Box<dyn Activity>>;
}

impl<F> ActivityFactory for F
where
    F: Fn(EntryHandle) -> ActivityResult<Box<dyn Activity>> + Send + Sync,
{
    fn create(&self, entry: EntryHandle) -> ActivityResult<Box<dyn Activity>> {
        self(entry)
    }
}

/// A registered activity capability.
#[derive(Clone)]
pub struct ActivityDescriptor {
    name: String,
    kinds: BTreeSet<FormatKind>,
    priority: i32,
    factory: Arc<dyn ActivityFactory>,
}

impl ActivityDescriptor {
    pub fn new(
        name: impl Into<String>,
        kinds: impl IntoIterator<Item = FormatKind>,
        priority: i32,
        factory: impl ActivityFactory + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kinds: kinds.into_iter().collect(),
            priority,
            factory: Arc::new(factory),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kinds(&self) -> &BTreeSet<FormatKind> {
        &self.kinds
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn accepts(&self, kind: &FormatKind) -> bool {
        self.kinds.contains(kind)
    }

    /// Same name over the same set of kinds.
    pub fn same_capability(&self, other: &ActivityDescriptor) -> bool {
        self.name == other.name && self.kinds == other.kinds
    }

    pub fn create(&self, entry: EntryHandle) -> ActivityResult<Box<dyn Activity>> {
        self.factory.create(entry)
    }

    pub fn info(&self) -> ActivityInfo {
        ActivityInfo {
            name: self.name.clone(),
            kinds: self.kinds.iter().cloned().collect(),
            priority: self.priority,
        }
    }

    pub(crate) fn kinds_label(&self) -> String {
        self.kinds
            .iter()
            .map(FormatKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Debug for ActivityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityDescriptor")
            .field("name", &self.name)
            .field("kinds", &self.kinds)
            .field("priority", &self.priority)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityInfo {
    pub name: String,
    pub kinds: Vec<FormatKind>,
    pub priority: i32,
}
