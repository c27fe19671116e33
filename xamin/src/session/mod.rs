mod worker;

use crate::activities::{Activity, ActivityError};
use crate::dispatcher::{ActivitiesFor, ActivityDispatcher};
use crate::entries::{locator, EntryError, EntryHandle, EntryId, EntryRegistry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use worker::WorkerResult;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    Activity(#[from] ActivityError),

    #[error("No open entry {0}")]
    UnknownEntry(EntryId),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Results of background work, applied by [`Session::next_event`].
#[derive(Debug)]
pub enum SessionEvent {
    Opened(EntryId),
    LoadFailed {
        id: EntryId,
        path: PathBuf,
        error: EntryError,
    },
    Saved(EntryId),
    SaveFailed {
        id: EntryId,
        error: EntryError,
    },
    /// The entry was closed before its load or save finished.
    Discarded(EntryId),
}

struct OpenEntry {
    handle: EntryHandle,
    identity: PathBuf,
    activities: Vec<Box<dyn Activity>>,
}

/// Open entries and their active activities.
///
/// A session is owned by one task. Background loads and saves run on the
/// blocking pool and only change the session once that task calls
/// [`Session::next_event`].
pub struct Session {
    registry: Arc<EntryRegistry>,
    dispatcher: Arc<ActivityDispatcher>,
    entries: HashMap<EntryId, OpenEntry>,
    by_path: HashMap<PathBuf, EntryId>,
    loading: HashMap<EntryId, PathBuf>,
    next_id: u64,
    events_tx: mpsc::UnboundedSender<WorkerResult>,
    events_rx: mpsc::UnboundedReceiver<WorkerResult>,
    ready: Vec<SessionEvent>,
}

impl Session {
    pub fn new(registry: Arc<EntryRegistry>, dispatcher: Arc<ActivityDispatcher>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            registry,
            dispatcher,
            entries: HashMap::new(),
            by_path: HashMap::new(),
            loading: HashMap::new(),
            next_id: 1,
            events_tx,
            events_rx,
            ready: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Arc<EntryRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<ActivityDispatcher> {
        &self.dispatcher
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    fn find(&self, identity: &Path) -> Option<EntryId> {
        self.by_path.get(identity).copied().or_else(|| {
            self.loading
                .iter()
                .find(|(_, path)| *path == identity)
                .map(|(id, _)| *id)
        })
    }

    /// Open and load a locator. An already-open (or loading) locator returns
    /// its entry.
    pub fn open(&mut self, locator: &str) -> SessionResult<EntryId> {
        let path = locator::to_path(locator)?;
        let identity = locator::identity(&path);

        if let Some(id) = self.find(&identity) {
            debug!("{} is already open as entry {}", locator, id);
            return Ok(id);
        }

        let entry = self.registry.load(&path)?;
        let id = self.allocate_id();
        self.insert(id, identity, EntryHandle::new(id, entry));
        info!("Opened {:?} as entry {}", path, id);
        Ok(id)
    }

    /// Start loading a locator on the blocking pool. The result arrives as
    /// [`SessionEvent::Opened`] or [`SessionEvent::LoadFailed`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn open_in_background(&mut self, locator: &str) -> SessionResult<EntryId> {
        let path = locator::to_path(locator)?;
        let identity = locator::identity(&path);

        if let Some(id) = self.find(&identity) {
            if self.entries.contains_key(&id) {
                self.ready.push(SessionEvent::Opened(id));
            }
            return Ok(id);
        }

        let id = self.allocate_id();
        self.loading.insert(id, identity);
        worker::spawn_load(self.registry.clone(), id, path, self.events_tx.clone());
        Ok(id)
    }

    fn insert(&mut self, id: EntryId, identity: PathBuf, handle: EntryHandle) {
        self.by_path.insert(identity.clone(), id);
        self.entries.insert(
            id,
            OpenEntry {
                handle,
                identity,
                activities: Vec::new(),
            },
        );
    }

    pub fn entry(&self, id: EntryId) -> SessionResult<EntryHandle> {
        self.entries
            .get(&id)
            .map(|e| e.handle.clone())
            .ok_or(SessionError::UnknownEntry(id))
    }

    /// Ids of open entries in opening order.
    pub fn entries(&self) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn is_loading(&self, id: EntryId) -> bool {
        self.loading.contains_key(&id)
    }

    pub fn save(&mut self, id: EntryId, overwrite: bool) -> SessionResult<()> {
        let handle = self.entry(id)?;
        handle.write().save(overwrite)?;
        Ok(())
    }

    /// Encode the current data and write it on the blocking pool. Only the
    /// encoded snapshot is marked saved once [`SessionEvent::Saved`] arrives.
    ///
    /// Must be called from within a tokio runtime.
    pub fn save_in_background(&mut self, id: EntryId, overwrite: bool) -> SessionResult<()> {
        let handle = self.entry(id)?;
        let job = handle.read().prepare_save(overwrite)?;
        worker::spawn_save(id, job, self.events_tx.clone());
        Ok(())
    }

    /// Close an entry and deactivate its activities. Unsaved changes are
    /// dropped with a warning.
    pub fn close(&mut self, id: EntryId) -> SessionResult<()> {
        if self.loading.remove(&id).is_some() {
            debug!("Closed entry {} while it was loading", id);
            return Ok(());
        }

        let mut open = self.entries.remove(&id).ok_or(SessionError::UnknownEntry(id))?;
        self.by_path.remove(&open.identity);

        for activity in open.activities.iter_mut() {
            activity.deactivate();
        }

        if open.handle.read().is_dirty() {
            warn!("Closed entry {} with unsaved changes", id);
        }
        info!("Closed entry {}", id);
        Ok(())
    }

    /// Wait for the next background result and apply it.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if !self.ready.is_empty() {
            return Some(self.ready.remove(0));
        }
        let result = self.events_rx.recv().await?;
        Some(self.apply(result))
    }

    /// Apply a background result that is already available, if any.
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        if !self.ready.is_empty() {
            return Some(self.ready.remove(0));
        }
        let result = self.events_rx.try_recv().ok()?;
        Some(self.apply(result))
    }

    fn apply(&mut self, result: WorkerResult) -> SessionEvent {
        match result {
            WorkerResult::Loaded { id, path, result } => {
                let Some(identity) = self.loading.remove(&id) else {
                    return SessionEvent::Discarded(id);
                };
                match result {
                    Ok(entry) => {
                        self.insert(id, identity, EntryHandle::new(id, entry));
                        info!("Opened {:?} as entry {}", path, id);
                        SessionEvent::Opened(id)
                    }
                    Err(error) => SessionEvent::LoadFailed { id, path, error },
                }
            }
            WorkerResult::Saved { id, hash, result } => {
                let Some(open) = self.entries.get(&id) else {
                    return SessionEvent::Discarded(id);
                };
                match result {
                    Ok(mtime) => {
                        open.handle.write().finish_save(hash, mtime);
                        open.handle.notify();
                        SessionEvent::Saved(id)
                    }
                    Err(error) => SessionEvent::SaveFailed { id, error },
                }
            }
        }
    }

    /// Activities able to operate on an entry; empty means the fallback.
    pub fn activities_for(&self, id: EntryId) -> SessionResult<ActivitiesFor> {
        let handle = self.entry(id)?;
        let kind = handle.read().kind();
        Ok(self.dispatcher.activities_for(&kind))
    }

    /// Create and activate an activity on an entry: the named one, or the
    /// best available, or the fallback viewer if none accepts the kind.
    pub fn open_activity(
        &mut self,
        id: EntryId,
        name: Option<&str>,
    ) -> SessionResult<&mut Box<dyn Activity>> {
        let handle = self.entry(id)?;
        let kind = handle.read().kind();
        let available = self.dispatcher.activities_for(&kind);
        let fallback = self.dispatcher.fallback();

        let descriptor = match name {
            Some(name) if name == fallback.name() => fallback,
            Some(name) => available.find(name).cloned().ok_or_else(|| {
                ActivityError::Incompatible {
                    activity: name.to_string(),
                    kind: kind.clone(),
                }
            })?,
            None => available.iter().next().cloned().unwrap_or(fallback),
        };

        let mut activity = descriptor.create(handle)?;
        activity.activate()?;
        debug!("Activated {} on entry {}", descriptor.name(), id);

        let open = self.entries.get_mut(&id).ok_or(SessionError::UnknownEntry(id))?;
        open.activities.push(activity);
        let index = open.activities.len() - 1;
        Ok(&mut open.activities[index])
    }

    /// Summaries of the active activities of an entry.
    pub fn active_activities(&self, id: EntryId) -> SessionResult<Vec<String>> {
        let open = self.entries.get(&id).ok_or(SessionError::UnknownEntry(id))?;
        Ok(open.activities.iter().map(|a| a.describe()).collect())
    }

    /// Deactivate and drop one activity of an entry by name.
    pub fn close_activity(&mut self, id: EntryId, name: &str) -> SessionResult<bool> {
        let open = self.entries.get_mut(&id).ok_or(SessionError::UnknownEntry(id))?;
        match open.activities.iter().position(|a| a.name() == name) {
            Some(index) => {
                let mut activity = open.activities.remove(index);
                activity.deactivate();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for open in self.entries.values_mut() {
            for activity in open.activities.iter_mut() {
                activity.deactivate();
            }
        }
    }
}
