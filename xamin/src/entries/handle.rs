use super::entry::Entry;
use super::traits::{EntryError, EntryResult};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use xamin_core::EntryData;

/// Session-wide identifier of an open entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared access to an open entry.
///
/// Any number of activities may read through clones of the handle. Data
/// changes go through [`EntryHandle::update`], which admits a single writer
/// at a time and bumps the revision watched by subscribers.
#[derive(Clone)]
pub struct EntryHandle {
    id: EntryId,
    entry: Arc<RwLock<Entry>>,
    writer: Arc<Mutex<Option<String>>>,
    revision: Arc<watch::Sender<u64>>,
}

impl EntryHandle {
    pub fn new(id: EntryId, entry: Entry) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            id,
            entry: Arc::new(RwLock::new(entry)),
            writer: Arc::new(Mutex::new(None)),
            revision: Arc::new(revision),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Entry> {
        self.entry.read()
    }

    /// Direct write access for load/save bookkeeping. Data edits should use
    /// [`EntryHandle::update`].
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Entry> {
        self.entry.write()
    }

    /// Run `f` against the loaded data.
    pub fn with_data<R>(&self, f: impl FnOnce(&EntryData) -> R) -> EntryResult<R> {
        let entry = self.entry.read();
        entry.data().map(f).ok_or(EntryError::NotLoaded)
    }

    /// Mutate the data on behalf of `owner`, claiming the writer slot if it
    /// is free.
    pub fn update<R>(&self, owner: &str, f: impl FnOnce(&mut EntryData) -> R) -> EntryResult<R> {
        self.update_if(owner, |data| (f(data), true))
    }

    /// Like [`EntryHandle::update`], but `f` also reports whether it changed
    /// anything. Subscribers are only notified of real changes.
    pub fn update_if<R>(
        &self,
        owner: &str,
        f: impl FnOnce(&mut EntryData) -> (R, bool),
    ) -> EntryResult<R> {
        if !self.entry.read().is_loaded() {
            return Err(EntryError::NotLoaded);
        }
        self.claim_writer(owner)?;

        let (result, changed) = {
            let mut entry = self.entry.write();
            f(entry.data_mut()?)
        };

        if changed {
            self.revision.send_modify(|r| *r += 1);
        }
        Ok(result)
    }

    pub fn claim_writer(&self, owner: &str) -> EntryResult<()> {
        let mut writer = self.writer.lock();
        match writer.as_deref() {
            Some(current) if current != owner => Err(EntryError::WriterBusy(current.to_string())),
            Some(_) => Ok(()),
            None => {
                debug!("{} claimed write access to entry {}", owner, self.id);
                *writer = Some(owner.to_string());
                Ok(())
            }
        }
    }

    /// Give up the writer slot if `owner` holds it.
    pub fn release_writer(&self, owner: &str) {
        let mut writer = self.writer.lock();
        if writer.as_deref() == Some(owner) {
            debug!("{} released write access to entry {}", owner, self.id);
            *writer = None;
        }
    }

    pub fn writer(&self) -> Option<String> {
        self.writer.lock().clone()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receive the revision number after every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Signal a change that did not go through [`EntryHandle::update`],
    /// such as a reload.
    pub(crate) fn notify(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::TextFormat;

    fn handle(text: &str) -> EntryHandle {
        let mut entry = Entry::new(None, Arc::new(TextFormat::new()));
        entry.set_data(EntryData::Text(text.into()));
        EntryHandle::new(EntryId(1), entry)
    }

    #[test]
    fn single_writer_at_a_time() {
        let handle = handle("abc");
        handle
            .update("editor#1", |d| *d = EntryData::Text("abcd".into()))
            .unwrap();

        let err = handle
            .update("editor#2", |d| *d = EntryData::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, EntryError::WriterBusy(owner) if owner == "editor#1"));

        handle.release_writer("editor#1");
        assert!(handle.update("editor#2", |_| ()).is_ok());
        assert_eq!(handle.writer().as_deref(), Some("editor#2"));
    }

    #[test]
    fn release_by_non_owner_is_ignored() {
        let handle = handle("abc");
        handle.claim_writer("editor#1").unwrap();
        handle.release_writer("viewer#9");
        assert_eq!(handle.writer().as_deref(), Some("editor#1"));
    }

    #[test]
    fn updates_bump_revision_and_are_visible_to_clones() {
        let handle = handle("abc");
        let reader = handle.clone();
        let mut changes = reader.subscribe();

        handle
            .update("editor#1", |d| *d = EntryData::Text("changed".into()))
            .unwrap();

        assert_eq!(handle.revision(), 1);
        assert!(changes.has_changed().unwrap());
        assert_eq!(
            reader.with_data(|d| d.as_text().map(str::to_string)).unwrap(),
            Some("changed".to_string())
        );
    }

    #[test]
    fn unloaded_entry_is_not_claimed() {
        let entry = Entry::new(Some("/nowhere/a.txt".into()), Arc::new(TextFormat::new()));
        let handle = EntryHandle::new(EntryId(2), entry);

        let err = handle.update("editor#1", |_| ()).unwrap_err();
        assert!(matches!(err, EntryError::NotLoaded));
        assert_eq!(handle.writer(), None);
        assert_eq!(handle.revision(), 0);
    }

    #[test]
    fn unchanged_update_does_not_notify() {
        let handle = handle("abc");
        let mut changes = handle.subscribe();

        let changed = handle.update_if("editor#1", |_| (false, false)).unwrap();
        assert!(!changed);
        assert_eq!(handle.revision(), 0);
        assert!(!changes.has_changed().unwrap());
    }
}
