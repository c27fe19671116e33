use crate::entries::{Entry, EntryId, EntryRegistry, EntryResult, SaveJob};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Outcome of a job run off the owning task.
pub(crate) enum WorkerResult {
    Loaded {
        id: EntryId,
        path: PathBuf,
        result: EntryResult<Entry>,
    },
    Saved {
        id: EntryId,
        hash: String,
        result: EntryResult<Option<SystemTime>>,
    },
}

pub(crate) fn spawn_load(
    registry: Arc<EntryRegistry>,
    id: EntryId,
    path: PathBuf,
    tx: UnboundedSender<WorkerResult>,
) {
    tokio::task::spawn_blocking(move || {
        debug!("Loading {:?} in the background as entry {}", path, id);
        let result = registry.load(&path);
        if tx.send(WorkerResult::Loaded { id, path, result }).is_err() {
            debug!("Session closed before entry {} finished loading", id);
        }
    });
}

pub(crate) fn spawn_save(id: EntryId, job: SaveJob, tx: UnboundedSender<WorkerResult>) {
    tokio::task::spawn_blocking(move || {
        debug!("Saving entry {} to {:?} in the background", id, job.path);
        let result = job.write();
        let hash = job.hash;
        if tx.send(WorkerResult::Saved { id, hash, result }).is_err() {
            debug!("Session closed before entry {} finished saving", id);
        }
    });
}
