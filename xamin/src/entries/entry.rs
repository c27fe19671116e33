use super::traits::{EntryError, EntryFormat, EntryResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};
use xamin_core::{EntryData, FormatKind};

/// One opened data source and its in-memory representation.
///
/// Data is loaded lazily: an entry created by
/// [`EntryRegistry::open`](super::EntryRegistry::open) holds no data until
/// [`Entry::load`] is called. Entries without a path start with the format's
/// default data and always count as dirty.
pub struct Entry {
    path: Option<PathBuf>,
    format: Arc<dyn EntryFormat>,
    data: Option<EntryData>,
    loaded_hash: Option<String>,
    data_mtime: Option<SystemTime>,
}

impl Entry {
    pub fn new(path: Option<PathBuf>, format: Arc<dyn EntryFormat>) -> Self {
        let data = match path {
            Some(_) => None,
            None => Some(format.default_data()),
        };

        Self {
            path,
            format,
            data,
            loaded_hash: None,
            data_mtime: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Point the entry at a new location. The next save writes there.
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.data_mtime = None;
    }

    pub fn kind(&self) -> FormatKind {
        self.format.kind()
    }

    pub fn format(&self) -> &Arc<dyn EntryFormat> {
        &self.format
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&EntryData> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> EntryResult<&mut EntryData> {
        self.data.as_mut().ok_or(EntryError::NotLoaded)
    }

    pub fn set_data(&mut self, data: EntryData) {
        self.data = Some(data);
    }

    pub fn shape(&self) -> Vec<usize> {
        self.data.as_ref().map(EntryData::shape).unwrap_or_default()
    }

    /// Hex SHA-256 of the current data, or an empty string if nothing is loaded.
    pub fn hash(&self) -> String {
        self.data.as_ref().map(content_hash).unwrap_or_default()
    }

    /// Unsaved changes: no path yet, or data differing from what was last
    /// loaded or saved.
    pub fn is_dirty(&self) -> bool {
        if self.path.is_none() {
            return true;
        }
        match (&self.loaded_hash, &self.data) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(loaded), Some(data)) => *loaded != content_hash(data),
        }
    }

    /// Whether the data should be (re)loaded from the file.
    pub fn is_stale(&self) -> bool {
        if !self.is_loaded() {
            return true;
        }
        self.is_file_newer()
    }

    /// Whether the file was modified after the data was loaded or saved.
    pub fn is_file_newer(&self) -> bool {
        let (Some(path), Some(loaded)) = (&self.path, self.data_mtime) else {
            return false;
        };
        modified(path).map(|m| m > loaded).unwrap_or(false)
    }

    /// Modification time of the file when the data was last loaded or saved.
    pub fn modified(&self) -> Option<SystemTime> {
        self.data_mtime
    }

    /// Read and decode the file.
    ///
    /// Refuses with [`EntryError::FileChanged`] when the file changed on disk
    /// while the loaded data has unsaved changes, since reloading would throw
    /// those changes away.
    pub fn load(&mut self) -> EntryResult<()> {
        let Some(path) = self.path.clone() else {
            if self.data.is_none() {
                self.data = Some(self.format.default_data());
            }
            debug!("Entry of kind {} has no path, using default data", self.kind());
            return Ok(());
        };

        if self.is_loaded() && self.is_file_newer() && self.is_dirty() {
            return Err(EntryError::FileChanged(path));
        }

        let mtime = modified(&path);
        let bytes = fs::read(&path).map_err(|e| EntryError::io(&path, e))?;
        let data = self
            .format
            .decode(&bytes)
            .map_err(|source| EntryError::Parse {
                path: path.clone(),
                source,
            })?;

        self.loaded_hash = Some(content_hash(&data));
        self.data = Some(data);
        self.data_mtime = mtime;

        debug!("Loaded {} entry from {:?} ({} bytes)", self.kind(), path, bytes.len());
        Ok(())
    }

    /// Encode the data and write it to the entry's path.
    ///
    /// The dirty flag is only cleared once the write succeeded.
    pub fn save(&mut self, overwrite: bool) -> EntryResult<()> {
        let job = self.prepare_save(overwrite)?;
        let mtime = job.write()?;
        info!("Saved {} entry to {:?}", self.kind(), job.path);
        self.finish_save(job.hash, mtime);
        Ok(())
    }

    /// Check and encode the data for a save that may run elsewhere.
    pub fn prepare_save(&self, overwrite: bool) -> EntryResult<SaveJob> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| EntryError::MissingPath(self.kind()))?;
        let data = self.data.as_ref().ok_or(EntryError::NotLoaded)?;

        if !overwrite && self.is_file_newer() {
            return Err(EntryError::FileChanged(path));
        }

        let bytes = self
            .format
            .encode(data)
            .map_err(|source| EntryError::Encode {
                kind: self.kind(),
                source,
            })?;

        Ok(SaveJob {
            path,
            bytes,
            hash: content_hash(data),
        })
    }

    /// Record a successful write of data with the given hash.
    ///
    /// Data edited after the job was prepared hashes differently and so stays
    /// dirty.
    pub fn finish_save(&mut self, hash: String, mtime: Option<SystemTime>) {
        self.loaded_hash = Some(hash);
        self.data_mtime = mtime;
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("path", &self.path)
            .field("kind", &self.kind())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Encoded content waiting to be written to disk.
pub struct SaveJob {
    pub path: PathBuf,
    pub hash: String,
    bytes: Vec<u8>,
}

impl SaveJob {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Write to a temporary sibling file, then rename it over the target so
    /// that a failure never leaves a truncated file behind.
    pub fn write(&self) -> EntryResult<Option<SystemTime>> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                EntryError::InvalidLocator(
                    self.path.display().to_string(),
                    "path has no file name".to_string(),
                )
            })?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        // One temp file per job
        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".xamin-tmp")
            .tempfile_in(dir)
            .map_err(|e| EntryError::io(&self.path, e))?;

        let result = (|| -> std::io::Result<()> {
            tmp.write_all(&self.bytes)?;
            tmp.as_file().sync_all()?;
            if let Ok(existing) = fs::metadata(&self.path) {
                fs::set_permissions(tmp.path(), existing.permissions())?;
            }
            Ok(())
        })();
        // `tmp` is removed on drop if anything failed
        result.map_err(|e| EntryError::io(&self.path, e))?;

        tmp.persist(&self.path)
            .map_err(|e| EntryError::io(&self.path, e.error))?;

        Ok(modified(&self.path))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn content_hash(data: &EntryData) -> String {
    let mut hasher = Sha256::new();
    match data {
        EntryData::Text(text) => hasher.update(text.as_bytes()),
        EntryData::Binary(bytes) => hasher.update(bytes),
        EntryData::Tree(value) => match serde_yaml::to_string(value) {
            Ok(yaml) => hasher.update(yaml.as_bytes()),
            Err(_) => hasher.update(format!("{:?}", value).as_bytes()),
        },
        other => match serde_json::to_vec(other) {
            Ok(json) => hasher.update(&json),
            Err(_) => hasher.update(format!("{:?}", other).as_bytes()),
        },
    }
    hex::encode(hasher.finalize())
}
