use super::binary::BinaryFormat;
use super::entry::Entry;
use super::project::ProjectFormat;
use super::table::CsvFormat;
use super::text::TextFormat;
use super::traits::{EntryError, EntryFormat, EntryResult, FormatInfo};
use super::yaml::YamlFormat;
use crate::settings::EntrySettings;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use xamin_core::{FormatKind, Hint};

/// Maps file extensions and content to entry formats.
pub struct EntryRegistry {
    formats: RwLock<HashMap<FormatKind, Arc<dyn EntryFormat>>>,
    overrides: HashMap<String, FormatKind>,
    hint_size: usize,
    sniff_content: bool,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::with_settings(&EntrySettings::default())
    }

    pub fn with_settings(settings: &EntrySettings) -> Self {
        let registry = Self::empty_with_settings(settings);
        registry.register_all(settings);
        registry
    }

    /// A registry without any formats, for callers registering their own.
    pub fn empty() -> Self {
        Self::empty_with_settings(&EntrySettings::default())
    }

    fn empty_with_settings(settings: &EntrySettings) -> Self {
        let overrides = settings
            .extensions
            .iter()
            .map(|(ext, kind)| (ext.to_lowercase(), FormatKind::new(kind)))
            .collect();

        Self {
            formats: RwLock::new(HashMap::new()),
            overrides,
            hint_size: settings.hint_size,
            sniff_content: settings.sniff_content,
        }
    }

    fn register_all(&self, settings: &EntrySettings) {
        self.register(Arc::new(TextFormat::new()));
        self.register(Arc::new(BinaryFormat::new()));
        self.register(Arc::new(CsvFormat::new(settings.delimiter_bytes())));
        self.register(Arc::new(YamlFormat::new()));
        self.register(Arc::new(ProjectFormat::new()));
    }

    /// Add a format, replacing any previous format of the same kind.
    pub fn register(&self, format: Arc<dyn EntryFormat>) {
        let kind = format.kind();
        if self.formats.write().insert(kind.clone(), format).is_some() {
            debug!("Replaced entry format '{}'", kind);
        }
    }

    pub fn get(&self, kind: &FormatKind) -> Option<Arc<dyn EntryFormat>> {
        self.formats.read().get(kind).cloned()
    }

    /// Registered formats ordered by kind.
    pub fn formats(&self) -> Vec<FormatInfo> {
        let mut formats: Vec<FormatInfo> = self
            .formats
            .read()
            .values()
            .map(|f| FormatInfo::of(f.as_ref()))
            .collect();
        formats.sort_by(|a, b| a.kind.cmp(&b.kind));
        formats
    }

    pub fn hint_size(&self) -> usize {
        self.hint_size
    }

    /// Format kind responsible for a path.
    pub fn resolve(&self, path: &Path) -> EntryResult<FormatKind> {
        self.resolve_format(path).map(|f| f.kind())
    }

    fn resolve_format(&self, path: &Path) -> EntryResult<Arc<dyn EntryFormat>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if let Some(kind) = self.overrides.get(&ext) {
            match self.get(kind) {
                Some(format) => {
                    debug!("Extension '{}' overridden to {}", ext, kind);
                    return Ok(format);
                }
                None => warn!("Extension override '{}' names unknown format '{}'", ext, kind),
            }
        }

        let mut claimants: Vec<Arc<dyn EntryFormat>> = if ext.is_empty() {
            Vec::new()
        } else {
            self.formats
                .read()
                .values()
                .filter(|f| f.extensions().contains(&ext.as_str()))
                .cloned()
                .collect()
        };
        claimants.sort_by(|a, b| b.score().cmp(&a.score()).then_with(|| a.kind().cmp(&b.kind())));

        if claimants.len() == 1 {
            return Ok(claimants.remove(0));
        }

        if let Some(generic) = claimants.last().cloned() {
            // Several formats share the extension: let the content decide
            if let Some(hint) = self.hint(path) {
                if let Some(format) = claimants.into_iter().find(|f| f.is_type(&hint)) {
                    return Ok(format);
                }
            }
            return Ok(generic);
        }

        if self.sniff_content {
            if let Some(hint) = self.hint(path) {
                let sniffed = self
                    .formats
                    .read()
                    .values()
                    .filter(|f| f.is_type(&hint))
                    .max_by(|a, b| a.score().cmp(&b.score()).then_with(|| b.kind().cmp(&a.kind())))
                    .cloned();
                if let Some(format) = sniffed {
                    debug!("Sniffed {:?} as {}", path, format.kind());
                    return Ok(format);
                }
            }
        }

        Err(EntryError::UnsupportedFormat(path.to_path_buf()))
    }

    fn hint(&self, path: &Path) -> Option<Hint> {
        match Hint::read(path, self.hint_size) {
            Ok(hint) => Some(hint),
            Err(e) => {
                debug!("Could not read hint from {:?}: {}", path, e);
                None
            }
        }
    }

    /// An entry for `path` with nothing loaded yet.
    pub fn open(&self, path: &Path) -> EntryResult<Entry> {
        let format = self.resolve_format(path)?;
        Ok(Entry::new(Some(path.to_path_buf()), format))
    }

    /// An entry for `path` with its data read and decoded.
    pub fn load(&self, path: &Path) -> EntryResult<Entry> {
        let mut entry = self.open(path)?;
        entry.load()?;
        Ok(entry)
    }

    /// A new entry without a path, holding the format's default data.
    pub fn create(&self, kind: &FormatKind) -> Option<Entry> {
        self.get(kind).map(|format| Entry::new(None, format))
    }

    pub fn save(&self, entry: &mut Entry, overwrite: bool) -> EntryResult<()> {
        entry.save(overwrite)
    }
}

impl Default for EntryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
