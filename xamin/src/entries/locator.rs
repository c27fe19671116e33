use super::traits::{EntryError, EntryResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use url::Url;

static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").unwrap());

/// Turn a locator (a plain path, `~/...` or a `file://` URL) into an
/// absolute path.
///
/// The path is not required to exist.
pub fn to_path(locator: &str) -> EntryResult<PathBuf> {
    let invalid = |reason: &str| EntryError::InvalidLocator(locator.to_string(), reason.to_string());

    if locator.trim().is_empty() {
        return Err(invalid("locator is empty"));
    }

    if SCHEME.is_match(locator) {
        let url = Url::parse(locator).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "file" {
            return Err(invalid(&format!("unsupported scheme '{}'", url.scheme())));
        }
        return url
            .to_file_path()
            .map_err(|_| invalid("URL does not name a local file"));
    }

    let expanded = shellexpand::tilde(locator);
    let path = Path::new(expanded.as_ref());

    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir().map_err(|e| invalid(&e.to_string()))?;
        Ok(cwd.join(path))
    }
}

/// Absolute path used to recognise an already-open entry.
pub(crate) fn identity(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
