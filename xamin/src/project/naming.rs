use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Longest leading path shared by every path, if any.
pub fn common_path<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    let mut paths = paths.into_iter();
    let first = paths.next()?;
    let mut common: Vec<Component<'a>> = first.components().collect();

    for path in paths {
        let shared = common
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }

    if common.is_empty() {
        None
    } else {
        Some(common.iter().collect())
    }
}

fn is_root(path: &Path) -> bool {
    path.parent().is_none() && path.has_root()
}

/// Display names for entries: paths relative to their common directory,
/// and `pattern` (with `{num}` replaced by the 1-based position) for
/// entries without a path. Names are made unique by a ` (n)` suffix.
pub fn assign_names(paths: &[Option<&Path>], pattern: &str) -> Vec<String> {
    let common = common_path(paths.iter().flatten().copied());
    let mut taken = HashSet::new();

    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let name = match (path, &common) {
                (None, _) => pattern.replace("{num}", &(i + 1).to_string()),
                (Some(path), Some(common)) if common.as_path() == *path => path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string()),
                (Some(path), Some(common)) if !is_root(common) => path
                    .strip_prefix(common)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| path.display().to_string()),
                (Some(path), _) => path.display().to_string(),
            };
            unique_name(name, &mut taken)
        })
        .collect()
}

fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    let mut candidate = name.clone();
    let mut number = 2;
    while taken.contains(&candidate) {
        candidate = format!("{} ({})", name.trim(), number);
        number += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_path_of_siblings() {
        let a = Path::new("/usr/local/bin/python");
        let b = Path::new("/usr/local/src/header.h");
        assert_eq!(common_path([a, b]), Some(PathBuf::from("/usr/local")));
    }

    #[test]
    fn common_path_relative_without_match() {
        assert_eq!(common_path([Path::new("src/a.h"), Path::new("README.txt")]), None);
        assert_eq!(common_path(std::iter::empty()), None);
    }

    #[test]
    fn single_file_uses_file_name() {
        let path = Path::new("/data/run1/spectrum.csv");
        assert_eq!(assign_names(&[Some(path)], "<unsaved> ({num})"), vec!["spectrum.csv"]);
    }

    #[test]
    fn names_relative_to_common_directory() {
        let a = Path::new("/data/run1/spectrum.csv");
        let b = Path::new("/data/run2/spectrum.csv");
        let names = assign_names(&[Some(a), None, Some(b)], "<unsaved> ({num})");
        assert_eq!(names, vec!["run1/spectrum.csv", "<unsaved> (2)", "run2/spectrum.csv"]);
    }

    #[test]
    fn root_common_path_keeps_full_path() {
        let a = Path::new("/etc/http.conf");
        let b = Path::new("/var/log.txt");
        assert_eq!(
            assign_names(&[Some(a), Some(b)], "x"),
            vec!["/etc/http.conf", "/var/log.txt"]
        );
    }

    #[test]
    fn clashing_names_get_suffix() {
        let mut taken = HashSet::new();
        assert_eq!(unique_name("one".into(), &mut taken), "one");
        assert_eq!(unique_name("one".into(), &mut taken), "one (2)");
        assert_eq!(unique_name("one".into(), &mut taken), "one (3)");
    }
}
