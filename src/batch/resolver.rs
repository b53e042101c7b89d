//! Input discovery: single paths and wildcard patterns

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, ResizerError};
use crate::processing::ensure_input_exists;

/// Files selected by the input argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSet {
    /// A literal path, known to exist
    Single(PathBuf),
    /// Every file matching a pattern below `root`
    Pattern {
        pattern: String,
        root: PathBuf,
        files: Vec<PathBuf>,
    },
}

impl InputSet {
    pub fn files(&self) -> Vec<&Path> {
        match self {
            Self::Single(path) => vec![path.as_path()],
            Self::Pattern { files, .. } => files.iter().map(PathBuf::as_path).collect(),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }
}

/// Whether `input` contains wildcard characters
pub fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?'])
}

/// Match a file name against a pattern.
///
/// `*` matches zero or more characters, `?` zero or one. Comparison is ASCII
/// case-insensitive.
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    let name: Vec<char> = name.chars().map(|c| c.to_ascii_lowercase()).collect();

    // matched[j]: the pattern prefix seen so far matches name[..j]
    let mut matched = vec![false; name.len() + 1];
    matched[0] = true;

    for token in pattern.chars().map(|c| c.to_ascii_lowercase()) {
        let mut next = vec![false; name.len() + 1];
        for j in 0..=name.len() {
            next[j] = match token {
                '*' => matched[j] || (j > 0 && next[j - 1]),
                '?' => matched[j] || (j > 0 && matched[j - 1]),
                c => j > 0 && matched[j - 1] && name[j - 1] == c,
            };
        }
        matched = next;
    }

    matched[name.len()]
}

/// Expands the input argument into concrete file paths
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
    recursive: bool,
}

impl FileResolver {
    /// Resolve patterns below `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            recursive: false,
        }
    }

    /// Search all descendant directories instead of the top one only
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn resolve(&self, input: &str) -> Result<InputSet> {
        if !is_pattern(input) {
            let path = PathBuf::from(input);
            ensure_input_exists(&path)?;
            return Ok(InputSet::Single(path));
        }

        let (directory, name_pattern) = match input.rfind(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR) {
            Some(index) => (&input[..index + 1], &input[index + 1..]),
            None => ("", input),
        };

        if is_pattern(directory) {
            return Err(ResizerError::usage(format!(
                "Error: Wildcards are only supported in the file name: '{}'",
                input
            )));
        }

        let root = self.root.join(directory);
        let files = self.search(&root, name_pattern);
        debug!("Pattern {:?} matched {} file(s) under {:?}", input, files.len(), root);

        Ok(InputSet::Pattern {
            pattern: input.to_string(),
            root,
            files,
        })
    }

    fn search(&self, root: &Path, name_pattern: &str) -> Vec<PathBuf> {
        if !root.is_dir() {
            debug!("Search root {:?} is not a directory", root);
            return Vec::new();
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| matches_pattern(name_pattern, &entry.file_name().to_string_lossy()))
            .map(walkdir::DirEntry::into_path)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"x").unwrap();
    }

    fn names(set: &InputSet) -> Vec<String> {
        set.files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_star_matches_any_run() {
        assert!(matches_pattern("*.png", "photo.png"));
        assert!(matches_pattern("*.png", ".png"));
        assert!(matches_pattern("*", "anything"));
        assert!(matches_pattern("a*b*c", "aXXbYc"));
        assert!(!matches_pattern("*.png", "photo.jpg"));
        assert!(!matches_pattern("*.png", "photo.png.bak"));
    }

    #[test]
    fn test_question_mark_matches_zero_or_one() {
        assert!(matches_pattern("img?.png", "img1.png"));
        assert!(matches_pattern("img?.png", "img.png"));
        assert!(!matches_pattern("img?.png", "img12.png"));
    }

    #[test]
    fn test_matching_ignores_ascii_case() {
        assert!(matches_pattern("*.PNG", "photo.png"));
        assert!(matches_pattern("Photo*", "PHOTO_1.gif"));
    }

    #[test]
    fn test_literal_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.png");

        let err = FileResolver::new(dir.path())
            .resolve(missing.to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, ResizerError::NotFound { .. }));
    }

    #[test]
    fn test_literal_path_used_verbatim() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("photo.png");
        touch(&file);

        let set = FileResolver::new("/elsewhere").resolve(file.to_str().unwrap()).unwrap();
        assert_eq!(set, InputSet::Single(file));
        assert!(!set.is_batch());
    }

    #[test]
    fn test_top_directory_only_by_default() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub").join("c.png"));

        let set = FileResolver::new(dir.path()).resolve("*.png").unwrap();
        assert!(set.is_batch());
        assert_eq!(names(&set), vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_recursive_search() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("sub").join("c.png"));
        touch(&dir.path().join("sub").join("deeper").join("d.png"));

        let set = FileResolver::new(dir.path()).recursive(true).resolve("*.png").unwrap();
        let mut found = names(&set);
        found.sort();
        assert_eq!(found, vec!["a.png", "c.png", "d.png"]);
    }

    #[test]
    fn test_directories_are_not_matched() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("folder.png")).unwrap();

        let set = FileResolver::new(dir.path()).resolve("*.png").unwrap();
        assert!(set.files().is_empty());
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let set = FileResolver::new(dir.path()).resolve("*.webp").unwrap();
        assert!(set.files().is_empty());

        let set = FileResolver::new(dir.path()).resolve("nowhere/*.webp").unwrap();
        assert!(set.files().is_empty());
    }

    #[test]
    fn test_directory_prefix_in_pattern() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("photos").join("one.gif"));
        touch(&dir.path().join("one.gif"));

        let set = FileResolver::new(dir.path()).resolve("photos/*.gif").unwrap();
        assert_eq!(set.files(), vec![dir.path().join("photos").join("one.gif").as_path()]);
        if let InputSet::Pattern { root, .. } = &set {
            assert_eq!(root, &dir.path().join("photos/"));
        }
    }

    #[test]
    fn test_wildcard_directory_rejected() {
        let dir = TempDir::new().unwrap();
        let err = FileResolver::new(dir.path()).resolve("*/photo.png").unwrap_err();
        assert!(matches!(err, ResizerError::Usage { .. }));
    }
}
