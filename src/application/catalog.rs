use std::fs;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::domain::{RepositoryRecord, directory_base_name};
use crate::infrastructure::config::Settings;

pub trait RepositorySearch {
    /// Immediate child directories of the root whose base name contains `term`.
    fn search(&self, term: &str) -> Vec<PathBuf>;
}

#[derive(Debug, Clone, Copy)]
pub struct RepositoryCatalog<'a> {
    root: &'a Path,
    records: &'a [RepositoryRecord],
}

impl<'a> RepositoryCatalog<'a> {
    pub fn new(root: &'a Path, records: &'a [RepositoryRecord]) -> Self {
        Self { root, records }
    }

    pub fn from_settings(settings: &'a Settings) -> Self {
        Self::new(&settings.root_folder, &settings.recent_repos)
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    /// Scans on a worker thread; the caller decides when to wait.
    pub fn search_in_background(&self, term: &str) -> SearchHandle {
        let root = self.root.to_path_buf();
        let term = term.to_string();
        let handle = std::thread::spawn(move || search_directories(&root, &term));
        SearchHandle { handle }
    }

    pub fn most_recent(&self, limit: usize) -> Vec<&'a RepositoryRecord> {
        let mut records: Vec<&RepositoryRecord> = self.records.iter().collect();
        records.sort_by(|left, right| {
            right
                .last_accessed_unix_secs
                .cmp(&left.last_accessed_unix_secs)
        });
        records.truncate(limit);
        records
    }

    /// Recorded name first (case-insensitive), then a same-named directory under the root.
    pub fn find_by_name(&self, name: &str) -> Option<PathBuf> {
        if let Some(record) = self
            .records
            .iter()
            .find(|record| record.name.to_lowercase() == name.to_lowercase())
        {
            return Some(record.path.clone());
        }

        let candidate = self.root.join(name);
        candidate.is_dir().then_some(candidate)
    }
}

impl RepositorySearch for RepositoryCatalog<'_> {
    fn search(&self, term: &str) -> Vec<PathBuf> {
        self.search_in_background(term).wait()
    }
}

pub struct SearchHandle {
    handle: JoinHandle<Vec<PathBuf>>,
}

impl SearchHandle {
    pub fn wait(self) -> Vec<PathBuf> {
        self.handle.join().unwrap_or_default()
    }
}

/// A missing or unreadable root yields no matches.
pub fn search_directories(root: &Path, term: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let needle = term.to_lowercase();
    let mut matches: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .map(|path| (directory_base_name(&path), path))
        .filter(|(name, _)| name.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by(|(left, _), (right, _)| {
        left.to_lowercase()
            .cmp(&right.to_lowercase())
            .then_with(|| left.cmp(right))
    });
    matches.into_iter().map(|(_, path)| path).collect()
}
