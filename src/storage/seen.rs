// src/storage/seen.rs

//! Persistent set of already-processed listing ids.

use std::collections::HashSet;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// In-memory set of listing ids already processed.
///
/// Ids are only ever added, never removed, for the lifetime of the
/// process; the set grows unboundedly over the life of a deployment.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    /// Membership test.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Insert an id, returning whether it was new.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Number of ids ever seen.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no id has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn from_ids(ids: Vec<String>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Ids in sorted order, for deterministic serialization.
    fn sorted_ids(&self) -> Vec<&String> {
        let mut ids: Vec<&String> = self.ids.iter().collect();
        ids.sort();
        ids
    }
}

/// File-backed store for the seen set.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted set.
    ///
    /// An absent file is the first-run condition and yields an empty set.
    /// Any other read failure, including corrupt JSON, is an error: the
    /// caller treats it as fatal at startup rather than silently starting
    /// over and re-notifying every listing on the page.
    pub async fn load(&self) -> Result<SeenSet> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let ids: Vec<String> = serde_json::from_slice(&bytes)?;
                Ok(SeenSet::from_ids(ids))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SeenSet::default()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Persist the full set, overwriting prior contents.
    ///
    /// Writes to a temp file then renames, so a crash mid-write leaves
    /// the previous snapshot intact.
    pub async fn save(&self, seen: &SeenSet) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&seen.sorted_ids())?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
