//! Flat-file persistence.
//!
//! # Data file
//!
//! The whole store is one pretty-printed JSON document holding every record
//! of every type:
//!
//! ```text
//! { "users": [...], "products": [...], "categories": [...],
//!   "carts": [...], "orders": [...] }
//! ```
//!
//! Every read loads and parses the entire file; every write re-serializes the
//! entire dataset. Writes are serialized through an in-process FIFO slot, so at
//! most one write is on disk at a time. There is no cross-process locking.
//!
//! Repositories never call [`Store::write`] directly. They go through
//! [`Store::mutate`], which holds the write slot across read, modify and
//! write so concurrent requests in this process cannot lose each other's
//! updates.

pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use std::io;
use std::path::{Path, PathBuf};

use ddf_core::Dataset;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from writing the data file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The dataset could not be serialized.
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The data file could not be written.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Handle to the JSON data file.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    /// The write slot. `tokio::sync::Mutex` grants the lock in request order,
    /// which is what makes the write queue FIFO. The value counts completed
    /// writes.
    write_slot: Mutex<u64>,
}

impl Store {
    /// Open a store backed by `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_slot: Mutex::new(0),
        }
    }

    /// Path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full dataset.
    ///
    /// Never fails: a missing, unreadable or unparseable file yields an empty
    /// dataset and a warning in the log.
    pub async fn read(&self) -> Dataset {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(dataset) => dataset,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Data file is not valid JSON; using empty dataset");
                    Dataset::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Data file missing; using empty dataset");
                Dataset::default()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read data file; using empty dataset");
                Dataset::default()
            }
        }
    }

    /// Replace the data file with `dataset`.
    ///
    /// Waits for every previously queued write to finish first. Returns the
    /// sequence number of this write (1 for the first write through this
    /// handle). A failed write leaves the file untouched and does not block
    /// the writes queued after it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the dataset cannot be serialized or written.
    pub async fn write(&self, dataset: &Dataset) -> Result<u64, StoreError> {
        let mut completed = self.write_slot.lock().await;
        self.persist(dataset).await?;
        *completed += 1;
        Ok(*completed)
    }

    /// Read, modify and write the dataset while holding the write slot.
    ///
    /// If `f` returns an error nothing is written and the error is passed
    /// through.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a `StoreError` converted into `E` if
    /// the write fails.
    pub async fn mutate<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Dataset) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut completed = self.write_slot.lock().await;
        let mut dataset = self.read().await;
        let value = f(&mut dataset)?;
        self.persist(&dataset).await?;
        *completed += 1;
        Ok(value)
    }

    /// Whether the directory holding the data file is reachable.
    pub async fn is_ready(&self) -> bool {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        tokio::fs::metadata(dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Serialize and atomically replace the data file.
    async fn persist(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(dataset)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| self.io_error(source))?;
        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.io_error(source));
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use ddf_core::{Category, CategoryId};

    use super::*;

    fn category(name: &str, order: i32) -> Category {
        Category {
            id: CategoryId::generate(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: String::new(),
            image: String::new(),
            display_order: order,
            created_at: Utc::now(),
        }
    }

    fn dataset_named(name: &str) -> Dataset {
        Dataset {
            categories: vec![category(name, 1)],
            ..Dataset::default()
        }
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));

        let dataset = Dataset {
            categories: vec![category("Almonds", 2), category("Cashews", 1)],
            ..Dataset::default()
        };
        store.write(&dataset).await.unwrap();

        assert_eq!(store.read().await, dataset);
    }

    #[tokio::test]
    async fn test_written_file_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        store.write(&Dataset::default()).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("{\n  \"users\": []"));
        assert!(!dir.path().join("db.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("absent.json"));
        assert_eq!(store.read().await, Dataset::default());
    }

    #[tokio::test]
    async fn test_read_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = Store::new(&path);
        assert_eq!(store.read().await, Dataset::default());
    }

    #[tokio::test]
    async fn test_write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested").join("db.json"));
        store.write(&Dataset::default()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_concurrent_writes_complete_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));

        let (a, b, c) = (dataset_named("A"), dataset_named("B"), dataset_named("C"));
        let (ra, rb, rc) = tokio::join!(store.write(&a), store.write(&b), store.write(&c));

        assert_eq!(ra.unwrap(), 1);
        assert_eq!(rb.unwrap(), 2);
        assert_eq!(rc.unwrap(), 3);
        assert_eq!(store.read().await, c);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_block_queue() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        // A directory where the temp file goes makes the next write fail.
        let obstacle = dir.path().join("db.json.tmp");
        std::fs::create_dir(&obstacle).unwrap();

        let rejected = dataset_named("Rejected");
        let (first, second) = tokio::join!(
            store.write(&rejected),
            store.mutate(|ds| {
                std::fs::remove_dir(&obstacle).unwrap();
                ds.categories.push(category("Accepted", 1));
                Ok::<_, StoreError>(())
            }),
        );

        assert!(matches!(first, Err(StoreError::Io { .. })));
        second.unwrap();

        let names: Vec<_> = store
            .read()
            .await
            .categories
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Accepted"]);
        assert_eq!(store.write(&Dataset::default()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::new(dir.path().join("db.json")));

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .mutate(|ds| {
                        ds.categories.push(category(&format!("c{i}"), i));
                        Ok::<_, StoreError>(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.read().await.categories.len(), 10);
    }

    #[tokio::test]
    async fn test_mutate_error_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));

        let result: Result<(), RepositoryError> = store
            .mutate(|ds| {
                ds.categories.push(category("Dates", 1));
                Err(RepositoryError::NotFound)
            })
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_is_ready() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Store::new(dir.path().join("db.json")).is_ready().await);
        assert!(!Store::new(dir.path().join("missing").join("db.json")).is_ready().await);
    }
}
