//! JSON-file backed table
//!
//! Rows live in an in-memory map guarded by a `RwLock`. Every mutation is
//! applied and persisted while the write lock is held, so a conditional write
//! such as [`JsonTable::insert_if_absent`] is atomic with respect to other
//! writers and the file on disk never sees interleaved writes.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// A row type with a primary key
pub trait Keyed {
    type Key: Eq + Hash + Clone + Debug + Send + Sync;

    fn key(&self) -> Self::Key;
}

/// Result of a create-if-absent write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<V> {
    /// The row was stored
    Inserted(V),
    /// A row with the same key already existed; it is returned unchanged
    Existing(V),
}

impl<V> InsertOutcome<V> {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    pub fn into_inner(self) -> V {
        match self {
            Self::Inserted(row) | Self::Existing(row) => row,
        }
    }
}

pub struct JsonTable<V: Keyed> {
    path: PathBuf,
    rows: RwLock<HashMap<V::Key, V>>,
}

impl<V> JsonTable<V>
where
    V: Keyed + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Open the table at `path`. A missing file starts an empty table; it is
    /// created on first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rows = load_rows::<V>(&path).await?;
        Ok(Self {
            path,
            rows: RwLock::new(rows),
        })
    }

    pub async fn get(&self, key: &V::Key) -> Option<V> {
        self.rows.read().await.get(key).cloned()
    }

    pub async fn list_where<F>(&self, predicate: F) -> Vec<V>
    where
        F: Fn(&V) -> bool,
    {
        let rows = self.rows.read().await;
        rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    pub async fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&V) -> bool,
    {
        let rows = self.rows.read().await;
        rows.values().filter(|row| predicate(row)).count()
    }

    /// Store `row` unless its key is taken.
    pub async fn insert_if_absent(&self, row: V) -> Result<InsertOutcome<V>> {
        let key = row.key();
        let mut rows = self.rows.write().await;
        if let Some(existing) = rows.get(&key) {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }

        rows.insert(key.clone(), row.clone());
        if let Err(err) = self.persist(&rows).await {
            rows.remove(&key);
            return Err(err);
        }
        Ok(InsertOutcome::Inserted(row))
    }

    /// Create-if-absent for a batch, persisted once. Keys repeated within the
    /// batch resolve to the first occurrence.
    pub async fn insert_many_if_absent(&self, batch: Vec<V>) -> Result<Vec<InsertOutcome<V>>> {
        let mut rows = self.rows.write().await;
        let mut inserted_keys = Vec::new();
        let mut outcomes = Vec::with_capacity(batch.len());

        for row in batch {
            let key = row.key();
            if let Some(existing) = rows.get(&key) {
                outcomes.push(InsertOutcome::Existing(existing.clone()));
                continue;
            }
            rows.insert(key.clone(), row.clone());
            inserted_keys.push(key);
            outcomes.push(InsertOutcome::Inserted(row));
        }

        if inserted_keys.is_empty() {
            return Ok(outcomes);
        }
        if let Err(err) = self.persist(&rows).await {
            for key in &inserted_keys {
                rows.remove(key);
            }
            return Err(err);
        }
        Ok(outcomes)
    }

    /// Read-modify-write of one row under the write lock.
    pub async fn update<F>(&self, key: &V::Key, apply: F) -> Result<Option<V>>
    where
        F: FnOnce(&mut V) -> Result<()>,
    {
        let mut rows = self.rows.write().await;
        let Some(current) = rows.get(key).cloned() else {
            return Ok(None);
        };

        let mut updated = current.clone();
        apply(&mut updated)?;
        rows.insert(key.clone(), updated.clone());
        if let Err(err) = self.persist(&rows).await {
            rows.insert(key.clone(), current);
            return Err(err);
        }
        Ok(Some(updated))
    }

    pub async fn remove(&self, key: &V::Key) -> Result<Option<V>> {
        let mut rows = self.rows.write().await;
        let Some(removed) = rows.remove(key) else {
            return Ok(None);
        };

        if let Err(err) = self.persist(&rows).await {
            rows.insert(key.clone(), removed);
            return Err(err);
        }
        Ok(Some(removed))
    }

    async fn persist(&self, rows: &HashMap<V::Key, V>) -> Result<()> {
        let values: Vec<&V> = rows.values().collect();
        let content = serde_json::to_string_pretty(&values)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Storage(format!("Failed to create directory: {}", e))
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await.map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            Error::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

async fn load_rows<V>(path: &Path) -> Result<HashMap<V::Key, V>>
where
    V: Keyed + DeserializeOwned,
{
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Storage(format!("Failed to read {}: {}", path.display(), e))
    })?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<V> = serde_json::from_str(&content).map_err(|e| {
        Error::Storage(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    Ok(rows.into_iter().map(|row| (row.key(), row)).collect())
}
