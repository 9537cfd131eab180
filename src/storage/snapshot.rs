//! Snapshot persistence for in-memory point stores.
//!
//! A snapshot is a point-in-time copy of every bucket in a
//! [`MemoryPointStore`]. Saving writes a temporary file and atomically renames
//! it over the previous snapshot.

use super::MemoryPointStore;
use crate::error::{PointStoreError, Result};
use crate::point::Point;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_MAGIC: &[u8] = b"POINTSTORE_SNAPSHOT";
// Version 2 stopped storing grid keys; they are rebuilt on load.
const SNAPSHOT_VERSION: u8 = 2;

/// A snapshot file on disk.
///
/// # Examples
///
/// ```no_run
/// use pointstore::{GridPoint, MemoryPointStore, PointStore, SnapshotFile};
///
/// let mut store = MemoryPointStore::new();
/// store.insert(GridPoint::new([1, 2]), "cafe".to_string())?;
///
/// let snapshot = SnapshotFile::new("points.snapshot");
/// snapshot.save(&store)?;
///
/// let restored: MemoryPointStore<GridPoint, String> = snapshot.load()?;
/// assert_eq!(restored.len(), 1);
/// # Ok::<(), pointstore::PointStoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the snapshot. A missing or empty file loads as an empty store.
    ///
    /// Points are rebuilt through their own deserialization, so a file whose
    /// points fail validation is rejected rather than loaded out of order.
    pub fn load<P, V>(&self) -> Result<MemoryPointStore<P, V>>
    where
        P: Point + DeserializeOwned,
        V: Clone + DeserializeOwned,
    {
        if !self.exists() {
            return Ok(MemoryPointStore::new());
        }

        let file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(MemoryPointStore::new());
        }

        let mut reader = BufReader::new(file);

        let mut magic = vec![0u8; SNAPSHOT_MAGIC.len()];
        reader.read_exact(&mut magic)?;
        if magic != SNAPSHOT_MAGIC {
            return Err(PointStoreError::InvalidFormat);
        }

        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        if version[0] != SNAPSHOT_VERSION {
            return Err(PointStoreError::InvalidFormat);
        }

        let entries: Vec<(P, Vec<V>)> = bincode::deserialize_from(&mut reader)?;
        let mut buckets: BTreeMap<P, Vec<V>> = BTreeMap::new();
        for (point, values) in entries {
            buckets.entry(point).or_default().extend(values);
        }

        log::debug!(
            "Loaded snapshot with {} points from {}",
            buckets.len(),
            self.path.display()
        );
        Ok(MemoryPointStore::from_buckets(buckets))
    }

    /// Writes every bucket of `store`, replacing any previous snapshot.
    pub fn save<P, V>(&self, store: &MemoryPointStore<P, V>) -> Result<()>
    where
        P: Point + Serialize,
        V: Clone + Serialize,
    {
        let temp_path = self.temp_path();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(SNAPSHOT_MAGIC)?;
        writer.write_all(&[SNAPSHOT_VERSION])?;

        let entries: Vec<(&P, &[V])> = store.buckets().collect();
        bincode::serialize_into(&mut writer, &entries)?;

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp_path, &self.path)?;
        self.sync_parent_dir()?;

        log::debug!(
            "Saved snapshot with {} points to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        if let Some(name) = temp.file_name() {
            let mut new_name = name.to_string_lossy().into_owned();
            new_name.push_str(".tmp");
            temp.set_file_name(new_name);
        }
        temp
    }

    fn sync_parent_dir(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                let dir = File::open(parent)?;
                dir.sync_all()?;
            }
            _ => {}
        }
        Ok(())
    }
}
