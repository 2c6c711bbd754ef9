// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed document store (uses platform data dir by default).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{check_key, check_version, not_found, with_id, DocumentStore, StoreError, Versioned};

/// Store documents as `<root>/<collection>/<id>.json`.
///
/// Each file holds the `{version, body}` record. Writes go to a sibling
/// temporary file that is renamed into place, and a process-wide mutex
/// serializes every read-check-write so version checks cannot interleave.
/// Other processes sharing the directory are not coordinated.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Open a store under the user data directory (e.g., `~/.local/share/seastate`).
    pub fn open_default() -> Result<Self, StoreError> {
        let proj = ProjectDirs::from("dev", "flyingrobots", "Seastate").ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                ErrorKind::NotFound,
                "could not resolve data dir",
            ))
        })?;
        Self::open(proj.data_dir().join("documents"))
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, StoreError> {
        check_key(collection)?;
        Ok(self.root.join(collection))
    }

    fn path_for(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        let dir = self.collection_dir(collection)?;
        // an id that could never have been assigned simply does not exist
        check_key(id).map_err(|_| not_found(collection, id))?;
        Ok(dir.join(format!("{id}.json")))
    }

    fn read_entry(path: &Path) -> Result<Option<Versioned<Value>>, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn write_entry(path: &Path, entry: &Versioned<Value>) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entry)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl DocumentStore for FsStore {
    fn get(&self, collection: &str, id: &str) -> Result<Versioned<Value>, StoreError> {
        let path = self.path_for(collection, id)?;
        Self::read_entry(&path)?.ok_or_else(|| not_found(collection, id))
    }

    fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let dir = self.collection_dir(collection)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        // file names are ids, so path order is id order
        paths.sort();
        let mut out = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::read_entry(&path)? {
                Some(entry) => out.push(entry.body),
                None => warn!(path = %path.display(), "document vanished during list"),
            }
        }
        Ok(out)
    }

    fn create(&self, collection: &str, body: Value) -> Result<Versioned<Value>, StoreError> {
        let id = Uuid::new_v4().to_string();
        let path = self.path_for(collection, &id)?;
        let entry = Versioned {
            version: 1,
            body: with_id(body, &id)?,
        };
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        Self::write_entry(&path, &entry)?;
        debug!(collection, id = %id, "document created");
        Ok(entry)
    }

    fn replace(
        &self,
        collection: &str,
        id: &str,
        body: Value,
        expected_version: Option<u64>,
    ) -> Result<Versioned<Value>, StoreError> {
        let path = self.path_for(collection, id)?;
        let body = with_id(body, id)?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let current = Self::read_entry(&path)?.ok_or_else(|| not_found(collection, id))?;
        check_version(collection, id, expected_version, current.version)?;
        let entry = Versioned {
            version: current.version + 1,
            body,
        };
        Self::write_entry(&path, &entry)?;
        debug!(collection, id, version = entry.version, "document replaced");
        Ok(entry)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(collection, id)?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(collection, id, "document deleted");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(not_found(collection, id)),
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}
