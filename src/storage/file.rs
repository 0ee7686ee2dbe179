use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::hashing::hash_document_id;
use crate::ranking::{DocumentId, RankingResultSet};

use super::{RankingStore, StorageError, StorageResult, check_not_stale, check_result_set};

const JSON_EXTENSION: &str = "json";

/// Stores one JSON file per query under a root directory.
///
/// File names are the BLAKE3 hex of the query id, so arbitrary ids are safe.
/// Writes go to a temp file in the same directory and are renamed over the
/// previous file. Writers for the same query are serialized; different
/// queries proceed in parallel.
#[derive(Debug)]
pub struct FileRankingStore {
    root: PathBuf,
    query_locks: Mutex<HashMap<DocumentId, Arc<Mutex<()>>>>,
}

impl FileRankingStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root)
                .map_err(|_| StorageError::StorageUnavailable { path: root.clone() })?;
        }
        if !root.is_dir() {
            return Err(StorageError::StorageUnavailable { path: root });
        }

        info!(path = %root.display(), "File ranking store opened");
        Ok(Self {
            root,
            query_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn set_path(&self, query_id: &DocumentId) -> PathBuf {
        self.root.join(format!(
            "{}.{}",
            hash_document_id(query_id.as_str()),
            JSON_EXTENSION
        ))
    }

    fn query_lock(&self, query_id: &DocumentId) -> Arc<Mutex<()>> {
        Arc::clone(
            self.query_locks
                .lock()
                .entry(query_id.clone())
                .or_default(),
        )
    }

    fn read_path(path: &Path) -> StorageResult<Option<RankingResultSet>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let set = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(set))
    }
}

impl RankingStore for FileRankingStore {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn replace(&self, set: RankingResultSet) -> StorageResult<Option<RankingResultSet>> {
        check_result_set(&set)?;

        let path = self.set_path(&set.query_id);
        let lock = self.query_lock(&set.query_id);
        let _guard = lock.lock();

        let previous = match Self::read_path(&path) {
            Ok(previous) => previous,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable result set will be overwritten");
                None
            }
        };
        check_not_stale(previous.as_ref(), &set)?;

        let temp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, &set)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| StorageError::Io(e.error))?;

        debug!(
            query_id = %set.query_id,
            run_id = %set.run_id,
            path = %path.display(),
            superseded = previous.is_some(),
            "Result set stored"
        );
        Ok(previous)
    }

    fn get(&self, query_id: &DocumentId) -> StorageResult<Option<RankingResultSet>> {
        let path = self.set_path(query_id);
        match Self::read_path(&path)? {
            Some(set) if &set.query_id != query_id => Err(StorageError::Corrupted {
                path,
                expected: query_id.clone(),
                found: set.query_id,
            }),
            other => Ok(other),
        }
    }

    fn remove(&self, query_id: &DocumentId) -> StorageResult<bool> {
        let path = self.set_path(query_id);
        let lock = self.query_lock(query_id);
        let _guard = lock.lock();

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn query_ids(&self) -> StorageResult<Vec<DocumentId>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();

            if path.extension().is_some_and(|ext| ext == JSON_EXTENSION)
                && let Some(set) = Self::read_path(&path)?
            {
                ids.push(set.query_id);
            }
        }

        ids.sort();
        Ok(ids)
    }
}
