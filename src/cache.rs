//! Local snapshot cache.
//!
//! The cache is a synchronous key-value store of strings. The controller keeps
//! a full JSON snapshot of the task list under a single key and overwrites it
//! after every state change.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::task::Task;

/// Synchronous string store the controller mirrors its list into.
pub trait LocalCache {
    /// Raw value under `key`, or `None` when nothing has been stored yet.
    fn read(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Overwrite the value under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), CacheError>;
}

impl<T: LocalCache + ?Sized> LocalCache for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).write(key, value)
    }
}

/// Serialize the full list for the cache.
pub fn encode_snapshot(tasks: &[Task]) -> Result<String, CacheError> {
    Ok(serde_json::to_string(tasks)?)
}

/// Parse a cached snapshot. Anything that is not a JSON array of tasks is rejected.
pub fn decode_snapshot(raw: &str) -> Result<Vec<Task>, CacheError> {
    Ok(serde_json::from_str(raw)?)
}

/// Cache stored as one JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCache { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl LocalCache for FileCache {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    /// Atomic-ish write via temp + rename.
    fn write(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let io_err = |source| CacheError::Io { path: path.clone(), source };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(value.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }
}

/// Process-local cache; used when the file cache is disabled and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-seeded with `value` under `key`.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        MemoryCache { entries, writes: 0 }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of writes performed since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LocalCache for MemoryCache {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
