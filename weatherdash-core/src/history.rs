//! Recent-search history and the key-value storage it persists into.

use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use crate::error::WeatherError;

pub const HISTORY_KEY: &str = "weatherHistory";
pub const MAX_HISTORY: usize = 5;

/// Flat key-value blob storage.
pub trait Storage: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError>;

    /// Replace the value stored under `key` as a whole.
    fn set(&self, key: &str, value: &str) -> Result<(), WeatherError>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(persistence(&path, "read", e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WeatherError> {
        fs::create_dir_all(&self.dir).map_err(|e| persistence(&self.dir, "create", e))?;

        // Write beside the target and rename so readers never see a partial blob.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| persistence(&tmp, "write", e))?;
        fs::rename(&tmp, &path).map_err(|e| persistence(&path, "replace", e))?;

        Ok(())
    }
}

fn persistence(path: &Path, action: &str, err: std::io::Error) -> WeatherError {
    WeatherError::Persistence(format!("Failed to {action} {}: {err}", path.display()))
}

/// In-process storage, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WeatherError> {
        self.slots.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Most-recent-first list of searched cities, unique and capped at [`MAX_HISTORY`].
#[derive(Debug)]
pub struct HistoryStore {
    storage: Box<dyn Storage>,
    entries: Vec<String>,
}

impl HistoryStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            entries: Vec::new(),
        }
    }

    /// Read the persisted list. Missing or malformed blobs yield an empty list.
    pub fn load(&mut self) -> Vec<String> {
        self.entries = match self.storage.get(HISTORY_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<String>>(&blob) {
                Ok(list) => normalize(list),
                Err(e) => {
                    tracing::warn!("Ignoring malformed search history: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                err.log("load history");
                Vec::new()
            }
        };

        self.entries.clone()
    }

    /// Move `city` to the front, persist, and return the new list.
    pub fn record(&mut self, city: &str) -> Vec<String> {
        self.entries.retain(|c| c != city);
        self.entries.insert(0, city.to_owned());
        self.entries.truncate(MAX_HISTORY);
        self.persist();
        self.entries.clone()
    }

    pub fn clear(&mut self) -> Vec<String> {
        self.entries.clear();
        self.persist();
        Vec::new()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(|e| WeatherError::Persistence(e.to_string()))
            .and_then(|blob| self.storage.set(HISTORY_KEY, &blob));

        if let Err(err) = result {
            err.log("save history");
        }
    }
}

fn normalize(list: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(MAX_HISTORY);
    for city in list {
        if out.len() == MAX_HISTORY {
            break;
        }
        if !out.contains(&city) {
            out.push(city);
        }
    }
    out
}
