use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{SettingsFile, Task};

/// Key of the slot holding the whole task collection.
pub const TASKS_SLOT: &str = "studyPlannerTasks";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Io(err) if err.kind() == ErrorKind::NotFound)
    }
}

/// Local key-value store: each slot is one JSON file under `root`.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>, StorageError> {
        self.load_json(self.slot_path(TASKS_SLOT))
    }

    /// Loads the task slot, treating a missing or unreadable slot as empty.
    pub fn load_tasks_or_empty(&self) -> Vec<Task> {
        match self.load_tasks() {
            Ok(tasks) => tasks,
            Err(err) if err.is_not_found() => Vec::new(),
            Err(err) => {
                log::warn!(
                    "task slot unreadable, starting empty path={} error={err}",
                    self.slot_path(TASKS_SLOT).display()
                );
                Vec::new()
            }
        }
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.write_atomic(self.slot_path(TASKS_SLOT), tasks)
    }

    pub fn load_settings(&self) -> Result<SettingsFile, StorageError> {
        self.load_json(self.root.join(SETTINGS_FILE))
    }

    pub fn save_settings(&self, data: &SettingsFile) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(SETTINGS_FILE), data)
    }

    fn load_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T, StorageError> {
        let mut file = File::open(path)?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    fn write_atomic<T: Serialize + ?Sized>(
        &self,
        path: PathBuf,
        data: &T,
    ) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}
