//! Persistence collaborators for the board record.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::board::Board;

pub const BOARD_FILE_NAME: &str = "board.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read board from `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write board to `{}`", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored board record is malformed")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode board record")]
    Encode(#[source] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value style persistence for a single board record. `load` returns
/// `Ok(None)` when nothing has been saved yet; `save` replaces the whole record.
pub trait BoardStorage: Send {
    fn load(&self) -> Result<Option<Board>, StorageError>;
    fn save(&self, board: &Board) -> Result<(), StorageError>;
}

/// Stores the board as pretty-printed JSON in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(BOARD_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BoardStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Board>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(StorageError::Decode)
    }

    fn save(&self, board: &Board) -> Result<(), StorageError> {
        let payload = serde_json::to_string_pretty(board).map_err(StorageError::Encode)?;
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let temp = self.temp_path();
        fs::write(&temp, payload).map_err(write_err)?;
        fs::rename(&temp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    raw: Option<String>,
    fail_writes: bool,
    saves: usize,
}

/// In-process storage. Clones share the same record, so a caller can keep a
/// handle after passing one to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.state.lock().raw = Some(raw.into());
        storage
    }

    pub fn raw(&self) -> Option<String> {
        self.state.lock().raw.clone()
    }

    pub fn saved_board(&self) -> Option<Board> {
        self.load().ok().flatten()
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().saves
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }
}

impl BoardStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Board>, StorageError> {
        let state = self.state.lock();
        match &state.raw {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(StorageError::Decode),
            None => Ok(None),
        }
    }

    fn save(&self, board: &Board) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        state.raw = Some(serde_json::to_string(board).map_err(StorageError::Encode)?);
        state.saves += 1;
        Ok(())
    }
}
