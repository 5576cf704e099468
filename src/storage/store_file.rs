use std::{
    fs,
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{entities::Store, errors::StorageError};

/// Interface for abstracting persistence of the whole [Store]. The manager only ever loads once
/// and saves whole documents, so this is all it needs.
#[cfg_attr(test, mockall::automock)]
pub trait StoreBackend {
    /// Loads the full document. A missing document is created empty first.
    fn load(&self) -> Result<Store, StorageError>;

    /// Replaces the full document. Either succeeds completely or leaves the old one untouched.
    fn save(&self, store: &Store) -> Result<(), StorageError>;
}

/// The main realization of [StoreBackend], a pretty-printed JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> Result<&Path, StorageError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Ok(parent),
            Some(_) => Ok(Path::new(".")),
            None => Err(StorageError::MissingDirectory {
                path: self.path.clone(),
            }),
        }
    }

    fn init_file(&self) -> Result<(), StorageError> {
        let parent = self.parent()?;
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
        info!("Creating empty data file at {:?}", self.path);
        self.save(&Store::default())
    }
}

impl StoreBackend for JsonFileStore {
    fn load(&self) -> Result<Store, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.init_file()?;
                return Ok(Store::default());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut store: Store =
            serde_json::from_str(&content).map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let repaired = store.normalize();
        if repaired > 0 {
            warn!("Recomputed durations of {repaired} sessions from an older data file");
        }
        debug!("Loaded {} projects from {:?}", store.projects.len(), self.path);
        Ok(store)
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let parent = self.parent()?;
        let write_error = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        // Write next to the target so the final rename never crosses file systems.
        let temp = NamedTempFile::new_in(parent).map_err(write_error)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, store)?;
            writer.write_all(b"\n").map_err(write_error)?;
            writer.flush().map_err(write_error)?;
        }
        temp.as_file().sync_all().map_err(write_error)?;
        temp.persist(&self.path)
            .map_err(|e| write_error(e.error))?;

        debug!("Saved {} projects to {:?}", store.projects.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::tempdir;

    use crate::storage::{
        entities::{ProjectEntity, SessionEntity, Store},
        errors::StorageError,
        store_file::{JsonFileStore, StoreBackend},
    };

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    #[test]
    fn test_missing_file_is_initialized() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("data.json");
        let storage = JsonFileStore::new(path.clone());

        let store = storage.load()?;

        assert_eq!(store, Store::default());
        assert!(path.exists());
        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(written, serde_json::json!({ "projects": {} }));
        Ok(())
    }

    #[test]
    fn test_save_then_load_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonFileStore::new(dir.path().join("data.json"));

        let mut store = Store::default();
        store.projects.insert(
            "alpha".into(),
            ProjectEntity {
                hours_goal: 4,
                sessions: vec![
                    SessionEntity::closed(TEST_START_DATE, TEST_START_DATE + Duration::hours(2)),
                    SessionEntity::open(TEST_START_DATE + Duration::hours(3)),
                ],
            },
        );
        store.projects.insert("beta".into(), ProjectEntity::with_goal(0));

        storage.save(&store)?;
        let loaded = storage.load()?;

        assert_eq!(loaded, store);
        Ok(())
    }

    #[test]
    fn test_corrupted_file_is_an_error_and_untouched() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json")?;
        let storage = JsonFileStore::new(path.clone());

        let result = storage.load();

        assert!(matches!(result, Err(StorageError::Parse { .. })));
        assert_eq!(fs::read_to_string(&path)?, "{ not json");
        Ok(())
    }

    #[test]
    fn test_save_replaces_whole_document() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonFileStore::new(dir.path().join("data.json"));

        let mut store = Store::default();
        store.projects.insert("a".into(), ProjectEntity::with_goal(1));
        store.projects.insert("b".into(), ProjectEntity::with_goal(2));
        storage.save(&store)?;

        store.projects.shift_remove("a");
        storage.save(&store)?;

        let loaded = storage.load()?;
        assert_eq!(loaded.projects.keys().collect::<Vec<_>>(), vec!["b"]);
        // No temporary files are left behind.
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
