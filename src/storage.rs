use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{DataFile, SettingsFile};

const DATA_FILE: &str = "data.json";
const SETTINGS_FILE: &str = "settings.json";
const BACKUP_DIR: &str = "backups";
const BACKUP_LIMIT: usize = 5;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidPath(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
            StorageError::InvalidPath(name) => write!(f, "invalid path: {name}"),
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

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(self.root.join(BACKUP_DIR))?;
        Ok(())
    }

    pub fn load_data(&self) -> Result<DataFile, StorageError> {
        self.load_json(self.root.join(DATA_FILE))
    }

    pub fn load_settings(&self) -> Result<SettingsFile, StorageError> {
        self.load_json(self.root.join(SETTINGS_FILE))
    }

    pub fn save_data(&self, data: &DataFile, with_backup: bool) -> Result<(), StorageError> {
        if with_backup {
            return self.write_with_backup(DATA_FILE, data);
        }
        self.write_atomic(self.root.join(DATA_FILE), data)
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

    fn write_with_backup<T: Serialize>(
        &self,
        filename: &str,
        data: &T,
    ) -> Result<(), StorageError> {
        let path = self.root.join(filename);
        if path.exists() {
            self.create_backup(&path)?;
        }
        self.write_atomic(path, data)
    }

    fn write_atomic<T: Serialize>(&self, path: PathBuf, data: &T) -> Result<(), StorageError> {
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

    pub fn create_backup(&self, path: &Path) -> Result<(), StorageError> {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let backup_name = format!("data-{timestamp}.json");
        let backup_path = self.root.join(BACKUP_DIR).join(backup_name);
        fs::copy(path, backup_path)?;
        self.trim_backups()?;
        Ok(())
    }

    pub fn list_backups(&self) -> Result<Vec<(String, i64)>, StorageError> {
        let mut entries: Vec<_> = fs::read_dir(self.root.join(BACKUP_DIR))?
            .filter_map(|entry| entry.ok())
            .collect();
        entries.sort_by_key(|entry| entry.metadata().and_then(|m| m.modified()).ok());
        let mut results = Vec::new();
        for entry in entries {
            if let Some(name) = entry.file_name().to_str() {
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
                    .map(|dur| dur.as_secs() as i64)
                    .unwrap_or(0);
                results.push((name.to_string(), modified));
            }
        }
        Ok(results)
    }

    pub fn restore_backup(&self, filename: &str) -> Result<DataFile, StorageError> {
        let path = self.backup_path(filename)?;
        let data: DataFile = self.load_json(path)?;
        self.write_atomic(self.root.join(DATA_FILE), &data)?;
        Ok(data)
    }

    pub fn restore_from_path(&self, source: &Path) -> Result<DataFile, StorageError> {
        let data: DataFile = self.load_json(source.to_path_buf())?;
        self.write_atomic(self.root.join(DATA_FILE), &data)?;
        Ok(data)
    }

    pub fn delete_backup(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.backup_path(filename)?;
        fs::remove_file(path)?;
        Ok(())
    }

    /// Backup names come from the UI; reject anything that would escape the
    /// backups directory.
    fn backup_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let name = Path::new(filename);
        if name.components().count() != 1 || filename.contains("..") {
            return Err(StorageError::InvalidPath(filename.to_string()));
        }
        Ok(self.root.join(BACKUP_DIR).join(filename))
    }

    fn trim_backups(&self) -> Result<(), StorageError> {
        let mut entries: Vec<_> = fs::read_dir(self.root.join(BACKUP_DIR))?
            .filter_map(|entry| entry.ok())
            .collect();
        entries.sort_by_key(|entry| entry.metadata().and_then(|m| m.modified()).ok());
        let to_remove = entries.len().saturating_sub(BACKUP_LIMIT);
        for entry in entries.into_iter().take(to_remove) {
            let _ = fs::remove_file(entry.path());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, Settings, Task};

    fn sample_data() -> DataFile {
        DataFile {
            schema_version: 1,
            tasks: vec![Task::new(1, 1, "t".into(), String::new(), 100)],
            projects: vec![Project::new(1, "p".into(), 100)],
            current_project_id: Some(1),
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();

        storage.save_data(&sample_data(), false).unwrap();
        let loaded = storage.load_data().unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.projects.len(), 1);
        assert_eq!(loaded.current_project_id, Some(1));

        // No stray temp file after an atomic write.
        assert!(!dir.path().join("data.tmp").exists());

        let settings = SettingsFile {
            schema_version: 1,
            settings: Settings::default(),
        };
        storage.save_settings(&settings).unwrap();
        assert_eq!(storage.load_settings().unwrap().settings.theme, "light");
    }

    #[test]
    fn save_with_backup_snapshots_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();

        // First save has nothing to back up.
        storage.save_data(&sample_data(), true).unwrap();
        assert!(storage.list_backups().unwrap().is_empty());

        storage.save_data(&sample_data(), true).unwrap();
        let backups = storage.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].0.starts_with("data-"));
    }

    #[test]
    fn restore_backup_rewrites_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();

        storage.save_data(&sample_data(), false).unwrap();
        storage
            .create_backup(&dir.path().join("data.json"))
            .unwrap();
        let name = storage.list_backups().unwrap()[0].0.clone();

        let mut emptied = sample_data();
        emptied.tasks.clear();
        storage.save_data(&emptied, false).unwrap();
        assert!(storage.load_data().unwrap().tasks.is_empty());

        let restored = storage.restore_backup(&name).unwrap();
        assert_eq!(restored.tasks.len(), 1);
        assert_eq!(storage.load_data().unwrap().tasks.len(), 1);
    }

    #[test]
    fn delete_backup_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();

        assert!(matches!(
            storage.delete_backup("../data.json"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            storage.restore_backup("nested/name.json"),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn trim_backups_keeps_newest_five() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();

        for i in 0..7 {
            fs::write(
                dir.path().join(BACKUP_DIR).join(format!("data-{i}.json")),
                b"{}",
            )
            .unwrap();
        }
        storage.trim_backups().unwrap();
        assert_eq!(storage.list_backups().unwrap().len(), BACKUP_LIMIT);
    }

    #[test]
    fn restore_from_path_reads_external_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();

        let external = dir.path().join("export.json");
        fs::write(&external, serde_json::to_vec(&sample_data()).unwrap()).unwrap();

        let data = storage.restore_from_path(&external).unwrap();
        assert_eq!(data.tasks.len(), 1);
        assert_eq!(storage.load_data().unwrap().tasks.len(), 1);

        assert!(storage
            .restore_from_path(Path::new("no-such-file.json"))
            .is_err());
    }
}
