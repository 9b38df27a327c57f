use std::fs;
use std::path::{Path, PathBuf};
use synthbox_ports::storage::{SettingsDto, StorageError, StoragePort};

pub const SETTINGS_FILE: &str = "settings.json";

pub struct FsStorage {
    settings_path: PathBuf,
}

impl FsStorage {
    /// Settings stored as `settings.json` inside `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            settings_path: base_dir.join(SETTINGS_FILE),
        }
    }

    /// Settings stored in an explicit file.
    pub fn with_file(path: PathBuf) -> Self {
        Self {
            settings_path: path,
        }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join("synthbox"))
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
        let data = fs::read(path).map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let data =
            serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(base_dir)
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(SettingsDto::default());
        }
        let settings: SettingsDto = Self::read_json(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        s.validate()?;
        Self::write_json(self.settings_path(), s)
    }
}
