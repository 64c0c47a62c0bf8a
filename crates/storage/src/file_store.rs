//! INI-file-backed [`ConfigStore`] with a pristine baseline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chatcfg_core::{ConfigStore, Settings, StoreError};
use tracing::{debug, info};

use crate::ini::IniDocument;

/// Live INI file plus the original it can be restored from.
///
/// The modified file is the one being edited; the original file is never
/// written after creation.
pub struct IniFileStore {
    original_path: PathBuf,
    modified_path: PathBuf,
    document: Mutex<IniDocument>,
}

impl IniFileStore {
    /// Open the store, creating missing files.
    ///
    /// A missing original is created empty; a missing modified file is copied
    /// from the original.
    pub fn open(original: Option<&Path>, modified: Option<&Path>) -> Result<Self, StoreError> {
        let (Some(original), Some(modified)) = (non_empty(original), non_empty(modified)) else {
            return Err(StoreError::NotConfigured(
                "both original_ini_path and modified_ini_path must be set in the settings file".into(),
            ));
        };

        if !original.exists() {
            info!(path = %original.display(), "creating empty original INI file as it does not exist");
            fs::write(original, "")?;
        }

        if !modified.exists() {
            info!(path = %modified.display(), "creating modified INI file from original");
            fs::copy(original, modified)?;
        }

        let document = IniDocument::parse(&fs::read_to_string(modified)?);
        Ok(Self {
            original_path: original.to_path_buf(),
            modified_path: modified.to_path_buf(),
            document: Mutex::new(document),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        Self::open(
            settings.original_ini_path.as_deref(),
            settings.modified_ini_path.as_deref(),
        )
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn modified_path(&self) -> &Path {
        &self.modified_path
    }

    /// Write `doc` to the modified file via a temp file and rename.
    fn persist(&self, doc: &IniDocument) -> Result<(), StoreError> {
        let file_name = self
            .modified_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("modified.ini");
        let tmp_path = self.modified_path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, doc.to_string())?;
        fs::rename(&tmp_path, &self.modified_path)?;
        debug!(path = %self.modified_path.display(), "persisted INI file");
        Ok(())
    }
}

impl ConfigStore for IniFileStore {
    fn get(&self, section: &str, property: &str) -> Result<String, StoreError> {
        let doc = self.document.lock().expect("ini document lock poisoned");
        Ok(doc.get(section, property).unwrap_or_default().to_string())
    }

    fn set(&self, section: &str, property: &str, value: &str) -> Result<(), StoreError> {
        let mut doc = self.document.lock().expect("ini document lock poisoned");
        let mut next = doc.clone();
        next.set(section, property, value);
        self.persist(&next)?;
        *doc = next;
        Ok(())
    }

    fn restore(&self) -> Result<(), StoreError> {
        let mut doc = self.document.lock().expect("ini document lock poisoned");
        info!(
            modified = %self.modified_path.display(),
            original = %self.original_path.display(),
            "restoring modified INI file from original"
        );
        fs::copy(&self.original_path, &self.modified_path)?;
        *doc = IniDocument::parse(&fs::read_to_string(&self.modified_path)?);
        Ok(())
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths(dir: &TempDir) -> (PathBuf, PathBuf) {
        (dir.path().join("original.ini"), dir.path().join("modified.ini"))
    }

    #[test]
    fn missing_paths_are_not_configured() {
        let err = IniFileStore::open(None, Some(Path::new("x.ini"))).err().unwrap();
        assert!(matches!(err, StoreError::NotConfigured(_)));
        let err = IniFileStore::open(Some(Path::new("")), Some(Path::new("x.ini"))).err().unwrap();
        assert!(matches!(err, StoreError::NotConfigured(_)));
    }

    #[test]
    fn creates_missing_files() {
        let dir = TempDir::new().unwrap();
        let (original, modified) = paths(&dir);
        let store = IniFileStore::open(Some(original.as_path()), Some(modified.as_path())).unwrap();
        assert!(original.exists());
        assert!(modified.exists());
        assert_eq!(store.get("Audio", "Volume").unwrap(), "");
    }

    #[test]
    fn modified_is_copied_from_original() {
        let dir = TempDir::new().unwrap();
        let (original, modified) = paths(&dir);
        fs::write(&original, "[Audio]\nVolume=50\n").unwrap();
        let store = IniFileStore::open(Some(original.as_path()), Some(modified.as_path())).unwrap();
        assert_eq!(store.get("Audio", "Volume").unwrap(), "50");
        assert_eq!(fs::read_to_string(&modified).unwrap(), "[Audio]\nVolume=50\n");
    }

    #[test]
    fn existing_modified_is_kept() {
        let dir = TempDir::new().unwrap();
        let (original, modified) = paths(&dir);
        fs::write(&original, "[Audio]\nVolume=50\n").unwrap();
        fs::write(&modified, "[Audio]\nVolume=90\n").unwrap();
        let store = IniFileStore::open(Some(original.as_path()), Some(modified.as_path())).unwrap();
        assert_eq!(store.get("Audio", "Volume").unwrap(), "90");
    }

    #[test]
    fn set_persists_before_returning() {
        let dir = TempDir::new().unwrap();
        let (original, modified) = paths(&dir);
        fs::write(&original, "[Audio]\nVolume=50\n").unwrap();
        let store = IniFileStore::open(Some(original.as_path()), Some(modified.as_path())).unwrap();

        store.set("Audio", "Volume", "80").unwrap();
        assert_eq!(fs::read_to_string(&modified).unwrap(), "[Audio]\nVolume=80\n");
        assert_eq!(fs::read_to_string(&original).unwrap(), "[Audio]\nVolume=50\n");
        assert!(!dir.path().join(".modified.ini.tmp").exists());
    }

    #[test]
    fn restore_reverts_to_original() {
        let dir = TempDir::new().unwrap();
        let (original, modified) = paths(&dir);
        fs::write(&original, "[Audio]\nVolume=50\n").unwrap();
        let store = IniFileStore::open(Some(original.as_path()), Some(modified.as_path())).unwrap();

        store.set("Audio", "Volume", "80").unwrap();
        store.set("Video", "Width", "640").unwrap();
        store.restore().unwrap();

        assert_eq!(store.get("Audio", "Volume").unwrap(), "50");
        assert_eq!(store.get("Video", "Width").unwrap(), "");
        assert_eq!(fs::read_to_string(&modified).unwrap(), "[Audio]\nVolume=50\n");
    }

    #[test]
    fn from_settings_uses_configured_paths() {
        let dir = TempDir::new().unwrap();
        let (original, modified) = paths(&dir);
        let settings = Settings {
            original_ini_path: Some(original.clone()),
            modified_ini_path: Some(modified.clone()),
            ..Settings::default()
        };
        let store = IniFileStore::from_settings(&settings).unwrap();
        assert_eq!(store.original_path(), original.as_path());
        assert_eq!(store.modified_path(), modified.as_path());
    }
}
