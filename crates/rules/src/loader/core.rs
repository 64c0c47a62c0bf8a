//! Core [`SettingsSource`] struct: file-backed settings with optional hot-reload.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chatcfg_core::Settings;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use super::error::Result;
use super::watcher::handle_fs_event;

/// Callback invoked synchronously with every newly published settings snapshot.
pub type SettingsListener = Box<dyn Fn(&Settings) + Send + Sync>;

/// File-backed settings document with optional hot-reload.
///
/// Holds the latest successfully parsed snapshot. Whenever the file changes
/// and parses, the new snapshot replaces the old one and every listener is
/// called with it, in registration order.
pub struct SettingsSource {
    /// Path to the YAML settings file.
    path: PathBuf,
    /// Latest published snapshot.
    pub(super) current: Arc<RwLock<Arc<Settings>>>,
    /// Subscribers notified on every published change.
    pub(super) listeners: Arc<RwLock<Vec<SettingsListener>>>,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl SettingsSource {
    /// Read and parse the settings file. Fails if it is missing or malformed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = Settings::from_file(&path)?;
        info!(path = %path.display(), "loaded settings");
        Ok(Self {
            path,
            current: Arc::new(RwLock::new(Arc::new(settings))),
            listeners: Arc::new(RwLock::new(Vec::new())),
            _watcher: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The latest published snapshot.
    pub fn current(&self) -> Arc<Settings> {
        Arc::clone(&self.current.read().expect("settings lock poisoned"))
    }

    /// Register a listener for future snapshots.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&Settings) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .expect("listeners lock poisoned")
            .push(Box::new(listener));
    }

    /// Re-read the file now. Returns whether a changed snapshot was published.
    ///
    /// On a read or parse error the previous snapshot is kept.
    pub fn reload(&self) -> Result<bool> {
        reload_from_disk(&self.path, &self.current, &self.listeners)
    }

    /// Start a filesystem watcher on the settings file's directory.
    ///
    /// Editors often replace files by rename, so the directory is watched and
    /// events are filtered by file name.
    pub fn watch(&mut self) -> Result<()> {
        let current = Arc::clone(&self.current);
        let listeners = Arc::clone(&self.listeners);
        let path = self.path.clone();

        let mut watcher = notify::recommended_watcher(move |res: std::result::Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => handle_fs_event(&event, &path, &current, &listeners),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            }
        })?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.path.display(), "watching settings file for changes");
        self._watcher = Some(watcher);
        Ok(())
    }
}

/// Parse the file and publish it if it differs from the current snapshot.
pub(super) fn reload_from_disk(
    path: &Path,
    current: &Arc<RwLock<Arc<Settings>>>,
    listeners: &Arc<RwLock<Vec<SettingsListener>>>,
) -> Result<bool> {
    let settings = Settings::from_file(path)?;
    Ok(publish(settings, current, listeners))
}

/// Swap in `settings` as the current snapshot and notify listeners.
pub(super) fn publish(
    settings: Settings,
    current: &Arc<RwLock<Arc<Settings>>>,
    listeners: &Arc<RwLock<Vec<SettingsListener>>>,
) -> bool {
    if **current.read().expect("settings lock poisoned") == settings {
        debug!("settings unchanged, skipping reload");
        return false;
    }

    let snapshot = Arc::new(settings);
    *current.write().expect("settings lock poisoned") = Arc::clone(&snapshot);

    let listeners = listeners.read().expect("listeners lock poisoned");
    for listener in listeners.iter() {
        listener(&snapshot);
    }
    info!(listeners = listeners.len(), "published reloaded settings");
    true
}
