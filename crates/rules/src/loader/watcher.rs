//! Filesystem event handler for the notify watcher (hot-reload).

use std::path::Path;
use std::sync::{Arc, RwLock};

use chatcfg_core::Settings;
use notify::{Event, EventKind};
use tracing::{info, warn};

use super::core::{reload_from_disk, SettingsListener};

/// Handle a single filesystem event from the notify watcher.
///
/// Only create/modify events touching the settings file trigger a reload.
/// Read or parse failures are logged and the previous snapshot is kept.
pub(super) fn handle_fs_event(
    event: &Event,
    settings_path: &Path,
    current: &Arc<RwLock<Arc<Settings>>>,
    listeners: &Arc<RwLock<Vec<SettingsListener>>>,
) {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return;
    }

    let target = settings_path.file_name();
    if !event.paths.iter().any(|p| p.file_name() == target) {
        return;
    }

    match reload_from_disk(settings_path, current, listeners) {
        Ok(true) => info!(path = %settings_path.display(), "hot-reloaded settings"),
        Ok(false) => {}
        Err(e) => warn!(
            path = %settings_path.display(),
            error = %e,
            "failed to reload settings, keeping previous version"
        ),
    }
}
