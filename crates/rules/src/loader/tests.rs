//! Tests for the settings loader module.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tempfile::TempDir;

use super::core::publish;
use super::watcher::handle_fs_event;
use super::*;

const SETTINGS_YAML: &str = r#"
commands:
  - ["louder", "!:[Audio] Volume = 100"]
command_get_regex: '^(?P<property>\w+)$'
command_set_regex: '^(?P<property>\w+)\s*=\s*(?P<value>.+)$'
command_prefix: "!"
command_delimiter: ":"
command_reset: reset
"#;

fn temp_source() -> (TempDir, PathBuf, SettingsSource) {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("settings.yml");
    fs::write(&path, SETTINGS_YAML).unwrap();
    let source = SettingsSource::load(&path).unwrap();
    (dir, path, source)
}

fn modify_event(path: &std::path::Path) -> Event {
    Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(path.to_path_buf())
}

#[test]
fn load_reads_initial_snapshot() {
    let (_dir, path, source) = temp_source();
    assert_eq!(source.path(), path.as_path());
    assert_eq!(source.current().command_prefix, "!");
    assert_eq!(source.current().commands.len(), 1);
}

#[test]
fn load_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let err = SettingsSource::load(dir.path().join("nope.yml")).err().unwrap();
    assert!(matches!(err, RuleError::Settings(_)));
}

#[test]
fn reload_publishes_changes_to_listeners() {
    let (_dir, path, source) = temp_source();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    source.subscribe(move |s| seen_clone.lock().unwrap().push(s.command_prefix.clone()));

    fs::write(&path, SETTINGS_YAML.replace("command_prefix: \"!\"", "command_prefix: \"?\"")).unwrap();
    assert!(source.reload().unwrap());

    assert_eq!(*seen.lock().unwrap(), vec!["?".to_string()]);
    assert_eq!(source.current().command_prefix, "?");
}

#[test]
fn reload_unchanged_file_skips_listeners() {
    let (_dir, _path, source) = temp_source();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    source.subscribe(move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!source.reload().unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn reload_parse_error_keeps_previous() {
    let (_dir, path, source) = temp_source();
    fs::write(&path, "commands: [[[").unwrap();
    assert!(source.reload().is_err());
    assert_eq!(source.current().commands.len(), 1);
}

#[test]
fn listeners_called_in_registration_order() {
    let (_dir, _path, source) = temp_source();
    let order = Arc::new(Mutex::new(Vec::new()));
    for i in 0..3 {
        let order = Arc::clone(&order);
        source.subscribe(move |_| order.lock().unwrap().push(i));
    }

    let mut next = (*source.current()).clone();
    next.command_reset = "wipe".to_string();
    assert!(publish(next, &source.current, &source.listeners));
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn fs_event_for_settings_file_triggers_reload() {
    let (_dir, path, source) = temp_source();
    fs::write(&path, SETTINGS_YAML.replace("command_reset: reset", "command_reset: restart")).unwrap();

    handle_fs_event(&modify_event(&path), &path, &source.current, &source.listeners);
    assert_eq!(source.current().command_reset, "restart");
}

#[test]
fn fs_event_for_other_file_is_ignored() {
    let (dir, path, source) = temp_source();
    fs::write(&path, SETTINGS_YAML.replace("command_reset: reset", "command_reset: restart")).unwrap();

    let other = dir.path().join("other.yml");
    handle_fs_event(&modify_event(&other), &path, &source.current, &source.listeners);
    assert_eq!(source.current().command_reset, "reset");
}

#[test]
fn fs_remove_event_is_ignored() {
    let (_dir, path, source) = temp_source();
    fs::write(&path, SETTINGS_YAML.replace("command_reset: reset", "command_reset: restart")).unwrap();

    let event = Event::new(EventKind::Remove(RemoveKind::File)).add_path(path.clone());
    handle_fs_event(&event, &path, &source.current, &source.listeners);
    assert_eq!(source.current().command_reset, "reset");
}

#[test]
fn fs_create_event_with_bad_yaml_keeps_previous() {
    let (_dir, path, source) = temp_source();
    fs::write(&path, "command_prefix: [").unwrap();

    let event = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
    handle_fs_event(&event, &path, &source.current, &source.listeners);
    assert_eq!(source.current().command_prefix, "!");
}

#[test]
fn watch_starts_on_existing_directory() {
    let (_dir, _path, mut source) = temp_source();
    source.watch().unwrap();
}
