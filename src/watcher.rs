//! Shader hot reload
//!
//! Watches the directory holding the ray-march program (editors often
//! replace files instead of writing in place, which a file watch would
//! miss) and reports changes to that one file. Events arrive on the
//! notify thread and are drained by the frame loop with [`ShaderWatcher::poll`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};

use crate::error::Result;

pub struct ShaderWatcher {
    path: PathBuf,
    // Dropping the watcher stops the notify thread
    _watcher: RecommendedWatcher,
    events: Receiver<()>,
}

impl ShaderWatcher {
    /// Start watching `path` for modification
    pub fn start(path: &Path) -> Result<Self> {
        let path = path.to_path_buf();
        let file_name = path.file_name().map(OsString::from).unwrap_or_default();
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => {
                    if is_change_of(&event, &file_name) {
                        // Receiver gone means the frame loop exited
                        let _ = tx.send(());
                    }
                }
                Err(e) => log::error!("File watcher error: {e:?}"),
            }
        })?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        log::info!("Watching {:?} for changes", path);

        Ok(Self {
            path,
            _watcher: watcher,
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the file changed since the last poll
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while self.events.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}

fn is_change_of(event: &Event, file_name: &OsString) -> bool {
    if !event.kind.is_modify() && !event.kind.is_create() {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some_and(|name| name == file_name.as_os_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_filters_by_file_name() {
        let name = OsString::from("march.wgsl");
        assert!(is_change_of(
            &event(EventKind::Modify(ModifyKind::Any), "/tmp/shaders/march.wgsl"),
            &name
        ));
        assert!(is_change_of(
            &event(EventKind::Create(CreateKind::File), "shaders/march.wgsl"),
            &name
        ));
        assert!(!is_change_of(
            &event(EventKind::Modify(ModifyKind::Any), "shaders/display.wgsl"),
            &name
        ));
        assert!(!is_change_of(
            &event(EventKind::Remove(RemoveKind::File), "shaders/march.wgsl"),
            &name
        ));
    }

    #[test]
    fn test_poll_without_changes_is_false() {
        let dir = std::env::temp_dir().join(format!("split-march-watch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("march.wgsl");
        std::fs::write(&file, "// empty").unwrap();

        let watcher = ShaderWatcher::start(&file).unwrap();
        assert_eq!(watcher.path(), file.as_path());
        // Nothing has been written since the watch started
        let _ = watcher.poll();
        assert!(!watcher.poll());

        std::fs::remove_dir_all(&dir).ok();
    }
}
