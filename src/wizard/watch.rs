// Drop folder - waits for a photo to be dropped into a watched directory

use super::intake::{declared_mime_type, is_accepted};
use notify::{EventKind, RecursiveMode};
use notify_debouncer_full::{DebounceEventResult, new_debouncer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub struct DropFolder {
    dir: PathBuf,
    debounce: Duration,
    ignore_patterns: Vec<String>,
}

impl DropFolder {
    pub fn new(dir: impl Into<PathBuf>, debounce: Duration, ignore_patterns: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            debounce,
            ignore_patterns,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hidden files and glob matches are skipped
    pub fn should_ignore(&self, path: &Path) -> bool {
        if let Some(file_name) = path.file_name() {
            if file_name.to_string_lossy().starts_with('.') {
                return true;
            }
        }

        let path_str = path.to_string_lossy();
        self.ignore_patterns
            .iter()
            .any(|pattern| glob_match::glob_match(pattern, &path_str))
    }

    /// A dropped file worth handing to intake.
    ///
    /// Non-image files are still returned so intake can reject them with its alert.
    pub fn photo_from_event(&self, event: &notify::Event) -> Option<PathBuf> {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return None;
        }

        event
            .paths
            .iter()
            .find(|path| !self.should_ignore(path) && path.is_file())
            .cloned()
    }

    /// Block until something is dropped into the folder
    pub async fn wait_for_drop(&self) -> Result<PathBuf, WatchError> {
        if !self.dir.is_dir() {
            return Err(WatchError::NotADirectory(self.dir.display().to_string()));
        }

        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(self.debounce, None, move |result: DebounceEventResult| {
            // The receiver is gone once a photo was picked
            let _ = tx.send(result);
        })
        .map_err(|e| WatchError::Notify(e.to_string()))?;

        debouncer
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Notify(e.to_string()))?;

        debug!(dir = %self.dir.display(), "waiting for a dropped photo");

        while let Some(result) = rx.recv().await {
            match result {
                Ok(events) => {
                    if let Some(path) = events.iter().find_map(|event| self.photo_from_event(event)) {
                        if !is_accepted(declared_mime_type(&path)) {
                            debug!(path = %path.display(), "non-image file dropped");
                        }
                        return Ok(path);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        warn!(%error, "watch error");
                    }
                }
            }
        }

        Err(WatchError::Closed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Watcher error: {0}")]
    Notify(String),

    #[error("Watcher stopped")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind};

    fn folder() -> DropFolder {
        DropFolder::new(
            std::env::temp_dir(),
            Duration::from_millis(50),
            vec!["**/*.part".to_string()],
        )
    }

    #[test]
    fn test_ignores_hidden_and_patterns() {
        let folder = folder();
        assert!(folder.should_ignore(Path::new("/drop/.DS_Store")));
        assert!(folder.should_ignore(Path::new("/drop/photo.jpg.part")));
        assert!(!folder.should_ignore(Path::new("/drop/photo.jpg")));
    }

    #[test]
    fn test_photo_from_create_event() {
        let path = std::env::temp_dir().join(format!("studio-watch-{}.png", std::process::id()));
        std::fs::write(&path, b"png").unwrap();
        let folder = folder();

        let created = notify::Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        assert_eq!(folder.photo_from_event(&created), Some(path.clone()));

        let accessed = notify::Event::new(EventKind::Access(AccessKind::Read)).add_path(path.clone());
        assert_eq!(folder.photo_from_event(&accessed), None);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_not_a_photo() {
        let missing = std::env::temp_dir().join("studio-watch-missing.png");
        let event = notify::Event::new(EventKind::Create(CreateKind::File)).add_path(missing);
        assert_eq!(folder().photo_from_event(&event), None);
    }

    #[tokio::test]
    async fn test_wait_requires_directory() {
        let folder = DropFolder::new("/definitely/not/here", Duration::from_millis(50), Vec::new());
        assert!(matches!(folder.wait_for_drop().await, Err(WatchError::NotADirectory(_))));
    }

    #[tokio::test]
    async fn test_wait_picks_up_dropped_file() {
        let dir = std::env::temp_dir().join(format!("studio-drop-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let folder = DropFolder::new(&dir, Duration::from_millis(50), Vec::new());

        let target = dir.join("selfie.jpg");
        let writer = {
            let target = target.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                tokio::fs::write(&target, b"jpeg").await.unwrap();
            })
        };

        let dropped = tokio::time::timeout(Duration::from_secs(10), folder.wait_for_drop())
            .await
            .unwrap()
            .unwrap();
        writer.await.unwrap();

        assert_eq!(dropped.file_name(), target.file_name());
        std::fs::remove_dir_all(&dir).ok();
    }
}
