//! # Filesystem-backed key-value store
//!
//! [`FileStore`] persists cache records as plain files so native builds keep their
//! workouts across restarts. Keys map directly onto relative paths:
//!
//! ```text
//! <base_dir>/
//! ├── workouts/
//! │   └── <workout_id>       # JSON workout day
//! ├── pending                # JSON pending changes
//! ├── library
//! ├── timer
//! ├── config                 # TOML preferences
//! └── last_sync
//! ```
//!
//! Use `dirs::data_dir()` to obtain a platform-appropriate base such as
//! `~/.local/share/liftbook/` on Linux.

use std::path::{Path, PathBuf};

use crate::cache::KeyValueStore;

/// Filesystem-backed KeyValueStore for native persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    /// Keys only ever contain `[A-Za-z0-9_-]` segments joined by `/`.
    fn path(&self, key: &str) -> Option<PathBuf> {
        let safe = key.split('/').all(|seg| {
            !seg.is_empty()
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });
        safe.then(|| self.base.join(key))
    }

    /// Delete a user-scoped store directory (`<base>/<user_id>/`).
    pub fn delete_scoped(base: &Path, user_id: &str) {
        let _ = std::fs::remove_dir_all(base.join(user_id));
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        std::fs::read(self.path(key)?).ok()
    }

    async fn put(&self, key: &str, data: Vec<u8>) {
        let Some(path) = self.path(key) else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = std::fs::write(path, data);
    }

    async fn remove(&self, key: &str) {
        if let Some(path) = self.path(key) {
            let _ = std::fs::remove_file(path);
        }
    }

    async fn keys(&self, prefix: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.base.join(prefix.trim_end_matches('/'))) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .map(|name| format!("{prefix}{name}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalCache;
    use crate::models::WorkoutDay;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("liftbook_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let cache = LocalCache::new(FileStore::new(dir.clone()));
        let mut day = WorkoutDay::new("Legs", 4, 1).unwrap();
        day.add_exercise("Squat", 1).unwrap();
        cache.record_change(&day).await;

        // Re-open from the same directory
        let reopened = LocalCache::new(FileStore::new(dir.clone()));
        let days = reopened.list_workouts().await;
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].exercises[0].name, "Squat");
        assert!(reopened.pending().await.dirty.contains(&day.id));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rejects_path_traversal() {
        let store = FileStore::new(std::env::temp_dir().join("liftbook_traversal"));
        assert!(store.path("../etc/passwd").is_none());
        assert!(store.path("workouts/").is_none());
        assert!(store.path("workouts/abc-123").is_some());
    }
}
