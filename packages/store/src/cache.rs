//! # Local cache: typed records on an abstract key-value store
//!
//! [`LocalCache`] is the client's local-first copy of the user's data. Every read and
//! write goes through the [`KeyValueStore`] trait, so the same logic runs against an
//! in-memory store (tests), the filesystem (native) or IndexedDB (web).
//!
//! ## Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `workouts/<id>` | JSON [`WorkoutDay`] |
//! | `pending` | JSON [`PendingChanges`]: days waiting to be pushed or deleted remotely |
//! | `library` | JSON `Vec<ExerciseName>` last fetched from the server |
//! | `timer` | JSON [`RestTimer`] of the running rest period |
//! | `config` | TOML [`TrackerConfig`] |
//! | `last_sync` | decimal milliseconds of the last successful sync |
//!
//! Records that fail to decode are treated as missing, in the same way the backends
//! treat I/O failures: the cache degrades to "no local data" and the server copy is
//! pulled again on the next sync.

use crate::config::TrackerConfig;
use crate::models::{ExerciseName, WorkoutDay};
use crate::sync::PendingChanges;
use crate::timer::RestTimer;

const WORKOUTS_PREFIX: &str = "workouts/";
const PENDING_KEY: &str = "pending";
const LIBRARY_KEY: &str = "library";
const TIMER_KEY: &str = "timer";
const CONFIG_KEY: &str = "config";
const LAST_SYNC_KEY: &str = "last_sync";

/// Async trait for storing and retrieving raw records.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Option<Vec<u8>>>;
    fn put(&self, key: &str, data: Vec<u8>) -> impl std::future::Future<Output = ()>;
    fn remove(&self, key: &str) -> impl std::future::Future<Output = ()>;
    /// All keys starting with `prefix`, which always ends with `/`.
    fn keys(&self, prefix: &str) -> impl std::future::Future<Output = Vec<String>>;
}

/// Typed access to the locally cached workout data.
pub struct LocalCache<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> LocalCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key).await?;
        serde_json::from_slice(&raw).ok()
    }

    async fn put_json<T: serde::Serialize>(&self, key: &str, value: &T) {
        if let Ok(raw) = serde_json::to_vec(value) {
            self.store.put(key, raw).await;
        }
    }

    /// All cached workout days, ordered by weekday then name.
    pub async fn list_workouts(&self) -> Vec<WorkoutDay> {
        let mut days = Vec::new();
        for key in self.store.keys(WORKOUTS_PREFIX).await {
            if let Some(day) = self.get_json::<WorkoutDay>(&key).await {
                days.push(day);
            }
        }
        days.sort_by(|a, b| a.day_index.cmp(&b.day_index).then_with(|| a.name.cmp(&b.name)));
        days
    }

    pub async fn get_workout(&self, id: &str) -> Option<WorkoutDay> {
        self.get_json(&workout_key(id)).await
    }

    /// Write a day without queueing it for upload (used for server copies).
    pub async fn put_workout(&self, day: &WorkoutDay) {
        self.put_json(&workout_key(&day.id), day).await;
    }

    /// Write a locally edited day and queue it for upload.
    pub async fn record_change(&self, day: &WorkoutDay) {
        self.put_workout(day).await;
        self.update_pending(|pending| pending.mark_dirty(&day.id)).await;
    }

    /// Remove a day locally and queue the remote delete.
    pub async fn delete_workout(&self, id: &str) {
        self.store.remove(&workout_key(id)).await;
        self.update_pending(|pending| pending.mark_deleted(id)).await;
    }

    /// Drop a day from the cache without queueing anything (server-side deletes).
    pub async fn remove_workout(&self, id: &str) {
        self.store.remove(&workout_key(id)).await;
    }

    pub async fn pending(&self) -> PendingChanges {
        self.get_json(PENDING_KEY).await.unwrap_or_default()
    }

    pub async fn set_pending(&self, pending: &PendingChanges) {
        self.put_json(PENDING_KEY, pending).await;
    }

    /// Re-read the queue, apply `change` and write it straight back.
    ///
    /// Callers touch only the ids they handle, so marks added by other writers between
    /// two updates are kept.
    pub async fn update_pending(&self, change: impl FnOnce(&mut PendingChanges)) {
        let mut pending = self.pending().await;
        change(&mut pending);
        self.set_pending(&pending).await;
    }

    pub async fn library(&self) -> Vec<ExerciseName> {
        self.get_json(LIBRARY_KEY).await.unwrap_or_default()
    }

    pub async fn set_library(&self, names: &[ExerciseName]) {
        self.put_json(LIBRARY_KEY, &names).await;
    }

    pub async fn timer(&self) -> Option<RestTimer> {
        self.get_json(TIMER_KEY).await
    }

    pub async fn set_timer(&self, timer: &RestTimer) {
        self.put_json(TIMER_KEY, timer).await;
    }

    pub async fn clear_timer(&self) {
        self.store.remove(TIMER_KEY).await;
    }

    /// Read preferences, falling back to defaults when absent or unreadable.
    pub async fn config(&self) -> TrackerConfig {
        let Some(raw) = self.store.get(CONFIG_KEY).await else {
            return TrackerConfig::default();
        };
        std::str::from_utf8(&raw)
            .ok()
            .and_then(|s| TrackerConfig::from_toml(s).ok())
            .unwrap_or_default()
    }

    pub async fn set_config(&self, config: &TrackerConfig) {
        if let Ok(toml) = config.to_toml() {
            self.store.put(CONFIG_KEY, toml.into_bytes()).await;
        }
    }

    pub async fn last_sync(&self) -> Option<i64> {
        let raw = self.store.get(LAST_SYNC_KEY).await?;
        std::str::from_utf8(&raw).ok()?.trim().parse().ok()
    }

    pub async fn set_last_sync(&self, millis: i64) {
        self.store
            .put(LAST_SYNC_KEY, millis.to_string().into_bytes())
            .await;
    }
}

fn workout_key(id: &str) -> String {
    format!("{WORKOUTS_PREFIX}{id}")
}
