//! # Tracker context
//!
//! Centralized client state, provided as a [`Tracker`] by [`TrackerProvider`] and read
//! with [`use_tracker`]. Views never talk to the workout endpoints directly: every edit
//! is applied to the local cache first, queued, reflected in the `workouts` signal and
//! then pushed by a background sync. When the server is unreachable the queue simply
//! waits for the next attempt.
//!
//! Sync attempts happen after each edit, whenever the signed-in user or the
//! connectivity changes, and every `sync.auto_sync_interval_secs` while changes are
//! still pending.

use std::time::Duration;

use dioxus::prelude::*;
use store::clock::now_millis;
use store::models::BUILTIN_EXERCISES;
use store::{
    Exercise, ExerciseName, KeyValueStore, LocalCache, RestTimer, StoreError, SyncEngine,
    SyncReport, TrackerConfig, WorkoutDay,
};

use crate::auth::{use_auth, AuthState};
use crate::sync::{ApiRemote, SyncStatus};
use crate::{make_cache_for_user, sleep};

/// Handle to the shared client state. All fields are signals, so it is `Copy`.
#[derive(Clone, Copy)]
pub struct Tracker {
    auth: Signal<AuthState>,
    /// Cached workout days, ordered by weekday then name.
    pub workouts: Signal<Vec<WorkoutDay>>,
    pub status: Signal<SyncStatus>,
    /// The running rest timer, if any.
    pub timer: Signal<Option<RestTimer>>,
    pub config: Signal<TrackerConfig>,
}

pub fn use_tracker() -> Tracker {
    use_context::<Tracker>()
}

impl Tracker {
    fn cache(&self) -> LocalCache<impl KeyValueStore> {
        let user_id = self.auth.peek().user_id();
        make_cache_for_user(user_id.as_deref())
    }

    /// Reload every signal from the local cache.
    pub async fn load(&self) {
        let cache = self.cache();
        let (mut workouts, mut timer, mut config, mut status) =
            (self.workouts, self.timer, self.config, self.status);

        workouts.set(cache.list_workouts().await);
        config.set(cache.config().await);
        timer.set(cache.timer().await);
        let pending = cache.pending().await.len();
        let last_sync = cache.last_sync().await;
        status.with_mut(|s| {
            s.pending = pending;
            s.last_sync = last_sync;
        });
    }

    /// Create an empty day locally and queue it.
    pub async fn create_workout(&self, name: &str, day_index: u8) -> Result<WorkoutDay, StoreError> {
        let day = WorkoutDay::new(name, day_index, now_millis())?;
        self.commit(&day).await;
        Ok(day)
    }

    /// Apply `edit` to a cached day, stamp it and queue it for upload.
    ///
    /// The stamp is never older than the day's current `updated_at`, so a device with a
    /// lagging clock still produces an edit that wins the merge.
    pub async fn edit_workout<T>(
        &self,
        workout_id: &str,
        edit: impl FnOnce(&mut WorkoutDay, i64) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let cache = self.cache();
        let mut day = cache
            .get_workout(workout_id)
            .await
            .ok_or_else(|| StoreError::WorkoutNotFound(workout_id.to_string()))?;
        let now = now_millis().max(day.updated_at + 1);
        let out = edit(&mut day, now)?;
        self.commit(&day).await;
        Ok(out)
    }

    /// Shorthand for edits of a single exercise.
    pub async fn edit_exercise<T>(
        &self,
        workout_id: &str,
        exercise_id: &str,
        edit: impl FnOnce(&mut Exercise) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.edit_workout(workout_id, |day, now| day.edit_exercise(exercise_id, now, edit))
            .await
    }

    pub async fn delete_workout(&self, id: &str) {
        let cache = self.cache();
        cache.delete_workout(id).await;
        self.refresh(&cache).await;
        self.request_sync();
    }

    async fn commit(&self, day: &WorkoutDay) {
        let cache = self.cache();
        cache.record_change(day).await;
        self.refresh(&cache).await;
        self.request_sync();
    }

    async fn refresh(&self, cache: &LocalCache<impl KeyValueStore>) {
        let (mut workouts, mut status) = (self.workouts, self.status);
        workouts.set(cache.list_workouts().await);
        let pending = cache.pending().await.len();
        status.with_mut(|s| s.pending = pending);
    }

    /// Start a background sync unless one is already running.
    pub fn request_sync(&self) {
        let tracker = *self;
        spawn(async move {
            tracker.sync_now().await;
        });
    }

    /// Push the queue and pull the server copy. `None` when signed out, or when a sync
    /// is already running; that sync then makes one more pass.
    pub async fn sync_now(&self) -> Option<SyncReport> {
        self.auth.peek().user.as_ref()?;
        let mut status = self.status;
        if !status.with_mut(SyncStatus::begin) {
            return None;
        }

        loop {
            let cache = self.cache();
            let report = SyncEngine::sync(&cache, &ApiRemote).await;
            if let Some(e) = &report.error {
                tracing::warn!("Sync incomplete: {}", e);
            }

            self.refresh(&cache).await;
            let last_sync = cache.last_sync().await;
            let again = status.with_mut(|s| s.finish(report.error.clone(), last_sync));
            if !again {
                return Some(report);
            }
        }
    }

    /// Exercise names for pickers: the server list when reachable, else the cached one,
    /// else the built-in defaults.
    pub async fn library(&self) -> Vec<ExerciseName> {
        let cache = self.cache();
        match api::list_exercise_names().await {
            Ok(names) => {
                cache.set_library(&names).await;
                names
            }
            Err(e) => {
                tracing::warn!("Using cached exercise library: {}", e);
                let cached = cache.library().await;
                if cached.is_empty() {
                    builtin_library()
                } else {
                    cached
                }
            }
        }
    }

    pub async fn save_config(&self, config: TrackerConfig) {
        self.cache().set_config(&config).await;
        let mut signal = self.config;
        signal.set(config);
    }

    /// Start the rest timer for `exercise` with the configured rest length.
    pub async fn start_rest(&self, exercise: &Exercise) {
        let (secs, notify) = {
            let config = self.config.peek();
            (config.rest.default_secs, config.notifications.enabled)
        };
        let timer = RestTimer::start(&exercise.id, &exercise.name, secs, now_millis());
        self.cache().set_timer(&timer).await;
        let mut signal = self.timer;
        signal.set(Some(timer));

        if notify {
            if let Err(e) = api::schedule_rest_notification(secs, exercise.name.clone()).await {
                tracing::warn!("Could not schedule rest notification: {}", e);
            }
        }
    }

    /// Add `secs` to the running timer and move the notification accordingly.
    pub async fn extend_rest(&self, secs: u32) {
        let Some(mut timer) = self.timer.peek().clone() else {
            return;
        };
        timer.extend(secs);
        self.cache().set_timer(&timer).await;
        let remaining = timer.remaining_secs(now_millis());
        let name = timer.exercise_name.clone();
        let mut signal = self.timer;
        signal.set(Some(timer));

        if self.config.peek().notifications.enabled && remaining > 0 {
            if let Err(e) = api::schedule_rest_notification(remaining, name).await {
                tracing::warn!("Could not reschedule rest notification: {}", e);
            }
        }
    }

    pub async fn stop_rest(&self) {
        let running = self
            .timer
            .peek()
            .as_ref()
            .is_some_and(|t| !t.is_finished(now_millis()));
        self.cache().clear_timer().await;
        let mut signal = self.timer;
        signal.set(None);

        if running && self.config.peek().notifications.enabled {
            if let Err(e) = api::cancel_rest_notification().await {
                tracing::warn!("Could not cancel rest notification: {}", e);
            }
        }
    }
}

fn builtin_library() -> Vec<ExerciseName> {
    BUILTIN_EXERCISES
        .iter()
        .map(|name| ExerciseName {
            id: format!("builtin:{}", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            custom: false,
        })
        .collect()
}

/// Provides the [`Tracker`] context. Must sit inside [`crate::AuthProvider`].
#[component]
pub fn TrackerProvider(children: Element) -> Element {
    let auth = use_auth();
    let workouts = use_signal(Vec::new);
    let status = use_signal(SyncStatus::default);
    let timer = use_signal(|| None);
    let config = use_signal(TrackerConfig::default);
    let tracker = use_context_provider(|| Tracker {
        auth,
        workouts,
        status,
        timer,
        config,
    });

    // Reload from the user's cache and sync whenever the user or connectivity changes
    let _loader = use_resource(move || async move {
        let state = auth();
        if state.loading {
            return;
        }
        tracker.load().await;
        if state.user.is_some() && state.online {
            tracker.sync_now().await;
        }
    });

    // Periodic retry while changes are pending
    use_effect(move || {
        spawn(async move {
            loop {
                let interval = tracker.config.peek().sync.auto_sync_interval_secs;
                if interval == 0 {
                    sleep(Duration::from_secs(30)).await;
                    continue;
                }
                sleep(Duration::from_secs(u64::from(interval))).await;
                if tracker.status.peek().pending > 0 {
                    tracker.sync_now().await;
                }
            }
        });
    });

    rsx! {
        {children}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_library_matches_server_ids() {
        let names = builtin_library();
        assert_eq!(names.len(), BUILTIN_EXERCISES.len());
        assert!(names.iter().all(|n| !n.custom && n.id.starts_with("builtin:")));
        assert!(names.iter().all(|n| !n.id.contains(' ')));
    }
}
