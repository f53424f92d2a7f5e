//! # Deferred synchronisation of local edits
//!
//! Edits are applied to the [`LocalCache`] first and recorded in [`PendingChanges`].
//! [`SyncEngine::sync`] later drains that queue against a [`SyncRemote`]:
//!
//! 1. push remote deletions, then dirty days, one at a time;
//! 2. stop at the first failure: the rest of the queue stays for the next attempt;
//! 3. when the queue is empty, fetch the server list and merge it into the cache with
//!    [`merge_lists`].
//!
//! Whatever the server returns for a pushed day is already merged on its side, so it
//! replaces the local copy unless the day was edited again while the push was in
//! flight.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::cache::{KeyValueStore, LocalCache};
use crate::clock::now_millis;
use crate::merge::{merge_day, merge_lists};
use crate::models::WorkoutDay;

/// Days waiting for the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingChanges {
    #[serde(default)]
    pub dirty: BTreeSet<String>,
    #[serde(default)]
    pub deleted: BTreeSet<String>,
}

impl PendingChanges {
    pub fn mark_dirty(&mut self, id: &str) {
        self.deleted.remove(id);
        self.dirty.insert(id.to_string());
    }

    pub fn mark_deleted(&mut self, id: &str) {
        self.dirty.remove(id);
        self.deleted.insert(id.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dirty.len() + self.deleted.len()
    }
}

/// The server side of a sync, implemented over the REST endpoints by the UI.
pub trait SyncRemote {
    /// Upsert a day and return the server's merged copy.
    fn push_workout(
        &self,
        day: WorkoutDay,
    ) -> impl std::future::Future<Output = Result<WorkoutDay, String>>;
    /// Delete a day. Deleting an unknown id succeeds.
    fn delete_workout(&self, id: &str) -> impl std::future::Future<Output = Result<(), String>>;
    fn fetch_workouts(&self) -> impl std::future::Future<Output = Result<Vec<WorkoutDay>, String>>;
}

/// Outcome of one sync attempt.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    pub pushed: usize,
    pub deleted: usize,
    /// Number of days held locally after the merge, when the pull happened.
    pub pulled: Option<usize>,
    /// First error; the remaining queue is kept for the next attempt.
    pub error: Option<String>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.pulled.is_some()
    }
}

pub struct SyncEngine;

impl SyncEngine {
    pub async fn sync<S: KeyValueStore, R: SyncRemote>(
        cache: &LocalCache<S>,
        remote: &R,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        let deletions = cache.pending().await.deleted;
        for id in deletions {
            if let Err(e) = remote.delete_workout(&id).await {
                report.error = Some(e);
                return report;
            }
            cache
                .update_pending(|pending| {
                    pending.deleted.remove(&id);
                })
                .await;
            report.deleted += 1;
        }

        let dirty = cache.pending().await.dirty;
        for id in dirty {
            let Some(local) = cache.get_workout(&id).await else {
                // Deleted locally after being queued; the delete is queued separately
                cache
                    .update_pending(|pending| {
                        pending.dirty.remove(&id);
                    })
                    .await;
                continue;
            };
            let sent_at = local.updated_at;
            let merged = match remote.push_workout(local).await {
                Ok(merged) => merged,
                Err(e) => {
                    report.error = Some(e);
                    return report;
                }
            };
            report.pushed += 1;

            let stored_at = match cache.get_workout(&id).await {
                // Edited again while in flight: keep it dirty and merge
                Some(current) if current.updated_at > sent_at => {
                    cache.put_workout(&merge_day(&current, &merged)).await;
                    continue;
                }
                Some(_) => {
                    cache.put_workout(&merged).await;
                    merged.updated_at
                }
                None => continue,
            };
            // An edit committed while the server copy was written stamps a newer time
            let settled = cache
                .get_workout(&id)
                .await
                .is_some_and(|day| day.updated_at <= stored_at);
            if settled {
                cache
                    .update_pending(|pending| {
                        pending.dirty.remove(&id);
                    })
                    .await;
            }
        }

        match remote.fetch_workouts().await {
            Ok(server_days) => {
                let local = cache.list_workouts().await;
                let pending = cache.pending().await;
                let mut merged = merge_lists(&local, &server_days, &pending.dirty);
                for day in &mut merged {
                    day.normalize();
                }
                Self::apply_pull(cache, &local, &merged).await;
                cache.set_last_sync(now_millis()).await;
                report.pulled = Some(merged.len());
            }
            Err(e) => report.error = Some(e),
        }
        report
    }

    /// Write the merged list, leaving alone every day that changed locally after
    /// `snapshot` was read. Those are dirty and reconcile on the next sync.
    async fn apply_pull<S: KeyValueStore>(
        cache: &LocalCache<S>,
        snapshot: &[WorkoutDay],
        merged: &[WorkoutDay],
    ) {
        let seen: HashMap<&str, i64> = snapshot
            .iter()
            .map(|d| (d.id.as_str(), d.updated_at))
            .collect();
        let unchanged = |current: &Option<WorkoutDay>, id: &str| {
            current.as_ref().map(|d| d.updated_at) == seen.get(id).copied()
        };

        for day in merged {
            let current = cache.get_workout(&day.id).await;
            if unchanged(&current, &day.id) {
                cache.put_workout(day).await;
            }
        }

        let kept: BTreeSet<&str> = merged.iter().map(|d| d.id.as_str()).collect();
        for day in snapshot.iter().filter(|d| !kept.contains(d.id.as_str())) {
            let current = cache.get_workout(&day.id).await;
            let dirty = cache.pending().await.dirty.contains(&day.id);
            if !dirty && unchanged(&current, &day.id) {
                cache.remove_workout(&day.id).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// Server double: a map of days plus a switch to simulate being offline.
    #[derive(Default)]
    struct FakeRemote {
        days: RefCell<HashMap<String, WorkoutDay>>,
        offline: Cell<bool>,
        pushes: Cell<usize>,
        /// Deletes accepted before the connection drops; `None` never drops.
        deletes_left: Cell<Option<usize>>,
    }

    impl SyncRemote for FakeRemote {
        async fn push_workout(&self, day: WorkoutDay) -> Result<WorkoutDay, String> {
            if self.offline.get() {
                return Err("offline".to_string());
            }
            self.pushes.set(self.pushes.get() + 1);
            let mut days = self.days.borrow_mut();
            let merged = match days.get(&day.id) {
                Some(existing) => merge_day(&day, existing),
                None => day,
            };
            days.insert(merged.id.clone(), merged.clone());
            Ok(merged)
        }

        async fn delete_workout(&self, id: &str) -> Result<(), String> {
            if self.offline.get() || self.deletes_left.get() == Some(0) {
                return Err("offline".to_string());
            }
            if let Some(left) = self.deletes_left.get() {
                self.deletes_left.set(Some(left - 1));
            }
            self.days.borrow_mut().remove(id);
            Ok(())
        }

        async fn fetch_workouts(&self) -> Result<Vec<WorkoutDay>, String> {
            if self.offline.get() {
                return Err("offline".to_string());
            }
            Ok(self.days.borrow().values().cloned().collect())
        }
    }

    /// Store that commits one extra local edit the first time a given key is written,
    /// the way a user edit lands while a sync is suspended on storage.
    #[derive(Default)]
    struct EditDuringWrite {
        inner: MemoryStore,
        armed: RefCell<Option<(String, WorkoutDay)>>,
    }

    impl EditDuringWrite {
        fn arm(&self, day_id: &str, edit: WorkoutDay) {
            *self.armed.borrow_mut() = Some((format!("workouts/{day_id}"), edit));
        }
    }

    impl KeyValueStore for EditDuringWrite {
        async fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, data: Vec<u8>) {
            self.inner.put(key, data).await;
            let fire = matches!(&*self.armed.borrow(), Some((trigger, _)) if trigger == key);
            if fire {
                let armed = self.armed.borrow_mut().take();
                if let Some((_, edit)) = armed {
                    LocalCache::new(self.inner.clone()).record_change(&edit).await;
                }
            }
        }

        async fn remove(&self, key: &str) {
            self.inner.remove(key).await;
        }

        async fn keys(&self, prefix: &str) -> Vec<String> {
            self.inner.keys(prefix).await
        }
    }

    #[tokio::test]
    async fn test_sync_pushes_dirty_and_pulls() {
        let cache = LocalCache::new(MemoryStore::new());
        let remote = FakeRemote::default();

        let local = WorkoutDay::new("Push", 1, 10).unwrap();
        cache.record_change(&local).await;
        let server_only = WorkoutDay::new("Legs", 3, 20).unwrap();
        remote
            .days
            .borrow_mut()
            .insert(server_only.id.clone(), server_only.clone());

        let report = SyncEngine::sync(&cache, &remote).await;

        assert!(report.is_complete());
        assert_eq!(report.pushed, 1);
        assert_eq!(report.pulled, Some(2));
        assert!(cache.pending().await.is_empty());
        assert!(cache.get_workout(&server_only.id).await.is_some());
        assert!(remote.days.borrow().contains_key(&local.id));
        assert!(cache.last_sync().await.is_some());
    }

    #[tokio::test]
    async fn test_failed_push_keeps_queue_for_retry() {
        let cache = LocalCache::new(MemoryStore::new());
        let remote = FakeRemote::default();
        remote.offline.set(true);

        let mut day = WorkoutDay::new("Pull", 2, 10).unwrap();
        let ex = day.add_exercise("Pull Up", 10).unwrap().id.clone();
        day.edit_exercise(&ex, 11, |e| {
            e.add_set();
            Ok(())
        })
        .unwrap();
        cache.record_change(&day).await;

        let report = SyncEngine::sync(&cache, &remote).await;
        assert_eq!(report.error.as_deref(), Some("offline"));
        assert_eq!(report.pulled, None);
        assert!(cache.pending().await.dirty.contains(&day.id));
        // Local data is untouched while offline
        assert_eq!(cache.get_workout(&day.id).await.unwrap().exercises[0].sets.len(), 2);

        // Back online: the queue drains
        remote.offline.set(false);
        let report = SyncEngine::sync(&cache, &remote).await;
        assert!(report.is_complete());
        assert!(cache.pending().await.is_empty());
        assert_eq!(remote.days.borrow()[&day.id].exercises[0].sets.len(), 2);
    }

    #[tokio::test]
    async fn test_local_delete_reaches_server() {
        let cache = LocalCache::new(MemoryStore::new());
        let remote = FakeRemote::default();
        let day = WorkoutDay::new("Core", 5, 10).unwrap();
        remote.days.borrow_mut().insert(day.id.clone(), day.clone());
        cache.put_workout(&day).await;

        cache.delete_workout(&day.id).await;
        let report = SyncEngine::sync(&cache, &remote).await;

        assert_eq!(report.deleted, 1);
        assert!(remote.days.borrow().is_empty());
        assert!(cache.list_workouts().await.is_empty());
    }

    #[tokio::test]
    async fn test_server_edit_merges_with_local_edit() {
        let cache = LocalCache::new(MemoryStore::new());
        let remote = FakeRemote::default();

        let mut base = WorkoutDay::new("Push", 1, 10).unwrap();
        let bench = base.add_exercise("Bench Press", 10).unwrap().id.clone();
        let dip = base.add_exercise("Dip", 10).unwrap().id.clone();
        cache.put_workout(&base).await;

        // Another device edited the dips later than our bench edit
        let mut server = base.clone();
        server
            .edit_exercise(&dip, 30, |e| e.update_set(0, 20.0, 8))
            .unwrap();
        remote.days.borrow_mut().insert(server.id.clone(), server);

        let mut local = base.clone();
        local
            .edit_exercise(&bench, 20, |e| e.update_set(0, 70.0, 5))
            .unwrap();
        cache.record_change(&local).await;

        SyncEngine::sync(&cache, &remote).await;

        let merged = cache.get_workout(&base.id).await.unwrap();
        assert_eq!(merged.exercise(&bench).unwrap().sets[0].weight, 70.0);
        assert_eq!(merged.exercise(&dip).unwrap().sets[0].weight, 20.0);
    }

    #[tokio::test]
    async fn test_clean_local_day_removed_on_server_is_dropped() {
        let cache = LocalCache::new(MemoryStore::new());
        let remote = FakeRemote::default();
        let day = WorkoutDay::new("Old", 0, 1).unwrap();
        cache.put_workout(&day).await;

        let report = SyncEngine::sync(&cache, &remote).await;

        assert_eq!(report.pulled, Some(0));
        assert_eq!(remote.pushes.get(), 0);
        assert!(cache.list_workouts().await.is_empty());
    }

    #[tokio::test]
    async fn test_day_created_while_push_is_stored_survives() {
        let cache = LocalCache::new(EditDuringWrite::default());
        let remote = FakeRemote::default();
        let pushed = WorkoutDay::new("Push", 1, 10).unwrap();
        cache.record_change(&pushed).await;

        let created = WorkoutDay::new("Offline day", 4, 20).unwrap();
        cache.store().arm(&pushed.id, created.clone());

        let report = SyncEngine::sync(&cache, &remote).await;

        assert_eq!(report.pushed, 1);
        assert!(report.error.is_none());
        assert_eq!(cache.get_workout(&created.id).await, Some(created.clone()));
        let pending = cache.pending().await;
        assert!(pending.dirty.contains(&created.id));
        assert!(!pending.dirty.contains(&pushed.id));
    }

    #[tokio::test]
    async fn test_day_edited_while_pull_is_written_is_kept() {
        let cache = LocalCache::new(EditDuringWrite::default());
        let remote = FakeRemote::default();

        // Clean local day the server no longer has: the pull would drop it
        let stale = WorkoutDay::new("Stale", 2, 10).unwrap();
        cache.put_workout(&stale).await;
        let server_day = WorkoutDay::new("Legs", 3, 10).unwrap();
        remote
            .days
            .borrow_mut()
            .insert(server_day.id.clone(), server_day.clone());

        let mut revived = stale.clone();
        revived.rename("Revived", 50).unwrap();
        cache.store().arm(&server_day.id, revived.clone());

        let report = SyncEngine::sync(&cache, &remote).await;

        assert_eq!(report.pulled, Some(1));
        assert!(cache.get_workout(&server_day.id).await.is_some());
        assert_eq!(cache.get_workout(&stale.id).await, Some(revived));
        assert!(cache.pending().await.dirty.contains(&stale.id));
    }

    #[test]
    fn test_mark_dirty_undoes_delete() {
        let mut pending = PendingChanges::default();
        pending.mark_deleted("a");
        pending.mark_dirty("a");

        assert!(pending.dirty.contains("a"));
        assert!(!pending.deleted.contains("a"));
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_queued_day_missing_locally_is_not_pushed() {
        let cache = LocalCache::new(MemoryStore::new());
        let remote = FakeRemote::default();
        cache.update_pending(|p| p.mark_dirty("gone")).await;

        let report = SyncEngine::sync(&cache, &remote).await;

        assert!(report.is_complete());
        assert_eq!(report.pushed, 0);
        assert_eq!(remote.pushes.get(), 0);
        assert!(cache.pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_rest_of_queue() {
        let cache = LocalCache::new(MemoryStore::new());
        let remote = FakeRemote::default();
        for name in ["A", "B", "C"] {
            let day = WorkoutDay::new(name, 1, 10).unwrap();
            remote.days.borrow_mut().insert(day.id.clone(), day.clone());
            cache.put_workout(&day).await;
            cache.delete_workout(&day.id).await;
        }
        remote.deletes_left.set(Some(1));

        let report = SyncEngine::sync(&cache, &remote).await;
        assert_eq!(report.deleted, 1);
        assert_eq!(report.error.as_deref(), Some("offline"));
        assert_eq!(cache.pending().await.deleted.len(), 2);
        assert_eq!(remote.days.borrow().len(), 2);

        remote.deletes_left.set(None);
        let report = SyncEngine::sync(&cache, &remote).await;
        assert_eq!(report.deleted, 2);
        assert!(report.is_complete());
        assert!(cache.pending().await.is_empty());
        assert!(remote.days.borrow().is_empty());
    }
}
