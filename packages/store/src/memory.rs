use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::cache::KeyValueStore;

/// In-memory KeyValueStore for testing and as a fallback when no storage is available.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.records.lock().ok()?.get(key).cloned()
    }

    async fn put(&self, key: &str, data: Vec<u8>) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(key.to_string(), data);
        }
    }

    async fn remove(&self, key: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.remove(key);
        }
    }

    async fn keys(&self, prefix: &str) -> Vec<String> {
        let Ok(records) = self.records.lock() else {
            return Vec::new();
        };
        records
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalCache;
    use crate::config::{TrackerConfig, WeightUnit};
    use crate::models::{ExerciseName, WorkoutDay};
    use crate::timer::RestTimer;

    #[tokio::test]
    async fn test_write_and_list_workouts() {
        let cache = LocalCache::new(MemoryStore::new());

        assert!(cache.list_workouts().await.is_empty());

        let legs = WorkoutDay::new("Legs", 3, 1).unwrap();
        let push = WorkoutDay::new("Push", 1, 1).unwrap();
        cache.put_workout(&legs).await;
        cache.put_workout(&push).await;

        let days = cache.list_workouts().await;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].name, "Push");
        assert_eq!(days[1].name, "Legs");
        assert_eq!(cache.get_workout(&legs.id).await, Some(legs));
    }

    #[tokio::test]
    async fn test_record_change_marks_dirty() {
        let cache = LocalCache::new(MemoryStore::new());
        let day = WorkoutDay::new("Pull", 2, 1).unwrap();

        cache.put_workout(&day).await;
        assert!(cache.pending().await.is_empty());

        cache.record_change(&day).await;
        assert!(cache.pending().await.dirty.contains(&day.id));
    }

    #[tokio::test]
    async fn test_delete_workout_queues_remote_delete() {
        let cache = LocalCache::new(MemoryStore::new());
        let day = WorkoutDay::new("Pull", 2, 1).unwrap();
        cache.record_change(&day).await;

        cache.delete_workout(&day.id).await;

        assert!(cache.get_workout(&day.id).await.is_none());
        let pending = cache.pending().await;
        assert!(pending.deleted.contains(&day.id));
        assert!(!pending.dirty.contains(&day.id));
    }

    #[tokio::test]
    async fn test_deleted_history_entry_persists() {
        let cache = LocalCache::new(MemoryStore::new());
        let mut day = WorkoutDay::new("Push", 1, 1).unwrap();
        let ex = day.add_exercise("Bench Press", 1).unwrap().id.clone();
        let first = day
            .edit_exercise(&ex, 2, |e| e.record_history("2024-01-01").map(|h| h.id.clone()))
            .unwrap();
        day.edit_exercise(&ex, 3, |e| e.record_history("2024-01-08").map(|_| ()))
            .unwrap();
        cache.record_change(&day).await;

        let mut loaded = cache.get_workout(&day.id).await.unwrap();
        loaded
            .edit_exercise(&ex, 4, |e| e.delete_history(&first).map(|_| ()))
            .unwrap();
        cache.record_change(&loaded).await;

        let reloaded = cache.get_workout(&day.id).await.unwrap();
        let history = &reloaded.exercise(&ex).unwrap().history;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, "2024-01-08");
    }

    #[tokio::test]
    async fn test_remove_workout_does_not_queue() {
        let cache = LocalCache::new(MemoryStore::new());
        let a = WorkoutDay::new("A", 1, 1).unwrap();
        let b = WorkoutDay::new("B", 2, 1).unwrap();
        cache.put_workout(&a).await;
        cache.put_workout(&b).await;

        cache.remove_workout(&a.id).await;

        assert_eq!(cache.list_workouts().await, vec![b]);
        assert!(cache.pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_pending_keeps_other_marks() {
        let cache = LocalCache::new(MemoryStore::new());
        cache.update_pending(|p| p.mark_dirty("a")).await;
        cache.update_pending(|p| p.mark_deleted("b")).await;
        cache.update_pending(|p| {
            p.dirty.remove("a");
        })
        .await;

        let pending = cache.pending().await;
        assert!(pending.dirty.is_empty());
        assert!(pending.deleted.contains("b"));
    }

    #[tokio::test]
    async fn test_infinite_weight_never_reaches_the_cache() {
        let cache = LocalCache::new(MemoryStore::new());
        let mut day = WorkoutDay::new("Push", 1, 1).unwrap();
        let ex = day.add_exercise("Bench Press", 1).unwrap().id.clone();
        cache.record_change(&day).await;

        let mut loaded = cache.get_workout(&day.id).await.unwrap();
        let edit = loaded.edit_exercise(&ex, 2, |e| e.update_set(0, f64::INFINITY, 5));
        assert_eq!(edit, Err(crate::StoreError::InvalidWeight));
        cache.record_change(&loaded).await;

        assert_eq!(cache.list_workouts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_timer_library_and_config_records() {
        let store = MemoryStore::new();
        let cache = LocalCache::new(store.clone());

        assert!(cache.timer().await.is_none());
        let timer = RestTimer::start("ex", "Squat", 90, 1_000);
        cache.set_timer(&timer).await;
        assert_eq!(cache.timer().await, Some(timer));
        cache.clear_timer().await;
        assert!(cache.timer().await.is_none());

        let names = vec![ExerciseName {
            id: "1".into(),
            name: "Squat".into(),
            custom: false,
        }];
        cache.set_library(&names).await;
        assert_eq!(cache.library().await, names);

        assert_eq!(cache.config().await, TrackerConfig::default());
        let config = TrackerConfig::default().with_unit(WeightUnit::Lb);
        cache.set_config(&config).await;
        assert_eq!(cache.config().await.units.weight, WeightUnit::Lb);

        assert!(cache.last_sync().await.is_none());
        cache.set_last_sync(42).await;
        assert_eq!(cache.last_sync().await, Some(42));
    }

    #[tokio::test]
    async fn test_corrupt_record_reads_as_missing() {
        let store = MemoryStore::new();
        store.put("workouts/broken", b"{not json".to_vec()).await;
        store.put("config", vec![0xff, 0xfe]).await;
        let cache = LocalCache::new(store);

        assert!(cache.list_workouts().await.is_empty());
        assert_eq!(cache.config().await, TrackerConfig::default());
    }
}
