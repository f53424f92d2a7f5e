//! Last-write-wins merge of locally modified and server workout data.
//!
//! Day metadata and exercise order come from whichever side has the newer
//! `updated_at` (ties go to the remote copy). Individual exercises are then upgraded
//! from the other side when its copy is strictly newer, so concurrent edits to
//! different exercises of the same day both survive.

use std::collections::{BTreeSet, HashMap};

use crate::models::WorkoutDay;

/// Merge two versions of the same workout day.
pub fn merge_day(local: &WorkoutDay, remote: &WorkoutDay) -> WorkoutDay {
    let (base, other) = if local.updated_at > remote.updated_at {
        (local, remote)
    } else {
        (remote, local)
    };

    let others: HashMap<&str, _> = other
        .exercises
        .iter()
        .map(|e| (e.id.as_str(), e))
        .collect();

    let mut merged = base.clone();
    for exercise in &mut merged.exercises {
        if let Some(theirs) = others.get(exercise.id.as_str()) {
            if theirs.updated_at > exercise.updated_at {
                *exercise = (*theirs).clone();
            }
        }
    }
    merged.updated_at = local.updated_at.max(remote.updated_at);
    merged
}

/// Merge the full local list with the full server list.
///
/// `dirty` holds the ids of local days that have not been pushed yet: a local-only day
/// survives only when it is dirty, otherwise it was deleted on the server.
pub fn merge_lists(
    local: &[WorkoutDay],
    remote: &[WorkoutDay],
    dirty: &BTreeSet<String>,
) -> Vec<WorkoutDay> {
    let locals: HashMap<&str, &WorkoutDay> = local.iter().map(|d| (d.id.as_str(), d)).collect();
    let remote_ids: BTreeSet<&str> = remote.iter().map(|d| d.id.as_str()).collect();

    let mut merged: Vec<WorkoutDay> = remote
        .iter()
        .map(|theirs| match locals.get(theirs.id.as_str()) {
            Some(ours) => merge_day(ours, theirs),
            None => theirs.clone(),
        })
        .collect();

    merged.extend(
        local
            .iter()
            .filter(|d| !remote_ids.contains(d.id.as_str()) && dirty.contains(&d.id))
            .cloned(),
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutDay;

    fn day_with_two_exercises() -> (WorkoutDay, String, String) {
        let mut day = WorkoutDay::new("Push", 1, 100).unwrap();
        let a = day.add_exercise("Bench Press", 100).unwrap().id.clone();
        let b = day.add_exercise("Dip", 100).unwrap().id.clone();
        (day, a, b)
    }

    #[test]
    fn test_newer_side_wins_metadata() {
        let (base, _, _) = day_with_two_exercises();
        let mut local = base.clone();
        let mut remote = base.clone();
        local.rename("Push A", 200).unwrap();
        remote.rename("Push B", 300).unwrap();

        let merged = merge_day(&local, &remote);
        assert_eq!(merged.name, "Push B");
        assert_eq!(merged.updated_at, 300);
    }

    #[test]
    fn test_equal_stamps_go_to_remote() {
        let (base, a, _) = day_with_two_exercises();
        let mut local = base.clone();
        let mut remote = base.clone();
        local.rename("Local name", 200).unwrap();
        remote.rename("Server name", 200).unwrap();
        local
            .edit_exercise(&a, 200, |ex| ex.update_set(0, 50.0, 5))
            .unwrap();
        remote
            .edit_exercise(&a, 200, |ex| ex.update_set(0, 60.0, 5))
            .unwrap();

        let merged = merge_day(&local, &remote);
        assert_eq!(merged.name, "Server name");
        assert_eq!(merged.exercise(&a).unwrap().sets[0].weight, 60.0);
        assert_eq!(merged.updated_at, 200);
    }

    #[test]
    fn test_newer_exercise_copy_is_kept_from_older_side() {
        let (base, a, b) = day_with_two_exercises();
        let mut local = base.clone();
        let mut remote = base.clone();

        // Local edits exercise A at 200, remote edits exercise B at 300
        local
            .edit_exercise(&a, 200, |ex| ex.update_set(0, 80.0, 5))
            .unwrap();
        remote
            .edit_exercise(&b, 300, |ex| ex.update_set(0, 10.0, 12))
            .unwrap();

        let merged = merge_day(&local, &remote);
        assert_eq!(merged.exercise(&a).unwrap().sets[0].weight, 80.0);
        assert_eq!(merged.exercise(&b).unwrap().sets[0].reps, 12);
    }

    #[test]
    fn test_exercise_deleted_by_newer_side_stays_deleted() {
        let (base, a, _) = day_with_two_exercises();
        let local = base.clone();
        let mut remote = base.clone();
        remote.remove_exercise(&a, 500).unwrap();

        let merged = merge_day(&local, &remote);
        assert!(merged.exercise(&a).is_none());
        assert_eq!(merged.exercises.len(), 1);
    }

    #[test]
    fn test_merge_lists_keeps_dirty_local_only_days() {
        let shared = WorkoutDay::new("Legs", 2, 10).unwrap();
        let offline = WorkoutDay::new("Pull", 3, 20).unwrap();
        let stale = WorkoutDay::new("Old", 4, 5).unwrap();
        let server_only = WorkoutDay::new("Core", 5, 30).unwrap();

        let local = vec![shared.clone(), offline.clone(), stale.clone()];
        let remote = vec![shared.clone(), server_only.clone()];
        let dirty: BTreeSet<String> = [offline.id.clone()].into_iter().collect();

        let merged = merge_lists(&local, &remote, &dirty);
        let ids: BTreeSet<&str> = merged.iter().map(|d| d.id.as_str()).collect();

        assert!(ids.contains(shared.id.as_str()));
        assert!(ids.contains(offline.id.as_str()));
        assert!(ids.contains(server_only.id.as_str()));
        assert!(!ids.contains(stale.id.as_str()));
    }
}
