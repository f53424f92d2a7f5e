//! # Domain models for workouts, exercises, sets and history
//!
//! These types are shared by every layer: the server stores them (the exercise tree is
//! a JSONB column), the client caches them in local storage, and Dioxus server functions
//! carry them across the wire. All of them are `Serialize + Deserialize`.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`WorkoutDay`] | A named collection of exercises scheduled on a weekday (`0` = Sunday). |
//! | [`Exercise`] | A movement with an ordered, never-empty list of sets and a history of past performances. |
//! | [`WorkoutSet`] | One unit of work: `weight` × `reps`, plus a completion flag. |
//! | [`HistoryEntry`] | A dated snapshot of an exercise's sets. |
//! | [`ExerciseName`] | An entry of the exercise-name library. |
//!
//! ## Edit rules
//!
//! Every mutation of an exercise goes through [`WorkoutDay::edit_exercise`], which bumps
//! both the exercise's and the day's `updated_at`. Those timestamps drive the
//! last-write-wins merge in [`crate::merge`]. History is kept sorted by date, most recent
//! first, and an exercise can never lose its last set.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Longest accepted workout or exercise name.
pub const MAX_NAME_LEN: usize = 100;

/// Reps given to the very first set of a new exercise.
pub const DEFAULT_REPS: u32 = 10;

/// One set of an exercise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub weight: f64,
    pub reps: u32,
    #[serde(default)]
    pub completed: bool,
}

impl Default for WorkoutSet {
    fn default() -> Self {
        Self {
            weight: 0.0,
            reps: DEFAULT_REPS,
            completed: false,
        }
    }
}

impl WorkoutSet {
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

/// A dated snapshot of an exercise's sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub sets: Vec<WorkoutSet>,
}

impl HistoryEntry {
    /// Sum of weight × reps over the completed sets of the snapshot.
    pub fn total_volume(&self) -> f64 {
        self.sets.iter().filter(|s| s.completed).map(WorkoutSet::volume).sum()
    }
}

/// A movement inside a workout day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: Vec<WorkoutSet>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Milliseconds since the Unix epoch of the last edit.
    #[serde(default)]
    pub updated_at: i64,
}

impl Exercise {
    /// Create an exercise with a single default set.
    pub fn new(name: &str, now: i64) -> Result<Self, StoreError> {
        Ok(Self {
            id: new_id(),
            name: validate_name(name)?,
            sets: vec![WorkoutSet::default()],
            history: Vec::new(),
            updated_at: now,
        })
    }

    /// Append a set copying the last set's weight and reps.
    pub fn add_set(&mut self) -> &WorkoutSet {
        let next = match self.sets.last() {
            Some(last) => WorkoutSet {
                weight: last.weight,
                reps: last.reps,
                completed: false,
            },
            None => WorkoutSet::default(),
        };
        self.sets.push(next);
        &self.sets[self.sets.len() - 1]
    }

    /// Remove the set at `index`. The last remaining set cannot be removed.
    pub fn remove_set(&mut self, index: usize) -> Result<WorkoutSet, StoreError> {
        if index >= self.sets.len() {
            return Err(StoreError::SetNotFound(index));
        }
        if self.sets.len() == 1 {
            return Err(StoreError::LastSet);
        }
        Ok(self.sets.remove(index))
    }

    pub fn update_set(&mut self, index: usize, weight: f64, reps: u32) -> Result<(), StoreError> {
        let weight = validate_weight(weight)?;
        let set = self.set_mut(index)?;
        set.weight = weight;
        set.reps = reps;
        Ok(())
    }

    pub fn set_completed(&mut self, index: usize, completed: bool) -> Result<(), StoreError> {
        self.set_mut(index)?.completed = completed;
        Ok(())
    }

    /// Flip the completion flag of a set and return its new value.
    pub fn toggle_set(&mut self, index: usize) -> Result<bool, StoreError> {
        let set = self.set_mut(index)?;
        set.completed = !set.completed;
        Ok(set.completed)
    }

    fn set_mut(&mut self, index: usize) -> Result<&mut WorkoutSet, StoreError> {
        self.sets.get_mut(index).ok_or(StoreError::SetNotFound(index))
    }

    /// Snapshot the current sets into history under `date`.
    ///
    /// An existing entry for the same date is replaced. Completion flags on the live
    /// sets are cleared afterwards so the next session starts fresh.
    pub fn record_history(&mut self, date: &str) -> Result<&HistoryEntry, StoreError> {
        let date = validate_date(date)?;
        let sets = self.sets.clone();
        let existing = self.history.iter().position(|h| h.date == date);
        let id = match existing {
            Some(pos) => {
                self.history[pos].sets = sets;
                self.history[pos].id.clone()
            }
            None => {
                let entry = HistoryEntry {
                    id: new_id(),
                    date,
                    sets,
                };
                let id = entry.id.clone();
                self.history.push(entry);
                id
            }
        };
        self.sort_history();
        for set in &mut self.sets {
            set.completed = false;
        }
        self.history
            .iter()
            .find(|h| h.id == id)
            .ok_or(StoreError::HistoryNotFound(id))
    }

    /// Remove exactly the history entry with `entry_id`.
    pub fn delete_history(&mut self, entry_id: &str) -> Result<HistoryEntry, StoreError> {
        let pos = self
            .history
            .iter()
            .position(|h| h.id == entry_id)
            .ok_or_else(|| StoreError::HistoryNotFound(entry_id.to_string()))?;
        Ok(self.history.remove(pos))
    }

    /// Most recent history entry, if any.
    pub fn last_performance(&self) -> Option<&HistoryEntry> {
        self.history.first()
    }

    pub fn completed_count(&self) -> usize {
        self.sets.iter().filter(|s| s.completed).count()
    }

    pub fn total_volume(&self) -> f64 {
        self.sets.iter().filter(|s| s.completed).map(WorkoutSet::volume).sum()
    }

    /// Most recent first. Dates are ISO formatted so string order is date order.
    fn sort_history(&mut self) {
        self.history.sort_by(|a, b| b.date.cmp(&a.date));
    }

    /// Restore invariants on data that came from outside (older clients, hand edits).
    pub fn normalize(&mut self) {
        if self.sets.is_empty() {
            self.sets.push(WorkoutSet::default());
        }
        self.sort_history();
    }
}

/// A named collection of exercises scheduled for a weekday.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub id: String,
    pub name: String,
    /// 0 = Sunday .. 6 = Saturday
    pub day_index: u8,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub updated_at: i64,
}

impl WorkoutDay {
    pub fn new(name: &str, day_index: u8, now: i64) -> Result<Self, StoreError> {
        Ok(Self {
            id: new_id(),
            name: validate_name(name)?,
            day_index: validate_day_index(day_index)?,
            exercises: Vec::new(),
            updated_at: now,
        })
    }

    pub fn rename(&mut self, name: &str, now: i64) -> Result<(), StoreError> {
        self.name = validate_name(name)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_day_index(&mut self, day_index: u8, now: i64) -> Result<(), StoreError> {
        self.day_index = validate_day_index(day_index)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn add_exercise(&mut self, name: &str, now: i64) -> Result<&Exercise, StoreError> {
        let exercise = Exercise::new(name, now)?;
        self.exercises.push(exercise);
        self.updated_at = now;
        Ok(&self.exercises[self.exercises.len() - 1])
    }

    pub fn remove_exercise(&mut self, id: &str, now: i64) -> Result<Exercise, StoreError> {
        let pos = self
            .exercises
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::ExerciseNotFound(id.to_string()))?;
        self.updated_at = now;
        Ok(self.exercises.remove(pos))
    }

    /// Apply `edit` to one exercise and stamp both it and the day with `now`.
    ///
    /// Timestamps are only touched when `edit` succeeds.
    pub fn edit_exercise<T>(
        &mut self,
        id: &str,
        now: i64,
        edit: impl FnOnce(&mut Exercise) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let exercise = self
            .exercises
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::ExerciseNotFound(id.to_string()))?;
        let out = edit(exercise)?;
        exercise.updated_at = now;
        self.updated_at = now;
        Ok(out)
    }

    pub fn normalize(&mut self) {
        for exercise in &mut self.exercises {
            exercise.normalize();
        }
    }

    /// Check and normalise a day received from another device.
    pub fn validate(&mut self) -> Result<(), StoreError> {
        self.name = validate_name(&self.name)?;
        validate_day_index(self.day_index)?;
        for exercise in &mut self.exercises {
            exercise.name = validate_name(&exercise.name)?;
            let snapshots = exercise.history.iter().flat_map(|h| h.sets.iter());
            for set in exercise.sets.iter().chain(snapshots) {
                validate_weight(set.weight)?;
            }
        }
        self.normalize();
        Ok(())
    }
}

/// An entry in the exercise-name library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseName {
    pub id: String,
    pub name: String,
    /// `false` for the built-in names shared by every user.
    #[serde(default)]
    pub custom: bool,
}

/// Names every user starts with.
pub const BUILTIN_EXERCISES: &[&str] = &[
    "Bench Press",
    "Squat",
    "Deadlift",
    "Overhead Press",
    "Barbell Row",
    "Pull Up",
    "Dip",
    "Lunge",
    "Romanian Deadlift",
    "Bicep Curl",
    "Tricep Extension",
    "Lateral Raise",
    "Leg Press",
    "Calf Raise",
    "Plank",
];

/// Human readable weekday for a day index.
pub fn day_name(day_index: u8) -> &'static str {
    match day_index {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unscheduled",
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trim and check a workout or exercise name.
pub fn validate_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(StoreError::NameTooLong { max: MAX_NAME_LEN });
    }
    Ok(name.to_string())
}

/// Negative weights clamp to zero. NaN and infinities cannot be stored as JSON numbers.
pub fn validate_weight(weight: f64) -> Result<f64, StoreError> {
    if !weight.is_finite() {
        return Err(StoreError::InvalidWeight);
    }
    Ok(weight.max(0.0))
}

fn validate_day_index(day_index: u8) -> Result<u8, StoreError> {
    if day_index > 6 {
        return Err(StoreError::InvalidDayIndex(day_index));
    }
    Ok(day_index)
}

fn validate_date(date: &str) -> Result<String, StoreError> {
    let date = date.trim();
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| StoreError::InvalidDate(date.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench() -> Exercise {
        Exercise::new("Bench Press", 1).unwrap()
    }

    #[test]
    fn test_new_exercise_has_one_default_set() {
        let ex = bench();
        assert_eq!(ex.sets, vec![WorkoutSet::default()]);
        assert!(ex.history.is_empty());
    }

    #[test]
    fn test_add_set_copies_last_set() {
        let mut ex = bench();
        ex.update_set(0, 60.0, 8).unwrap();
        ex.set_completed(0, true).unwrap();

        let before = ex.sets.len();
        let added = ex.add_set().clone();

        assert_eq!(ex.sets.len(), before + 1);
        assert_eq!(added.weight, 60.0);
        assert_eq!(added.reps, 8);
        assert!(!added.completed);
    }

    #[test]
    fn test_remove_last_set_is_refused() {
        let mut ex = bench();
        assert_eq!(ex.remove_set(0), Err(StoreError::LastSet));
        ex.add_set();
        assert!(ex.remove_set(1).is_ok());
        assert_eq!(ex.sets.len(), 1);
        assert_eq!(ex.remove_set(5), Err(StoreError::SetNotFound(5)));
    }

    #[test]
    fn test_toggle_set() {
        let mut ex = bench();
        assert_eq!(ex.toggle_set(0), Ok(true));
        assert_eq!(ex.toggle_set(0), Ok(false));
        assert_eq!(ex.toggle_set(3), Err(StoreError::SetNotFound(3)));
    }

    #[test]
    fn test_record_history_sorted_by_recency() {
        let mut ex = bench();
        ex.record_history("2024-03-01").unwrap();
        ex.record_history("2024-03-08").unwrap();
        ex.record_history("2024-02-20").unwrap();

        let dates: Vec<&str> = ex.history.iter().map(|h| h.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-08", "2024-03-01", "2024-02-20"]);
        assert_eq!(ex.last_performance().unwrap().date, "2024-03-08");
    }

    #[test]
    fn test_record_history_same_date_replaces() {
        let mut ex = bench();
        ex.update_set(0, 50.0, 5).unwrap();
        ex.record_history("2024-03-01").unwrap();
        ex.update_set(0, 55.0, 5).unwrap();
        ex.set_completed(0, true).unwrap();
        ex.record_history("2024-03-01").unwrap();

        assert_eq!(ex.history.len(), 1);
        assert_eq!(ex.history[0].sets[0].weight, 55.0);
        assert!(ex.history[0].sets[0].completed);
        // Live sets are reset for the next session
        assert!(!ex.sets[0].completed);
    }

    #[test]
    fn test_record_history_rejects_bad_date() {
        let mut ex = bench();
        assert_eq!(
            ex.record_history("yesterday").unwrap_err(),
            StoreError::InvalidDate("yesterday".to_string())
        );
        assert!(ex.history.is_empty());
    }

    #[test]
    fn test_delete_history_removes_exactly_one() {
        let mut ex = bench();
        ex.record_history("2024-01-01").unwrap();
        let target = ex.record_history("2024-01-02").unwrap().id.clone();
        ex.record_history("2024-01-03").unwrap();

        let removed = ex.delete_history(&target).unwrap();
        assert_eq!(removed.date, "2024-01-02");
        assert_eq!(ex.history.len(), 2);
        assert!(ex.history.iter().all(|h| h.id != target));
        assert!(ex.delete_history(&target).is_err());
    }

    #[test]
    fn test_edit_exercise_bumps_timestamps() {
        let mut day = WorkoutDay::new("Push", 1, 10).unwrap();
        let id = day.add_exercise("Bench Press", 10).unwrap().id.clone();

        day.edit_exercise(&id, 20, |ex| {
            ex.add_set();
            Ok(())
        })
        .unwrap();
        assert_eq!(day.updated_at, 20);
        assert_eq!(day.exercise(&id).unwrap().updated_at, 20);

        // A failing edit leaves the stamps alone
        let err = day.edit_exercise(&id, 30, |ex| ex.remove_set(9).map(|_| ()));
        assert!(err.is_err());
        assert_eq!(day.updated_at, 20);
    }

    #[test]
    fn test_non_finite_weight_is_refused() {
        let mut day = WorkoutDay::new("Push", 1, 10).unwrap();
        let ex = day.add_exercise("Bench Press", 10).unwrap().id.clone();

        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(
                day.edit_exercise(&ex, 20, |e| e.update_set(0, bad, 5)),
                Err(StoreError::InvalidWeight)
            );
        }
        assert_eq!(day.updated_at, 10);
        assert_eq!(day.exercise(&ex).unwrap().sets[0], WorkoutSet::default());

        day.edit_exercise(&ex, 20, |e| e.update_set(0, -5.0, 5)).unwrap();
        assert_eq!(day.exercise(&ex).unwrap().sets[0].weight, 0.0);

        // Days arriving from another device are checked too, history included
        let mut incoming = day.clone();
        incoming.exercises[0].history.push(HistoryEntry {
            id: new_id(),
            date: "2024-01-01".into(),
            sets: vec![WorkoutSet {
                weight: f64::INFINITY,
                reps: 5,
                completed: true,
            }],
        });
        assert_eq!(incoming.validate(), Err(StoreError::InvalidWeight));
        assert!(day.validate().is_ok());
    }

    #[test]
    fn test_workout_validation() {
        assert_eq!(WorkoutDay::new("  ", 1, 0).unwrap_err(), StoreError::EmptyName);
        assert_eq!(
            WorkoutDay::new("Legs", 7, 0).unwrap_err(),
            StoreError::InvalidDayIndex(7)
        );
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            WorkoutDay::new(&long, 1, 0),
            Err(StoreError::NameTooLong { .. })
        ));
        assert_eq!(WorkoutDay::new(" Legs ", 2, 0).unwrap().name, "Legs");
    }

    #[test]
    fn test_normalize_restores_invariants() {
        let mut ex: Exercise = serde_json::from_str(
            r#"{"id":"a","name":"Squat","sets":[],"history":[
                {"id":"h1","date":"2024-01-01","sets":[]},
                {"id":"h2","date":"2024-05-01","sets":[]}]}"#,
        )
        .unwrap();
        ex.normalize();
        assert_eq!(ex.sets.len(), 1);
        assert_eq!(ex.history[0].id, "h2");
    }

    #[test]
    fn test_total_volume_counts_completed_sets() {
        let mut ex = bench();
        ex.update_set(0, 100.0, 5).unwrap();
        ex.add_set();
        ex.set_completed(0, true).unwrap();
        assert_eq!(ex.completed_count(), 1);
        assert_eq!(ex.total_volume(), 500.0);
    }
}
