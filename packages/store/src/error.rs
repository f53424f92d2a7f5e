use thiserror::Error;

/// Validation failures raised by the domain edit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("Day index must be between 0 and 6, got {0}")]
    InvalidDayIndex(u8),
    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Weight must be a finite number")]
    InvalidWeight,
    #[error("An exercise must keep at least one set")]
    LastSet,
    #[error("Set {0} does not exist")]
    SetNotFound(usize),
    #[error("Exercise {0} not found")]
    ExerciseNotFound(String),
    #[error("History entry {0} not found")]
    HistoryNotFound(String),
    #[error("Workout {0} not found")]
    WorkoutNotFound(String),
}
