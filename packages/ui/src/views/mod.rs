mod confirm_dialog;
pub use confirm_dialog::ConfirmDialog;

mod empty_state;
pub use empty_state::EmptyState;

mod workouts;
pub use workouts::WorkoutsView;

mod workout_day;
pub use workout_day::WorkoutDayView;

mod exercise;
pub use exercise::ExerciseView;

mod history;
pub use history::HistoryView;

mod settings;
pub use settings::SettingsView;
