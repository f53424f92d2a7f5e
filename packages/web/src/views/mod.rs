mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod layout;
pub use layout::AppLayout;

mod workouts;
pub use workouts::{WorkoutDetail, Workouts};

mod exercise;
pub use exercise::{ExerciseDetail, ExerciseHistory};

mod settings;
pub use settings::Settings;
