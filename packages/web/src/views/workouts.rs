use dioxus::prelude::*;

use ui::views::{WorkoutDayView, WorkoutsView};

use crate::Route;

#[component]
pub fn Workouts() -> Element {
    let nav = use_navigator();
    rsx! {
        WorkoutsView {
            on_open_workout: move |workout_id: String| {
                nav.push(Route::WorkoutDetail { workout_id });
            },
        }
    }
}

#[component]
pub fn WorkoutDetail(workout_id: String) -> Element {
    let nav = use_navigator();
    let parent = workout_id.clone();
    rsx! {
        WorkoutDayView {
            workout_id,
            on_open_exercise: move |exercise_id: String| {
                nav.push(Route::ExerciseDetail {
                    workout_id: parent.clone(),
                    exercise_id,
                });
            },
            on_back: move |_| {
                nav.push(Route::Workouts {});
            },
        }
    }
}
