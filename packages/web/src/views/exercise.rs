use dioxus::prelude::*;

use ui::views::{ExerciseView, HistoryView};

use crate::Route;

#[component]
pub fn ExerciseDetail(workout_id: String, exercise_id: String) -> Element {
    let nav = use_navigator();
    let history_route = Route::ExerciseHistory {
        workout_id: workout_id.clone(),
        exercise_id: exercise_id.clone(),
    };
    let back_route = Route::WorkoutDetail {
        workout_id: workout_id.clone(),
    };
    rsx! {
        ExerciseView {
            workout_id,
            exercise_id,
            on_open_history: move |_| {
                nav.push(history_route.clone());
            },
            on_back: move |_| {
                nav.push(back_route.clone());
            },
        }
    }
}

#[component]
pub fn ExerciseHistory(workout_id: String, exercise_id: String) -> Element {
    let nav = use_navigator();
    let back_route = Route::ExerciseDetail {
        workout_id: workout_id.clone(),
        exercise_id: exercise_id.clone(),
    };
    rsx! {
        HistoryView {
            workout_id,
            exercise_id,
            on_back: move |_| {
                nav.push(back_route.clone());
            },
        }
    }
}
