use dioxus::prelude::*;
use store::clock::today;

use crate::icons::{FaChevronLeft, FaClockRotateLeft, FaFlagCheckered, FaPlus};
use crate::tracker::use_tracker;
use crate::{Icon, SetRow, VIEWS_CSS};

use super::EmptyState;

/// Live logging of one exercise.
///
/// Completing a set starts the rest timer. "Finish" snapshots the sets into today's
/// history entry and clears the completion marks for the next session.
#[component]
pub fn ExerciseView(
    workout_id: String,
    exercise_id: String,
    on_open_history: EventHandler<()>,
    on_back: EventHandler<()>,
) -> Element {
    let tracker = use_tracker();
    let mut ids = use_signal(|| (workout_id.clone(), exercise_id.clone()));
    if *ids.peek() != (workout_id.clone(), exercise_id.clone()) {
        ids.set((workout_id.clone(), exercise_id.clone()));
    }
    let mut error = use_signal(|| Option::<String>::None);
    let mut finished_msg = use_signal(|| Option::<String>::None);

    let workouts = (tracker.workouts)();
    let unit = (tracker.config)().units.weight.label().to_string();
    let Some((day_name, exercise)) = workouts
        .iter()
        .find(|d| d.id == workout_id)
        .and_then(|d| d.exercise(&exercise_id).map(|e| (d.name.clone(), e.clone())))
    else {
        return rsx! {
            document::Link { rel: "stylesheet", href: VIEWS_CSS }
            div {
                class: "view-page",
                EmptyState { title: "Exercise not found", hint: "It may have been removed on another device." }
                button { class: "btn", onclick: move |_| on_back.call(()), "Back" }
            }
        };
    };

    let handle_add_set = move |_: MouseEvent| async move {
        let (w, e) = ids();
        if let Err(err) = tracker
            .edit_exercise(&w, &e, |exercise| {
                exercise.add_set();
                Ok(())
            })
            .await
        {
            error.set(Some(err.to_string()));
        }
    };

    let handle_finish = move |_: MouseEvent| async move {
        let (w, e) = ids();
        let date = today();
        match tracker
            .edit_exercise(&w, &e, |exercise| {
                exercise.record_history(&date).map(|entry| entry.total_volume())
            })
            .await
        {
            Ok(volume) => {
                error.set(None);
                finished_msg.set(Some(format!("Saved to history for {date}, volume {volume}")));
            }
            Err(err) => error.set(Some(err.to_string())),
        }
    };

    let total = exercise.total_volume();
    let can_remove = exercise.sets.len() > 1;

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",
            button {
                class: "btn btn--ghost back-link",
                onclick: move |_| on_back.call(()),
                Icon { icon: FaChevronLeft, width: 12, height: 12 }
                "{day_name}"
            }
            div {
                class: "view-header",
                h1 { class: "view-title", "{exercise.name}" }
                button {
                    class: "btn btn--ghost",
                    onclick: move |_| on_open_history.call(()),
                    Icon { icon: FaClockRotateLeft, width: 14, height: 14 }
                    "History ({exercise.history.len()})"
                }
            }

            if let Some(last) = exercise.last_performance() {
                p {
                    class: "view-hint",
                    "Last time ({last.date}): "
                    for (i, set) in last.sets.iter().enumerate() {
                        span { key: "{i}", class: "chip", "{set.weight} {unit} × {set.reps}" }
                    }
                }
            }

            div {
                class: "set-list",
                for (index, set) in exercise.sets.iter().cloned().enumerate() {
                    SetRow {
                        key: "{index}",
                        index,
                        set,
                        unit: unit.clone(),
                        can_remove,
                        on_change: move |(weight, reps): (f64, u32)| {
                            spawn(async move {
                                let (w, e) = ids();
                                if let Err(err) = tracker
                                    .edit_exercise(&w, &e, |exercise| exercise.update_set(index, weight, reps))
                                    .await
                                {
                                    error.set(Some(err.to_string()));
                                }
                            });
                        },
                        on_toggle: move |_| {
                            spawn(async move {
                                let (w, e) = ids();
                                let result = tracker
                                    .edit_exercise(&w, &e, |exercise| {
                                        let done = exercise.toggle_set(index)?;
                                        Ok((done, exercise.clone()))
                                    })
                                    .await;
                                match result {
                                    Ok((true, exercise)) => tracker.start_rest(&exercise).await,
                                    Ok((false, _)) => {}
                                    Err(err) => error.set(Some(err.to_string())),
                                }
                            });
                        },
                        on_remove: move |_| {
                            spawn(async move {
                                let (w, e) = ids();
                                if let Err(err) = tracker
                                    .edit_exercise(&w, &e, |exercise| exercise.remove_set(index).map(|_| ()))
                                    .await
                                {
                                    error.set(Some(err.to_string()));
                                }
                            });
                        },
                    }
                }
            }

            div {
                class: "view-actions",
                button {
                    class: "btn",
                    onclick: handle_add_set,
                    Icon { icon: FaPlus, width: 12, height: 12 }
                    "Add set"
                }
                button {
                    class: "btn btn--primary",
                    onclick: handle_finish,
                    Icon { icon: FaFlagCheckered, width: 12, height: 12 }
                    "Finish"
                }
            }
            p { class: "view-hint", "Completed volume: {total} {unit}" }
            if let Some(msg) = finished_msg() {
                p { class: "form-success", "{msg}" }
            }
            if let Some(err) = error() {
                p { class: "form-error", "{err}" }
            }
        }
    }
}
