use dioxus::prelude::*;

use crate::icons::{FaChevronLeft, FaTrashCan};
use crate::tracker::use_tracker;
use crate::{Icon, VIEWS_CSS};

use super::{ConfirmDialog, EmptyState};

/// Past sessions of one exercise, most recent first.
///
/// Reads the cached day, so history is available offline; deleting an entry is a
/// regular queued edit.
#[component]
pub fn HistoryView(workout_id: String, exercise_id: String, on_back: EventHandler<()>) -> Element {
    let tracker = use_tracker();
    let mut confirm_delete = use_signal(|| Option::<(String, String)>::None);
    let mut error = use_signal(|| Option::<String>::None);

    let workouts = (tracker.workouts)();
    let unit = (tracker.config)().units.weight.label();
    let Some(exercise) = workouts
        .iter()
        .find(|d| d.id == workout_id)
        .and_then(|d| d.exercise(&exercise_id))
        .cloned()
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

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",
            button {
                class: "btn btn--ghost back-link",
                onclick: move |_| on_back.call(()),
                Icon { icon: FaChevronLeft, width: 12, height: 12 }
                "{exercise.name}"
            }
            h1 { class: "view-title", "History" }

            if exercise.history.is_empty() {
                EmptyState {
                    title: "No history yet",
                    hint: "Press Finish after a session to record it here.",
                }
            }

            for entry in exercise.history.iter().cloned() {
                div {
                    key: "{entry.id}",
                    class: "card",
                    div {
                        class: "card__main",
                        span { class: "card__title", "{entry.date}" }
                        div {
                            class: "history-sets",
                            for (i, set) in entry.sets.iter().enumerate() {
                                span {
                                    key: "{i}",
                                    class: if set.completed { "chip chip--done" } else { "chip" },
                                    "{set.weight} {unit} × {set.reps}"
                                }
                            }
                        }
                        span { class: "card__meta", "Volume {entry.total_volume()} {unit}" }
                    }
                    button {
                        class: "btn btn--ghost",
                        title: "Delete entry",
                        onclick: {
                            let target = (entry.id.clone(), entry.date.clone());
                            move |_| confirm_delete.set(Some(target.clone()))
                        },
                        Icon { icon: FaTrashCan, width: 12, height: 12 }
                    }
                }
            }
            if let Some(err) = error() {
                p { class: "form-error", "{err}" }
            }
        }

        if let Some((entry_id, date)) = confirm_delete() {
            ConfirmDialog {
                message: format!("Delete the session of {date}?"),
                on_cancel: move |_| confirm_delete.set(None),
                on_confirm: {
                    let (workout_id, exercise_id) = (workout_id.clone(), exercise_id.clone());
                    move |_| {
                        let (w, e, entry_id) = (workout_id.clone(), exercise_id.clone(), entry_id.clone());
                        confirm_delete.set(None);
                        spawn(async move {
                            if let Err(err) = tracker
                                .edit_exercise(&w, &e, |exercise| exercise.delete_history(&entry_id).map(|_| ()))
                                .await
                            {
                                error.set(Some(err.to_string()));
                            }
                        });
                    }
                },
            }
        }
    }
}
