use dioxus::prelude::*;
use store::models::day_name;
use store::timer::format_countdown;

use crate::icons::{FaChevronLeft, FaPlus, FaTrashCan};
use crate::tracker::use_tracker;
use crate::{Icon, VIEWS_CSS};

use super::{ConfirmDialog, EmptyState};

/// One workout day: rename, reschedule, add and remove exercises.
#[component]
pub fn WorkoutDayView(
    workout_id: String,
    on_open_exercise: EventHandler<String>,
    on_back: EventHandler<()>,
) -> Element {
    let tracker = use_tracker();
    let mut id_signal = use_signal(|| workout_id.clone());
    if *id_signal.peek() != workout_id {
        id_signal.set(workout_id.clone());
    }

    let mut new_exercise = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut confirm_remove = use_signal(|| Option::<(String, String)>::None);
    let library = use_resource(move || async move { tracker.library().await });

    let workouts = (tracker.workouts)();
    let Some(day) = workouts.iter().find(|d| d.id == id_signal()).cloned() else {
        return rsx! {
            document::Link { rel: "stylesheet", href: VIEWS_CSS }
            div {
                class: "view-page",
                EmptyState { title: "Workout not found", hint: "It may have been deleted on another device." }
                button { class: "btn", onclick: move |_| on_back.call(()), "Back to workouts" }
            }
        };
    };

    let handle_rename = move |evt: FormEvent| async move {
        let name = evt.value();
        if let Err(e) = tracker
            .edit_workout(&id_signal(), |day, now| day.rename(&name, now))
            .await
        {
            error.set(Some(e.to_string()));
        }
    };

    let handle_day = move |evt: FormEvent| async move {
        let Ok(index) = evt.value().parse::<u8>() else {
            return;
        };
        if let Err(e) = tracker
            .edit_workout(&id_signal(), |day, now| day.set_day_index(index, now))
            .await
        {
            error.set(Some(e.to_string()));
        }
    };

    let handle_add = move |evt: FormEvent| async move {
        evt.prevent_default();
        let name = new_exercise();
        let known = library
            .read()
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n.name.eq_ignore_ascii_case(name.trim())));
        match tracker
            .edit_workout(&id_signal(), |day, now| {
                day.add_exercise(&name, now).map(|e| e.id.clone())
            })
            .await
        {
            Ok(exercise_id) => {
                new_exercise.set(String::new());
                error.set(None);
                // Remember new names in the library; best effort while offline
                if !known {
                    if let Err(e) = api::add_exercise_name(name.trim().to_string()).await {
                        tracing::warn!("Could not add {} to the library: {}", name, e);
                    }
                }
                on_open_exercise.call(exercise_id);
            }
            Err(e) => error.set(Some(e.to_string())),
        }
    };

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",
            button {
                class: "btn btn--ghost back-link",
                onclick: move |_| on_back.call(()),
                Icon { icon: FaChevronLeft, width: 12, height: 12 }
                "Workouts"
            }

            div {
                class: "view-header",
                input {
                    class: "view-title view-title--editable",
                    r#type: "text",
                    maxlength: "100",
                    value: "{day.name}",
                    onchange: handle_rename,
                }
                select {
                    value: "{day.day_index}",
                    onchange: handle_day,
                    for index in 0u8..7 {
                        option { key: "{index}", value: "{index}", "{day_name(index)}" }
                    }
                }
            }

            if day.exercises.is_empty() {
                EmptyState { title: "No exercises", hint: "Pick an exercise below to add it to this day." }
            }

            for exercise in day.exercises.iter().cloned() {
                div {
                    key: "{exercise.id}",
                    class: "card card--link",
                    onclick: {
                        let id = exercise.id.clone();
                        move |_| on_open_exercise.call(id.clone())
                    },
                    div {
                        class: "card__main",
                        span { class: "card__title", "{exercise.name}" }
                        span {
                            class: "card__meta",
                            "{exercise.completed_count()}/{exercise.sets.len()} sets done"
                        }
                        if let Some(last) = exercise.last_performance() {
                            span { class: "card__meta", "Last: {last.date}, {last.sets.len()} set(s)" }
                        }
                    }
                    button {
                        class: "btn btn--ghost",
                        title: "Remove exercise",
                        onclick: {
                            let target = (exercise.id.clone(), exercise.name.clone());
                            move |evt: Event<MouseData>| {
                                evt.stop_propagation();
                                confirm_remove.set(Some(target.clone()));
                            }
                        },
                        Icon { icon: FaTrashCan, width: 12, height: 12 }
                    }
                }
            }

            form {
                class: "inline-form",
                onsubmit: handle_add,
                input {
                    r#type: "text",
                    list: "exercise-library",
                    placeholder: "Add exercise",
                    maxlength: "100",
                    value: new_exercise(),
                    oninput: move |evt: FormEvent| new_exercise.set(evt.value()),
                }
                datalist {
                    id: "exercise-library",
                    if let Some(names) = library() {
                        for name in names {
                            option { key: "{name.id}", value: "{name.name}" }
                        }
                    }
                }
                button {
                    class: "btn btn--primary",
                    r#type: "submit",
                    Icon { icon: FaPlus, width: 12, height: 12 }
                    "Add"
                }
            }
            if let Some(err) = error() {
                p { class: "form-error", "{err}" }
            }
            p {
                class: "view-hint",
                "Rest between sets: {format_countdown((tracker.config)().rest.default_secs)}"
            }
        }

        if let Some((exercise_id, name)) = confirm_remove() {
            ConfirmDialog {
                message: format!("Remove \"{name}\" and its history from this day?"),
                confirm_label: "Remove",
                on_cancel: move |_| confirm_remove.set(None),
                on_confirm: move |_| {
                    let exercise_id = exercise_id.clone();
                    confirm_remove.set(None);
                    spawn(async move {
                        if let Err(e) = tracker
                            .edit_workout(&id_signal(), |day, now| {
                                day.remove_exercise(&exercise_id, now).map(|_| ())
                            })
                            .await
                        {
                            error.set(Some(e.to_string()));
                        }
                    });
                },
            }
        }
    }
}
