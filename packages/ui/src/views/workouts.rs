use dioxus::prelude::*;
use store::models::day_name;

use crate::icons::{FaPlus, FaTrashCan};
use crate::tracker::use_tracker;
use crate::{Icon, VIEWS_CSS};

use super::{ConfirmDialog, EmptyState};

/// List of workout days grouped by weekday, with a form to add a day.
#[component]
pub fn WorkoutsView(on_open_workout: EventHandler<String>) -> Element {
    let tracker = use_tracker();
    let mut new_name = use_signal(String::new);
    let mut new_day = use_signal(|| 1u8);
    let mut error = use_signal(|| Option::<String>::None);
    let mut confirm_delete = use_signal(|| Option::<(String, String)>::None);

    let handle_create = move |evt: FormEvent| async move {
        evt.prevent_default();
        match tracker.create_workout(&new_name(), new_day()).await {
            Ok(day) => {
                new_name.set(String::new());
                error.set(None);
                on_open_workout.call(day.id);
            }
            Err(e) => error.set(Some(e.to_string())),
        }
    };

    let workouts = (tracker.workouts)();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",
            h1 { class: "view-title", "Workouts" }

            if workouts.is_empty() {
                EmptyState {
                    title: "No workouts yet",
                    hint: "Add a workout day below to start planning your week.",
                }
            }

            for index in 0u8..7 {
                if workouts.iter().any(|d| d.day_index == index) {
                    section {
                        key: "{index}",
                        class: "day-group",
                        h2 { class: "day-group__title", "{day_name(index)}" }
                        for day in workouts.iter().filter(|d| d.day_index == index).cloned() {
                            div {
                                key: "{day.id}",
                                class: "card card--link",
                                onclick: {
                                    let id = day.id.clone();
                                    move |_| on_open_workout.call(id.clone())
                                },
                                div {
                                    class: "card__main",
                                    span { class: "card__title", "{day.name}" }
                                    span { class: "card__meta", "{day.exercises.len()} exercise(s)" }
                                }
                                button {
                                    class: "btn btn--ghost",
                                    title: "Delete workout",
                                    onclick: {
                                        let target = (day.id.clone(), day.name.clone());
                                        move |evt: Event<MouseData>| {
                                            evt.stop_propagation();
                                            confirm_delete.set(Some(target.clone()));
                                        }
                                    },
                                    Icon { icon: FaTrashCan, width: 12, height: 12 }
                                }
                            }
                        }
                    }
                }
            }

            form {
                class: "inline-form",
                onsubmit: handle_create,
                input {
                    r#type: "text",
                    placeholder: "Workout name, e.g. Push day",
                    maxlength: "100",
                    value: new_name(),
                    oninput: move |evt: FormEvent| new_name.set(evt.value()),
                }
                select {
                    value: "{new_day}",
                    onchange: move |evt: FormEvent| {
                        if let Ok(i) = evt.value().parse::<u8>() {
                            new_day.set(i);
                        }
                    },
                    for index in 0u8..7 {
                        option { key: "{index}", value: "{index}", "{day_name(index)}" }
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
        }

        if let Some((id, name)) = confirm_delete() {
            ConfirmDialog {
                message: format!("Delete \"{name}\" with all its exercises and history?"),
                on_cancel: move |_| confirm_delete.set(None),
                on_confirm: move |_| {
                    let id = id.clone();
                    confirm_delete.set(None);
                    spawn(async move { tracker.delete_workout(&id).await });
                },
            }
        }
    }
}
