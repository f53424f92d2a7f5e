use dioxus::prelude::*;
use store::{ExerciseName, WeightUnit};

use crate::icons::{FaPlus, FaRotate, FaTrashCan};
use crate::push::{disable_push, enable_push};
use crate::tracker::use_tracker;
use crate::{use_auth, Icon, LogoutButton, VIEWS_CSS};

/// Preferences, sync status, push notifications and the custom exercise library.
#[component]
pub fn SettingsView() -> Element {
    let tracker = use_tracker();
    let auth = use_auth();

    let mut rest_secs = use_signal(|| 90u32);
    let mut unit = use_signal(WeightUnit::default);
    let mut auto_sync_secs = use_signal(|| 30u32);
    let mut save_status = use_signal(|| Option::<&str>::None);

    let mut push_status = use_signal(|| Option::<String>::None);
    let mut push_busy = use_signal(|| false);

    let mut custom_names = use_signal(Vec::<ExerciseName>::new);
    let mut new_name = use_signal(String::new);
    let mut library_error = use_signal(|| Option::<String>::None);

    // Seed the form from the stored preferences
    use_effect(move || {
        let config = (tracker.config)();
        rest_secs.set(config.rest.default_secs);
        unit.set(config.units.weight);
        auto_sync_secs.set(config.sync.auto_sync_interval_secs);
    });

    let _library = use_resource(move || async move {
        let names = tracker.library().await;
        custom_names.set(names.into_iter().filter(|n| n.custom).collect());
    });

    let handle_save = move |evt: FormEvent| async move {
        evt.prevent_default();
        let mut config = tracker
            .config
            .peek()
            .clone()
            .with_rest_secs(rest_secs())
            .with_unit(unit());
        config.sync.auto_sync_interval_secs = auto_sync_secs();
        tracker.save_config(config).await;
        save_status.set(Some("Saved"));
    };

    let handle_push_toggle = move |_| async move {
        let enabled = tracker.config.peek().notifications.enabled;
        push_busy.set(true);
        push_status.set(None);
        let result = if enabled {
            disable_push().await
        } else {
            enable_push().await
        };
        match result {
            Ok(()) => {
                let mut config = tracker.config.peek().clone();
                config.notifications.enabled = !enabled;
                tracker.save_config(config).await;
                push_status.set(Some(if enabled {
                    "Notifications off".to_string()
                } else {
                    "Notifications on".to_string()
                }));
            }
            Err(e) => {
                tracing::warn!("Push toggle failed: {}", e);
                push_status.set(Some(e));
            }
        }
        push_busy.set(false);
    };

    let handle_sync = move |_| async move {
        tracker.sync_now().await;
    };

    let handle_add_name = move |evt: FormEvent| async move {
        evt.prevent_default();
        match api::add_exercise_name(new_name()).await {
            Ok(added) => {
                new_name.set(String::new());
                library_error.set(None);
                if !custom_names.peek().iter().any(|n| n.id == added.id) {
                    custom_names.write().push(added);
                }
            }
            Err(e) => library_error.set(Some(e.to_string())),
        }
    };

    let config = (tracker.config)();
    let status = (tracker.status)();
    let email = auth().user.map(|u| u.email).unwrap_or_default();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",
            h1 { class: "view-title", "Settings" }

            section {
                class: "settings-section",
                h2 { "Training" }
                form {
                    class: "settings-form",
                    onsubmit: handle_save,
                    label {
                        "Rest between sets (seconds)"
                        input {
                            r#type: "number",
                            min: "5",
                            max: "3600",
                            value: "{rest_secs}",
                            oninput: move |evt: FormEvent| {
                                if let Ok(v) = evt.value().parse::<u32>() {
                                    rest_secs.set(v);
                                }
                            },
                        }
                    }
                    label {
                        "Weight unit"
                        select {
                            value: unit().label(),
                            onchange: move |evt: FormEvent| {
                                unit.set(if evt.value() == "lb" { WeightUnit::Lb } else { WeightUnit::Kg });
                            },
                            option { value: "kg", "kg" }
                            option { value: "lb", "lb" }
                        }
                    }
                    label {
                        "Retry sync every (seconds, 0 = off)"
                        input {
                            r#type: "number",
                            min: "0",
                            value: "{auto_sync_secs}",
                            oninput: move |evt: FormEvent| {
                                if let Ok(v) = evt.value().parse::<u32>() {
                                    auto_sync_secs.set(v);
                                }
                            },
                        }
                    }
                    button { class: "btn btn--primary", r#type: "submit", "Save" }
                    if let Some(msg) = save_status() {
                        span { class: "form-success", "{msg}" }
                    }
                }
            }

            section {
                class: "settings-section",
                h2 { "Notifications" }
                p {
                    class: "view-hint",
                    "Get a notification when the rest timer ends, even with the app in the background."
                }
                button {
                    class: "btn",
                    disabled: push_busy(),
                    onclick: handle_push_toggle,
                    if config.notifications.enabled { "Turn off" } else { "Turn on" }
                }
                if let Some(msg) = push_status() {
                    p { class: "view-hint", "{msg}" }
                }
            }

            section {
                class: "settings-section",
                h2 { "Sync" }
                p {
                    class: "view-hint",
                    if status.pending == 0 {
                        "Everything is saved on the server."
                    } else {
                        "{status.pending} workout day(s) waiting to upload."
                    }
                }
                if let Some(err) = status.last_error.clone() {
                    p { class: "form-error", "Last attempt failed: {err}" }
                }
                button {
                    class: "btn",
                    disabled: status.syncing,
                    onclick: handle_sync,
                    Icon { icon: FaRotate, width: 12, height: 12 }
                    if status.syncing { "Syncing..." } else { "Sync now" }
                }
            }

            section {
                class: "settings-section",
                h2 { "Exercise library" }
                for name in custom_names() {
                    div {
                        key: "{name.id}",
                        class: "library-row",
                        span { "{name.name}" }
                        button {
                            class: "btn btn--ghost",
                            title: "Delete from library",
                            onclick: {
                                let id = name.id.clone();
                                move |_| {
                                    let id = id.clone();
                                    async move {
                                        match api::delete_exercise_name(id.clone()).await {
                                            Ok(()) => custom_names.write().retain(|n| n.id != id),
                                            Err(e) => library_error.set(Some(e.to_string())),
                                        }
                                    }
                                }
                            },
                            Icon { icon: FaTrashCan, width: 12, height: 12 }
                        }
                    }
                }
                form {
                    class: "inline-form",
                    onsubmit: handle_add_name,
                    input {
                        r#type: "text",
                        placeholder: "Custom exercise",
                        maxlength: "100",
                        value: new_name(),
                        oninput: move |evt: FormEvent| new_name.set(evt.value()),
                    }
                    button {
                        class: "btn",
                        r#type: "submit",
                        Icon { icon: FaPlus, width: 12, height: 12 }
                        "Add"
                    }
                }
                if let Some(err) = library_error() {
                    p { class: "form-error", "{err}" }
                }
            }

            section {
                class: "settings-section",
                h2 { "Account" }
                p { class: "view-hint", "Signed in as {email}" }
                LogoutButton { class: "btn btn--danger" }
            }
        }
    }
}
