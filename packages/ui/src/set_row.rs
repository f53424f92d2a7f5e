use dioxus::prelude::*;
use store::WorkoutSet;

use crate::icons::{FaCheck, FaTrashCan};
use crate::Icon;

/// One editable set: weight, reps, completion and removal.
///
/// Inputs commit on change, not on every keystroke, so each edit becomes one queued
/// change.
#[component]
pub fn SetRow(
    index: usize,
    set: WorkoutSet,
    unit: String,
    /// Whether the remove button is enabled (an exercise keeps at least one set).
    can_remove: bool,
    on_change: EventHandler<(f64, u32)>,
    on_toggle: EventHandler<()>,
    on_remove: EventHandler<()>,
) -> Element {
    let number = index + 1;
    let row_class = if set.completed {
        "set-row set-row--done"
    } else {
        "set-row"
    };
    let weight = set.weight;
    let reps = set.reps;

    rsx! {
        div {
            class: "{row_class}",
            span { class: "set-row__index", "{number}" }
            label {
                class: "set-row__field",
                input {
                    r#type: "number",
                    inputmode: "decimal",
                    min: "0",
                    step: "0.5",
                    value: "{weight}",
                    onchange: move |evt: FormEvent| {
                        if let Ok(w) = evt.value().trim().parse::<f64>() {
                            on_change.call((w, reps));
                        }
                    },
                }
                span { "{unit}" }
            }
            label {
                class: "set-row__field",
                input {
                    r#type: "number",
                    inputmode: "numeric",
                    min: "0",
                    value: "{reps}",
                    onchange: move |evt: FormEvent| {
                        if let Ok(r) = evt.value().trim().parse::<u32>() {
                            on_change.call((weight, r));
                        }
                    },
                }
                span { "reps" }
            }
            button {
                class: "btn set-row__check",
                title: if set.completed { "Mark not done" } else { "Mark done" },
                onclick: move |_| on_toggle.call(()),
                Icon { icon: FaCheck, width: 14, height: 14 }
            }
            button {
                class: "btn btn--ghost",
                title: "Remove set",
                disabled: !can_remove,
                onclick: move |_| on_remove.call(()),
                Icon { icon: FaTrashCan, width: 12, height: 12 }
            }
        }
    }
}
