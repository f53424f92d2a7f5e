use dioxus::prelude::*;

/// A full-screen overlay asking to confirm a destructive action.
/// Clicking outside the card cancels.
#[component]
pub fn ConfirmDialog(
    message: String,
    #[props(default = "Delete".to_string())] confirm_label: String,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            class: "modal",
            onclick: move |_| on_cancel.call(()),
            div {
                class: "modal__card",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                p { "{message}" }
                div {
                    class: "modal__actions",
                    button { class: "btn btn--ghost", onclick: move |_| on_cancel.call(()), "Cancel" }
                    button { class: "btn btn--danger", onclick: move |_| on_confirm.call(()), "{confirm_label}" }
                }
            }
        }
    }
}
