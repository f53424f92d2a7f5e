use dioxus::prelude::*;

/// Placeholder for lists with nothing in them yet.
#[component]
pub fn EmptyState(title: String, hint: String) -> Element {
    rsx! {
        div {
            class: "empty-state",
            h2 { "{title}" }
            p { "{hint}" }
        }
    }
}
