use dioxus::prelude::*;

use crate::icons::FaDumbbell;
use crate::{Icon, OnlineIndicator, VIEWS_CSS};

/// Top bar: brand, platform-provided links as children, sync status.
#[component]
pub fn Navbar(children: Element) -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        nav {
            class: "navbar",
            span {
                class: "navbar__brand",
                Icon { icon: FaDumbbell, width: 16, height: 16 }
                "Liftbook"
            }
            div { class: "navbar__links", {children} }
            OnlineIndicator {}
        }
    }
}
