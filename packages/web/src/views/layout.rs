use dioxus::prelude::*;

use ui::{use_auth, Navbar, RestTimerBanner, TrackerProvider};

use crate::Route;

/// Shell for every signed-in page: navbar, routed content, rest timer.
///
/// Redirects to the login page once the auth check has finished without a user.
#[component]
pub fn AppLayout() -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    let state = auth();
    if !state.loading && state.user.is_none() {
        nav.replace(Route::Login {});
        return rsx! {};
    }

    rsx! {
        TrackerProvider {
            Navbar {
                Link { to: Route::Workouts {}, active_class: "active", "Workouts" }
                Link { to: Route::Settings {}, active_class: "active", "Settings" }
            }
            main {
                Outlet::<Route> {}
            }
            RestTimerBanner {}
        }
    }
}
