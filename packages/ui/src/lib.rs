//! This crate contains all shared UI for the workspace.

use std::time::Duration;

use dioxus::prelude::*;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod cache;
pub use cache::{forget_user, make_cache_for_user};

pub mod views;

pub const VIEWS_CSS: Asset = asset!("/src/views/views.css");

mod navbar;
pub use navbar::Navbar;

mod auth;
pub use auth::{remember_user, use_auth, AuthProvider, AuthState, LogoutButton};

mod online_indicator;
pub use online_indicator::OnlineIndicator;

mod sync;
pub use sync::{ApiRemote, SyncStatus};

mod tracker;
pub use tracker::{use_tracker, Tracker, TrackerProvider};

mod push;
pub use push::{disable_push, enable_push, register_service_worker};

mod rest_timer;
pub use rest_timer::RestTimerBanner;

mod set_row;
pub use set_row::SetRow;

/// Platform sleep for background loops.
pub(crate) async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}
