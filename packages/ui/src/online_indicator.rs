//! Online/offline status indicator for the navbar.

use dioxus::prelude::*;

use crate::auth::use_auth;
use crate::icons::{FaCloud, FaCloudArrowUp, FaRotate, FaUserSlash};
use crate::tracker::use_tracker;
use crate::Icon;

/// A small icon that shows connectivity, auth and sync status.
///
/// - **Syncing**: spinning arrows
/// - **Online, nothing pending**: green cloud
/// - **Changes pending or offline**: orange cloud-up with the number of queued days
/// - **Anonymous**: gray slashed-user icon
#[component]
pub fn OnlineIndicator() -> Element {
    let auth = use_auth();
    let tracker = use_tracker();
    let state = auth();
    let status = (tracker.status)();

    if state.loading {
        return rsx! {};
    }

    if state.user.is_none() {
        return rsx! {
            span {
                class: "online-indicator online-indicator--anonymous",
                title: "Signed out",
                Icon { icon: FaUserSlash, width: 14, height: 14 }
            }
        };
    }

    if status.syncing {
        return rsx! {
            span {
                class: "online-indicator online-indicator--syncing",
                title: "Syncing",
                Icon { icon: FaRotate, width: 14, height: 14 }
            }
        };
    }

    let title = match (&status.last_error, state.online) {
        (_, false) => format!("Offline, {} change(s) waiting", status.pending),
        (Some(e), true) => format!("Sync failed: {e}"),
        (None, true) => format!("{} change(s) waiting", status.pending),
    };

    if status.pending == 0 && state.online {
        rsx! {
            span {
                class: "online-indicator online-indicator--synced",
                title: "Synced",
                Icon { icon: FaCloud, width: 14, height: 14 }
            }
        }
    } else {
        rsx! {
            span {
                class: "online-indicator online-indicator--pending",
                title: "{title}",
                Icon { icon: FaCloudArrowUp, width: 14, height: 14 }
                if status.pending > 0 {
                    span { class: "online-indicator__count", "{status.pending}" }
                }
            }
        }
    }
}
