//! Authentication context and hooks for the UI.

use std::time::Duration;

use api::UserInfo;
use dioxus::prelude::*;

use crate::sleep;

/// Seconds between connectivity checks.
const PING_INTERVAL_SECS: u64 = 30;

/// `localStorage` key holding the last signed-in user for offline starts.
#[cfg(target_arch = "wasm32")]
const REMEMBERED_USER_KEY: &str = "liftbook.user";

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserInfo>,
    pub loading: bool,
    /// Whether the server is reachable (last connectivity check succeeded).
    pub online: bool,
}

impl AuthState {
    /// Id used to scope the local cache.
    pub fn user_id(&self) -> Option<String> {
        self.user.as_ref().map(|u| u.id.clone())
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            online: false,
        }
    }
}

/// Get the current authentication state.
/// Returns a signal that updates when the user logs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Provider component that manages authentication state.
///
/// While offline, the last known user stays signed in so cached workouts remain
/// usable; only `online` flips.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let mut auth_state = use_signal(AuthState::default);

    // Fetch the current user on mount
    let _ = use_resource(move || async move {
        match api::get_current_user().await {
            Ok(user) => {
                remember_user(user.as_ref());
                auth_state.set(AuthState {
                    user,
                    loading: false,
                    online: true,
                });
            }
            Err(e) => {
                tracing::warn!("Server unreachable, starting offline: {}", e);
                auth_state.set(AuthState {
                    user: remembered_user(),
                    loading: false,
                    online: false,
                });
            }
        }
    });

    use_effect(move || {
        spawn(async move {
            loop {
                sleep(Duration::from_secs(PING_INTERVAL_SECS)).await;

                // Don't check while initial load is still in progress
                if auth_state.peek().loading {
                    continue;
                }
                let current = auth_state.peek().clone();
                match api::get_current_user().await {
                    Ok(user) => {
                        if current.user != user || !current.online {
                            remember_user(user.as_ref());
                            auth_state.set(AuthState {
                                user,
                                loading: false,
                                online: true,
                            });
                        }
                    }
                    Err(_) => {
                        if current.online {
                            auth_state.set(AuthState {
                                online: false,
                                ..current
                            });
                        }
                    }
                }
            }
        });
    });

    use_context_provider(|| auth_state);

    rsx! {
        {children}
    }
}

/// Store the signed-in user so a reload without network keeps the same cache.
pub fn remember_user(user: Option<&UserInfo>) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
            return;
        };
        let result = match user.and_then(|u| serde_json::to_string(u).ok()) {
            Some(raw) => storage.set_item(REMEMBERED_USER_KEY, &raw),
            None => storage.remove_item(REMEMBERED_USER_KEY),
        };
        if result.is_err() {
            web_sys::console::warn_1(&"Could not update the remembered user".into());
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = user;
}

#[cfg(target_arch = "wasm32")]
fn remembered_user() -> Option<UserInfo> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let raw = storage.get_item(REMEMBERED_USER_KEY).ok()??;
    serde_json::from_str(&raw).ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn remembered_user() -> Option<UserInfo> {
    None
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Log out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut auth_state = use_auth();

    let onclick = move |_| async move {
        match api::logout().await {
            Ok(()) => {
                // Unsynced edits stay on the device until the next login
                if let Some(user_id) = auth_state.peek().user_id() {
                    let cache = crate::make_cache_for_user(Some(&user_id));
                    if cache.pending().await.is_empty() {
                        crate::cache::forget_user(&user_id).await;
                    }
                }
                remember_user(None);
                auth_state.set(AuthState {
                    user: None,
                    loading: false,
                    online: true,
                });
                #[cfg(target_arch = "wasm32")]
                {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href("/login");
                    }
                }
            }
            Err(e) => tracing::warn!("Logout failed: {}", e),
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
