//! Login page view with email/password form.

use dioxus::prelude::*;
use ui::{remember_user, use_auth};

use crate::Route;

/// Login page component.
#[component]
pub fn Login() -> Element {
    let mut auth = use_auth();
    let nav = use_navigator();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    // If already logged in, go to the workouts
    if !auth().loading && auth().user.is_some() {
        nav.replace(Route::Workouts {});
    }

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);
            loading.set(true);
            match api::login_password(email().trim().to_string(), password()).await {
                Ok(user) => {
                    remember_user(Some(&user));
                    auth.set(ui::AuthState {
                        user: Some(user),
                        loading: false,
                        online: true,
                    });
                    nav.replace(Route::Workouts {});
                }
                Err(e) => {
                    loading.set(false);
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    rsx! {
        div {
            class: "auth-page",

            h1 { class: "auth-page__title", "Liftbook" }
            p { class: "auth-page__subtitle", "Sign in to your training log" }

            form {
                onsubmit: handle_login,
                class: "auth-form",

                if let Some(err) = error() {
                    div { class: "auth-form__error", "{err}" }
                }

                input {
                    r#type: "email",
                    placeholder: "Email",
                    autocomplete: "email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }

                input {
                    r#type: "password",
                    placeholder: "Password",
                    autocomplete: "current-password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }

                button {
                    class: "btn btn--primary",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Signing in..." } else { "Sign in" }
                }
            }

            p {
                class: "auth-page__footer",
                "No account yet? "
                Link { to: Route::Register {}, "Create one" }
            }
        }
    }
}
