//! # API crate: shared fullstack server functions for Liftbook
//!
//! Defines every Dioxus server function the web frontend calls, along with the
//! server-side modules they depend on.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | none | Password hashing, session helpers, sign-up validation |
//! | [`db`] | none | PostgreSQL connection pool (lazy `OnceCell` singleton) and migrations |
//! | [`models`] | none | Database rows (`User`, workouts, library, push subscriptions) and `UserInfo` |
//! | [`workouts`] | none | Workout, exercise, set and history endpoints |
//! | [`exercise_library`] | none | Exercise-name library endpoints |
//! | [`notifications`] | none | Push subscription and rest-timer endpoints |
//! | [`push`] | `server` | Rest-timer scheduler and Web Push delivery |
//! | [`settings`] | `server` | Layered server configuration |
//!
//! ## Server functions
//!
//! Every public `async fn` is a Dioxus server function, annotated with `#[get(...)]` or
//! `#[post(...)]` and compiled twice: once with the server logic (behind
//! `#[cfg(feature = "server")]`) and once as a thin client stub that forwards the call
//! over HTTP. Server logic returns [`error::ApiError`] and converts it with
//! [`error::server_error`] at the boundary.
//!
//! Authentication lives in this file: `get_current_user`, `register`, `login_password`,
//! `logout`.

use dioxus::prelude::*;

pub mod auth;
pub mod db;
#[cfg(feature = "server")]
pub mod error;
pub mod exercise_library;
pub mod models;
pub mod notifications;
#[cfg(feature = "server")]
pub mod push;
#[cfg(feature = "server")]
pub mod settings;
pub mod workouts;

pub use exercise_library::{add_exercise_name, delete_exercise_name, list_exercise_names};
pub use models::UserInfo;
pub use notifications::{
    cancel_rest_notification, get_push_config, schedule_rest_notification, subscribe_push,
    unsubscribe_push, PushConfig,
};
pub use store::{Exercise, ExerciseName, HistoryEntry, WorkoutDay, WorkoutSet};
pub use workouts::{
    add_exercise, add_set, create_workout, delete_exercise, delete_history, delete_workout,
    get_workout, list_history, list_workouts, remove_set, save_history, save_workout,
    update_set,
};

/// Get the current authenticated user from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    server_auth::current_user(&session)
        .await
        .map_err(error::server_error)
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    Ok(None)
}

/// Sign up with email and password, and log the new account in.
#[cfg(feature = "server")]
#[post("/api/auth/register", session: tower_sessions::Session)]
pub async fn register(
    email: String,
    password: String,
    name: String,
) -> Result<UserInfo, ServerFnError> {
    server_auth::register(&session, &email, &password, &name)
        .await
        .map_err(error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/register")]
pub async fn register(
    email: String,
    password: String,
    name: String,
) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log in with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/login", session: tower_sessions::Session)]
pub async fn login_password(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    server_auth::login(&session, &email, &password)
        .await
        .map_err(error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/login")]
pub async fn login_password(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log out the current user by clearing the session.
#[cfg(feature = "server")]
#[post("/api/auth/logout", session: tower_sessions::Session)]
pub async fn logout() -> Result<(), ServerFnError> {
    if let Ok(user_id) = auth::current_user_id(&session).await {
        push::scheduler().cancel(user_id).await;
    }
    session
        .flush()
        .await
        .map_err(|e| error::server_error(e.into()))
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/logout")]
pub async fn logout() -> Result<(), ServerFnError> {
    Ok(())
}

#[cfg(feature = "server")]
mod server_auth {
    use tower_sessions::Session;

    use crate::auth::{self, SESSION_USER_ID_KEY};
    use crate::db::get_pool;
    use crate::error::ApiError;
    use crate::models::{User, UserInfo};

    const INVALID_LOGIN: &str = "Invalid email or password";
    const EMAIL_TAKEN: &str = "An account with this email already exists";

    pub async fn current_user(session: &Session) -> Result<Option<UserInfo>, ApiError> {
        let user_id = match auth::current_user_id(session).await {
            Ok(id) => id,
            Err(ApiError::NotAuthenticated) => return Ok(None),
            Err(e) => return Err(e),
        };
        let pool = get_pool().await?;
        Ok(User::find(user_id, pool).await?.map(|u| u.to_info()))
    }

    pub async fn register(
        session: &Session,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserInfo, ApiError> {
        let (email, name) = auth::validate_registration(email, password, name)?;
        let pool = get_pool().await?;

        if User::find_by_email(&email, pool).await?.is_some() {
            return Err(ApiError::Conflict(EMAIL_TAKEN.into()));
        }

        let password_hash = auth::hash_password(password)?;
        // A concurrent registration can still win between the lookup and the insert
        let user = User::create(&email, &name, &password_hash, pool)
            .await
            .map_err(|e| ApiError::from(e).unique_as_conflict(EMAIL_TAKEN))?;
        tracing::info!("Registered user {}", user.id);

        start_session(session, &user).await?;
        Ok(user.to_info())
    }

    pub async fn login(session: &Session, email: &str, password: &str) -> Result<UserInfo, ApiError> {
        let email = email.trim().to_lowercase();
        let pool = get_pool().await?;

        let Some(user) = User::find_by_email(&email, pool).await? else {
            return Err(ApiError::Validation(INVALID_LOGIN.into()));
        };
        if !auth::verify_password(password, &user.password_hash)? {
            return Err(ApiError::Validation(INVALID_LOGIN.into()));
        }

        start_session(session, &user).await?;
        Ok(user.to_info())
    }

    async fn start_session(session: &Session, user: &User) -> Result<(), ApiError> {
        session.cycle_id().await?;
        session
            .insert(SESSION_USER_ID_KEY, user.id.to_string())
            .await?;
        Ok(())
    }
}
