//! # Push notification server functions
//!
//! Browsers register a push subscription once (`subscribe_push`); afterwards each rest
//! timer started on a client schedules a server-side reminder with
//! `schedule_rest_notification`, and stopping the timer early cancels it.

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

/// What a client needs to subscribe to push messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    pub enabled: bool,
    /// Application server key for `PushManager.subscribe`, base64url encoded.
    pub public_key: Option<String>,
}

#[cfg(feature = "server")]
#[get("/api/push/config")]
pub async fn get_push_config() -> Result<PushConfig, ServerFnError> {
    let settings = crate::settings::get_settings().await;
    Ok(PushConfig {
        enabled: settings.push.enabled,
        public_key: settings.push.key.clone(),
    })
}

#[cfg(not(feature = "server"))]
#[get("/api/push/config")]
pub async fn get_push_config() -> Result<PushConfig, ServerFnError> {
    Ok(PushConfig::default())
}

/// Store the browser's push subscription for the current user.
#[cfg(feature = "server")]
#[post("/api/push/subscribe", session: tower_sessions::Session)]
pub async fn subscribe_push(
    endpoint: String,
    p256dh: String,
    auth: String,
) -> Result<(), ServerFnError> {
    server::subscribe(&session, endpoint, p256dh, auth)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/push/subscribe")]
pub async fn subscribe_push(
    endpoint: String,
    p256dh: String,
    auth: String,
) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/push/unsubscribe", session: tower_sessions::Session)]
pub async fn unsubscribe_push(endpoint: String) -> Result<(), ServerFnError> {
    server::unsubscribe(&session, &endpoint)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/push/unsubscribe")]
pub async fn unsubscribe_push(endpoint: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Ask for a "rest is over" notification in `delay_secs` seconds, replacing any
/// reminder already pending for this user.
#[cfg(feature = "server")]
#[post("/api/push/rest-timer", session: tower_sessions::Session)]
pub async fn schedule_rest_notification(
    delay_secs: u32,
    exercise_name: String,
) -> Result<(), ServerFnError> {
    server::schedule(&session, delay_secs, exercise_name)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/push/rest-timer")]
pub async fn schedule_rest_notification(
    delay_secs: u32,
    exercise_name: String,
) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Cancel the pending rest reminder. Returns whether one was still waiting.
#[cfg(feature = "server")]
#[post("/api/push/rest-timer/cancel", session: tower_sessions::Session)]
pub async fn cancel_rest_notification() -> Result<bool, ServerFnError> {
    let user_id = crate::auth::current_user_id(&session)
        .await
        .map_err(crate::error::server_error)?;
    Ok(crate::push::scheduler().cancel(user_id).await)
}

#[cfg(not(feature = "server"))]
#[post("/api/push/rest-timer/cancel")]
pub async fn cancel_rest_notification() -> Result<bool, ServerFnError> {
    Ok(false)
}

#[cfg(feature = "server")]
mod server {
    use std::time::Duration;

    use tower_sessions::Session;

    use crate::auth::current_user_id;
    use crate::db::get_pool;
    use crate::error::ApiError;
    use crate::models::subscription::PushSubscriptionRow;
    use crate::push::{scheduler, validate_endpoint, MAX_REST_SECS};
    use crate::settings::get_settings;

    pub async fn subscribe(
        session: &Session,
        endpoint: String,
        p256dh: String,
        auth: String,
    ) -> Result<(), ApiError> {
        let user_id = current_user_id(session).await?;
        validate_endpoint(&endpoint)?;
        let pool = get_pool().await?;
        PushSubscriptionRow {
            endpoint,
            p256dh,
            auth,
        }
        .upsert(user_id, pool)
        .await?;
        Ok(())
    }

    pub async fn unsubscribe(session: &Session, endpoint: &str) -> Result<(), ApiError> {
        let user_id = current_user_id(session).await?;
        let pool = get_pool().await?;
        PushSubscriptionRow::delete(user_id, endpoint, pool).await?;
        Ok(())
    }

    pub async fn schedule(
        session: &Session,
        delay_secs: u32,
        exercise_name: String,
    ) -> Result<(), ApiError> {
        let user_id = current_user_id(session).await?;
        if !get_settings().await.push.enabled {
            return Ok(());
        }
        if delay_secs == 0 {
            return Err(ApiError::Validation("Rest period must be positive".into()));
        }
        let delay = Duration::from_secs(u64::from(delay_secs.min(MAX_REST_SECS)));
        scheduler().schedule(user_id, delay, exercise_name).await;
        Ok(())
    }
}
