//! # Rest-timer push notifications
//!
//! When a client starts a rest timer it asks the server to notify it once the rest is
//! over, so the reminder arrives even if the tab is in the background or closed.
//!
//! - [`RestTimerScheduler`] keeps at most one pending notification per user. Each one is
//!   a tokio task sleeping for the rest duration; scheduling again or cancelling aborts
//!   the previous task.
//! - [`Notifier`] is the delivery seam. [`WebPushNotifier`] sends a payload-less Web Push
//!   message (`TTL` header, empty body) to every subscription of the user; the service
//!   worker turns it into a "Rest is over" notification. Endpoints answering `404`/`410`
//!   are expired and get deleted.

use std::collections::HashMap;
use std::future::Future;
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::{StatusCode, Url};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::db::get_pool;
use crate::error::ApiError;
use crate::models::subscription::PushSubscriptionRow;
use crate::settings::get_settings;

/// Longest rest period the server accepts.
pub const MAX_REST_SECS: u32 = 60 * 60;

/// Accept a subscription endpoint only when it names a public push service: https on
/// the default port, a DNS name and no credentials. The server posts to it later, so
/// loopback, IP literals and local names are refused.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, ApiError> {
    let invalid = |reason: &str| ApiError::Validation(format!("Push endpoint {reason}"));
    let url = Url::parse(endpoint).map_err(|_| invalid("is not a valid URL"))?;
    if url.scheme() != "https" {
        return Err(invalid("must be an https URL"));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("must not carry credentials"));
    }
    if url.port().is_some() {
        return Err(invalid("must use the default port"));
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return Err(invalid("must use a host name"));
    }
    let local = !host.contains('.')
        || [".localhost", ".local", ".internal", ".localdomain"]
            .iter()
            .any(|suffix| host.ends_with(suffix));
    if local {
        return Err(invalid("must be a public host"));
    }
    Ok(url)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestOver {
    pub user_id: Uuid,
    pub exercise_name: String,
}

/// Delivers a finished-rest message to a user's devices.
pub trait Notifier: Send + Sync + 'static {
    /// Returns the number of devices reached.
    fn notify(&self, message: RestOver) -> impl Future<Output = Result<usize, ApiError>> + Send;
}

/// One pending rest notification per user.
pub struct RestTimerScheduler<N: Notifier> {
    notifier: Arc<N>,
    pending: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl<N: Notifier> RestTimerScheduler<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier: Arc::new(notifier),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Notify `user_id` after `delay`, replacing any notification already pending.
    pub async fn schedule(&self, user_id: Uuid, delay: Duration, exercise_name: String) {
        let notifier = self.notifier.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let message = RestOver {
                user_id,
                exercise_name,
            };
            match notifier.notify(message).await {
                Ok(devices) => tracing::info!("Rest notification sent to {} device(s)", devices),
                Err(e) => tracing::warn!("Rest notification for {} failed: {}", user_id, e),
            }
        });

        let mut pending = self.pending.lock().await;
        pending.retain(|_, task| !task.is_finished());
        if let Some(previous) = pending.insert(user_id, task) {
            previous.abort();
        }
    }

    /// Abort the pending notification. Returns whether one was still waiting.
    pub async fn cancel(&self, user_id: Uuid) -> bool {
        match self.pending.lock().await.remove(&user_id) {
            Some(task) => {
                let waiting = !task.is_finished();
                task.abort();
                waiting
            }
            None => false,
        }
    }

    pub async fn is_scheduled(&self, user_id: Uuid) -> bool {
        self.pending
            .lock()
            .await
            .get(&user_id)
            .is_some_and(|task| !task.is_finished())
    }

    /// Number of tasks held, finished ones included until the next `schedule`.
    pub async fn tracked(&self) -> usize {
        self.pending.lock().await.len()
    }
}

/// Web Push delivery over HTTP.
pub struct WebPushNotifier {
    client: reqwest::Client,
}

impl WebPushNotifier {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for WebPushNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for WebPushNotifier {
    async fn notify(&self, message: RestOver) -> Result<usize, ApiError> {
        let settings = get_settings().await;
        if !settings.push.enabled {
            return Ok(0);
        }
        let pool = get_pool().await?;
        let subscriptions = PushSubscriptionRow::for_user(message.user_id, pool).await?;

        let mut delivered = 0;
        for subscription in &subscriptions {
            let response = self
                .client
                .post(&subscription.endpoint)
                .header("TTL", settings.push.ttl.to_string())
                .header("Urgency", "high")
                .header("Content-Length", "0")
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => delivered += 1,
                Ok(resp) if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::GONE) => {
                    tracing::info!("Removing expired push subscription");
                    PushSubscriptionRow::delete_endpoint(&subscription.endpoint, pool).await?;
                }
                Ok(resp) => {
                    tracing::warn!(
                        "Push service rejected rest notification for {}: {}",
                        message.exercise_name,
                        resp.status()
                    );
                }
                Err(e) => tracing::warn!("Push request failed: {}", e),
            }
        }

        if delivered == 0 && !subscriptions.is_empty() {
            return Err(ApiError::Push("no subscription accepted the message".into()));
        }
        Ok(delivered)
    }
}

static SCHEDULER: OnceLock<RestTimerScheduler<WebPushNotifier>> = OnceLock::new();

/// The process-wide scheduler used by the server functions.
pub fn scheduler() -> &'static RestTimerScheduler<WebPushNotifier> {
    SCHEDULER.get_or_init(|| RestTimerScheduler::new(WebPushNotifier::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Clone)]
    struct RecordingNotifier {
        sent: Arc<std::sync::Mutex<Vec<RestOver>>>,
    }

    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: RestOver) -> Result<usize, ApiError> {
            self.sent.lock().unwrap().push(message);
            Ok(1)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_fires_after_delay() {
        let notifier = RecordingNotifier::default();
        let scheduler = RestTimerScheduler::new(notifier.clone());
        let user = Uuid::new_v4();

        scheduler
            .schedule(user, Duration::from_secs(90), "Squat".into())
            .await;
        assert!(scheduler.is_scheduled(user).await);

        tokio::time::sleep(Duration::from_secs(89)).await;
        assert!(notifier.sent.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].exercise_name, "Squat");
        assert_eq!(sent[0].user_id, user);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending() {
        let notifier = RecordingNotifier::default();
        let scheduler = RestTimerScheduler::new(notifier.clone());
        let user = Uuid::new_v4();

        scheduler
            .schedule(user, Duration::from_secs(60), "Bench Press".into())
            .await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        scheduler
            .schedule(user, Duration::from_secs(60), "Dip".into())
            .await;

        tokio::time::sleep(Duration::from_secs(120)).await;
        tokio::task::yield_now().await;
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].exercise_name, "Dip");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let notifier = RecordingNotifier::default();
        let scheduler = RestTimerScheduler::new(notifier.clone());
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        scheduler
            .schedule(user, Duration::from_secs(10), "Squat".into())
            .await;
        scheduler
            .schedule(other, Duration::from_secs(10), "Deadlift".into())
            .await;
        assert!(scheduler.cancel(user).await);
        assert!(!scheduler.cancel(user).await);

        tokio::time::sleep(Duration::from_secs(20)).await;
        tokio::task::yield_now().await;
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user_id, other);
    }

    #[test]
    fn test_push_service_endpoints_are_accepted() {
        for endpoint in [
            "https://fcm.googleapis.com/fcm/send/abc123",
            "https://updates.push.services.mozilla.com/wpush/v2/gAAAA",
            "https://web.push.apple.com/QGx1",
        ] {
            assert!(validate_endpoint(endpoint).is_ok(), "{endpoint}");
        }
    }

    #[test]
    fn test_internal_endpoints_are_refused() {
        for endpoint in [
            "http://fcm.googleapis.com/fcm/send/abc",
            "https://127.0.0.1/hook",
            "https://[::1]/hook",
            "https://169.254.169.254/latest/meta-data",
            "https://10.0.0.5/admin",
            "https://localhost/admin",
            "https://db.localhost/",
            "https://printer.local/",
            "https://metadata/",
            "https://push.example.com:8443/x",
            "https://user:pw@push.example.com/x",
            "not a url",
        ] {
            assert!(
                matches!(validate_endpoint(endpoint), Err(ApiError::Validation(_))),
                "{endpoint}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_timers_are_dropped_on_next_schedule() {
        let notifier = RecordingNotifier::default();
        let scheduler = RestTimerScheduler::new(notifier.clone());

        for _ in 0..5 {
            scheduler
                .schedule(Uuid::new_v4(), Duration::from_secs(10), "Row".into())
                .await;
        }
        assert_eq!(scheduler.tracked().await, 5);

        tokio::time::sleep(Duration::from_secs(20)).await;
        tokio::task::yield_now().await;
        assert_eq!(notifier.sent.lock().unwrap().len(), 5);

        let user = Uuid::new_v4();
        scheduler
            .schedule(user, Duration::from_secs(10), "Squat".into())
            .await;
        assert_eq!(scheduler.tracked().await, 1);
        assert!(scheduler.is_scheduled(user).await);
    }
}
