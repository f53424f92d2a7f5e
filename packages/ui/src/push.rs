//! Browser push subscription, driven through `document::eval`.
//!
//! The service worker is served by the web server at `/sw.js`. It is registered on
//! every start by [`register_service_worker`], since it also caches the app shell for
//! offline use. Subscribing asks for notification permission and hands the
//! subscription to [`api::subscribe_push`]; the server later sends payload-less pushes
//! to it when a rest timer ends.

use dioxus::prelude::*;
use serde::Deserialize;

const REGISTER_JS: &str = r#"
if (!("serviceWorker" in navigator)) {
    return false;
}
try {
    await navigator.serviceWorker.register("/sw.js");
    return true;
} catch (e) {
    return false;
}
"#;

const SUBSCRIBE_JS: &str = r#"
const key = await dioxus.recv();
if (!("serviceWorker" in navigator) || !("PushManager" in window)) {
    return { error: "Push notifications are not supported by this browser" };
}
const permission = await Notification.requestPermission();
if (permission !== "granted") {
    return { error: "Notification permission was not granted" };
}
const registration = await navigator.serviceWorker.register("/sw.js");
await navigator.serviceWorker.ready;
let subscription = await registration.pushManager.getSubscription();
if (!subscription) {
    const options = { userVisibleOnly: true };
    if (key) {
        options.applicationServerKey = key;
    }
    subscription = await registration.pushManager.subscribe(options);
}
const json = subscription.toJSON();
return { endpoint: json.endpoint, p256dh: json.keys.p256dh, auth: json.keys.auth };
"#;

const UNSUBSCRIBE_JS: &str = r#"
if (!("serviceWorker" in navigator)) {
    return null;
}
const registration = await navigator.serviceWorker.getRegistration("/sw.js");
if (!registration) {
    return null;
}
const subscription = await registration.pushManager.getSubscription();
if (!subscription) {
    return null;
}
const endpoint = subscription.endpoint;
await subscription.unsubscribe();
return endpoint;
"#;

#[derive(Debug, Deserialize)]
struct BrowserSubscription {
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    p256dh: String,
    #[serde(default)]
    auth: String,
    #[serde(default)]
    error: Option<String>,
}

/// Install the service worker. Returns whether the browser accepted it.
pub async fn register_service_worker() -> bool {
    match document::eval(REGISTER_JS).join::<bool>().await {
        Ok(registered) => registered,
        Err(e) => {
            tracing::warn!("Service worker registration failed: {:?}", e);
            false
        }
    }
}

/// Subscribe this browser to rest-timer pushes.
pub async fn enable_push() -> Result<(), String> {
    let config = api::get_push_config().await.map_err(|e| e.to_string())?;
    if !config.enabled {
        return Err("Push notifications are disabled on this server".to_string());
    }

    let eval = document::eval(SUBSCRIBE_JS);
    eval.send(config.public_key)
        .map_err(|e| format!("Could not reach the browser: {e:?}"))?;
    let subscription = eval
        .join::<BrowserSubscription>()
        .await
        .map_err(|e| format!("Subscription failed: {e:?}"))?;
    if let Some(error) = subscription.error {
        return Err(error);
    }

    api::subscribe_push(subscription.endpoint, subscription.p256dh, subscription.auth)
        .await
        .map_err(|e| e.to_string())
}

/// Remove this browser's subscription, locally and on the server.
pub async fn disable_push() -> Result<(), String> {
    let endpoint = document::eval(UNSUBSCRIBE_JS)
        .join::<Option<String>>()
        .await
        .map_err(|e| format!("Unsubscribe failed: {e:?}"))?;
    match endpoint {
        Some(endpoint) => api::unsubscribe_push(endpoint).await.map_err(|e| e.to_string()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_registration_does_not_need_push() {
        assert!(REGISTER_JS.contains(r#"serviceWorker.register("/sw.js")"#));
        assert!(!REGISTER_JS.contains("Notification"));
        assert!(!REGISTER_JS.contains("PushManager"));
    }
}
