use dioxus::prelude::*;

use ui::AuthProvider;
use views::{AppLayout, ExerciseDetail, ExerciseHistory, Login, Register, Settings, WorkoutDetail, Workouts};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},
    #[layout(AppLayout)]
        #[route("/workouts")]
        Workouts {},
        #[route("/workouts/:workout_id")]
        WorkoutDetail { workout_id: String },
        #[route("/workouts/:workout_id/exercises/:exercise_id")]
        ExerciseDetail { workout_id: String, exercise_id: String },
        #[route("/workouts/:workout_id/exercises/:exercise_id/history")]
        ExerciseHistory { workout_id: String, exercise_id: String },
        #[route("/settings")]
        Settings {},
}

const FAVICON: Asset = asset!("/assets/favicon.svg");
const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("Failed to start the tokio runtime: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = runtime.block_on(launch_server()) {
            tracing::error!("Server stopped: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

/// Service worker caching the app shell and turning rest-timer pushes into notifications.
#[cfg(feature = "server")]
const SERVICE_WORKER_JS: &str = include_str!("../assets/sw.js");

#[cfg(feature = "server")]
async fn launch_server() -> Result<(), Box<dyn std::error::Error>> {
    use axum::routing::get;
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use tower_sessions::cookie::time::Duration;
    use tower_sessions::cookie::SameSite;
    use tower_sessions::{Expiry, SessionManagerLayer};
    use tower_sessions_sqlx_store::PostgresStore;

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let settings = api::settings::get_settings().await;

    // Initialize database pool and schema
    let pool = api::db::get_pool().await?;
    api::db::run_migrations(pool).await?;

    // Create session store
    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(settings.session.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(
            i64::try_from(settings.session.days).unwrap_or(7),
        )));

    // Build the Dioxus app with custom routes
    let router = axum::Router::new()
        .route("/sw.js", get(service_worker))
        .serve_dioxus_application(ServeConfig::new(), App)
        .layer(session_layer);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}

/// Served from the site root so its scope covers every page.
#[cfg(feature = "server")]
async fn service_worker() -> impl axum::response::IntoResponse {
    (
        [
            (axum::http::header::CONTENT_TYPE, "application/javascript"),
            (axum::http::header::CACHE_CONTROL, "no-cache"),
        ],
        SERVICE_WORKER_JS,
    )
}

#[component]
fn App() -> Element {
    use_effect(|| {
        spawn(async {
            ui::register_service_worker().await;
        });
    });

    rsx! {
        // Global app resources
        document::Link { rel: "icon", href: FAVICON }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AuthProvider {
            Router::<Route> {}
        }
    }
}

/// Redirect `/` to `/workouts`
#[component]
fn Root() -> Element {
    let nav = use_navigator();
    nav.replace(Route::Workouts {});
    rsx! {}
}

#[cfg(test)]
mod tests {
    const WORKER: &str = include_str!("../assets/sw.js");

    #[test]
    fn test_worker_serves_shell_offline() {
        assert!(WORKER.contains(r#"addEventListener("fetch""#));
        assert!(WORKER.contains(r#"const SHELL = ["/""#));
        assert!(WORKER.contains(r#"caches.match("/")"#));
    }

    #[test]
    fn test_worker_leaves_api_calls_alone() {
        assert!(WORKER.contains(r#"startsWith("/api/")"#));
        assert!(WORKER.contains(r#"request.method !== "GET""#));
    }
}
