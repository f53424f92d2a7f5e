//! Exercise-name library: the built-in names plus the user's own.

use dioxus::prelude::*;
use store::ExerciseName;

/// Built-in and custom names, sorted case-insensitively.
#[cfg(feature = "server")]
#[get("/api/library", session: tower_sessions::Session)]
pub async fn list_exercise_names() -> Result<Vec<ExerciseName>, ServerFnError> {
    server::list(&session)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[get("/api/library")]
pub async fn list_exercise_names() -> Result<Vec<ExerciseName>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Add a custom name. Adding a name that already exists returns it unchanged.
#[cfg(feature = "server")]
#[post("/api/library/add", session: tower_sessions::Session)]
pub async fn add_exercise_name(name: String) -> Result<ExerciseName, ServerFnError> {
    server::add(&session, &name)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/library/add")]
pub async fn add_exercise_name(name: String) -> Result<ExerciseName, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Delete a custom name. Built-in names cannot be deleted.
#[cfg(feature = "server")]
#[post("/api/library/delete", session: tower_sessions::Session)]
pub async fn delete_exercise_name(id: String) -> Result<(), ServerFnError> {
    server::delete(&session, &id)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/library/delete")]
pub async fn delete_exercise_name(id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
mod server {
    use store::ExerciseName;
    use tower_sessions::Session;

    use crate::auth::current_user_id;
    use crate::db::get_pool;
    use crate::error::ApiError;
    use crate::models::library::{merge_library, ExerciseNameRow};
    use crate::models::workout::parse_id;

    pub async fn list(session: &Session) -> Result<Vec<ExerciseName>, ApiError> {
        let user_id = current_user_id(session).await?;
        let pool = get_pool().await?;
        let custom = ExerciseNameRow::list(user_id, pool).await?;
        Ok(merge_library(&custom))
    }

    pub async fn add(session: &Session, name: &str) -> Result<ExerciseName, ApiError> {
        let user_id = current_user_id(session).await?;
        let pool = get_pool().await?;
        Ok(ExerciseNameRow::add(user_id, name, pool).await?.to_name())
    }

    pub async fn delete(session: &Session, id: &str) -> Result<(), ApiError> {
        let user_id = current_user_id(session).await?;
        if id.starts_with("builtin:") {
            return Err(ApiError::Validation("Built-in exercises cannot be deleted".into()));
        }
        let pool = get_pool().await?;
        if !ExerciseNameRow::delete(user_id, parse_id(id)?, pool).await? {
            return Err(ApiError::NotFound("Exercise name"));
        }
        Ok(())
    }
}
