//! # Workout server functions
//!
//! Workout days, their exercises, sets and per-exercise history. Every function
//! requires a logged-in session and only ever touches the caller's own days.
//!
//! Mutations that address a single exercise or set go through
//! [`crate::models::workout::modify_workout`], which locks the row, applies the edit
//! from [`store::WorkoutDay`] and stamps `updated_at`. Each of them returns the whole
//! updated day so the client can replace its cached copy.
//!
//! [`save_workout`] is the sync entry point: it takes a complete day from a client
//! cache and merges it with the stored copy by last-write-wins.

use dioxus::prelude::*;
use store::{HistoryEntry, WorkoutDay};

/// All workout days of the current user, ordered by weekday then name.
#[cfg(feature = "server")]
#[get("/api/workouts", session: tower_sessions::Session)]
pub async fn list_workouts() -> Result<Vec<WorkoutDay>, ServerFnError> {
    server::list(&session).await.map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[get("/api/workouts")]
pub async fn list_workouts() -> Result<Vec<WorkoutDay>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/workouts/:id", session: tower_sessions::Session)]
pub async fn get_workout(id: String) -> Result<Option<WorkoutDay>, ServerFnError> {
    server::get(&session, &id)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[get("/api/workouts/:id")]
pub async fn get_workout(id: String) -> Result<Option<WorkoutDay>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Create an empty workout day.
#[cfg(feature = "server")]
#[post("/api/workouts/create", session: tower_sessions::Session)]
pub async fn create_workout(name: String, day_index: u8) -> Result<WorkoutDay, ServerFnError> {
    server::create(&session, &name, day_index)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/workouts/create")]
pub async fn create_workout(name: String, day_index: u8) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Upload a full day from a client cache. Returns the merged day now stored.
#[cfg(feature = "server")]
#[post("/api/workouts/save", session: tower_sessions::Session)]
pub async fn save_workout(day: WorkoutDay) -> Result<WorkoutDay, ServerFnError> {
    server::save(&session, day)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/workouts/save")]
pub async fn save_workout(day: WorkoutDay) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Delete a day with everything in it. Deleting a missing day succeeds.
#[cfg(feature = "server")]
#[post("/api/workouts/delete", session: tower_sessions::Session)]
pub async fn delete_workout(id: String) -> Result<(), ServerFnError> {
    server::delete(&session, &id)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/workouts/delete")]
pub async fn delete_workout(id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/exercises/add", session: tower_sessions::Session)]
pub async fn add_exercise(workout_id: String, name: String) -> Result<WorkoutDay, ServerFnError> {
    server::modify(&session, &workout_id, |day, now| {
        day.add_exercise(&name, now).map(|_| ())
    })
    .await
    .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/exercises/add")]
pub async fn add_exercise(workout_id: String, name: String) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/exercises/delete", session: tower_sessions::Session)]
pub async fn delete_exercise(
    workout_id: String,
    exercise_id: String,
) -> Result<WorkoutDay, ServerFnError> {
    server::modify(&session, &workout_id, |day, now| {
        day.remove_exercise(&exercise_id, now).map(|_| ())
    })
    .await
    .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/exercises/delete")]
pub async fn delete_exercise(
    workout_id: String,
    exercise_id: String,
) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Append a set copying the previous set's weight and reps.
#[cfg(feature = "server")]
#[post("/api/sets/add", session: tower_sessions::Session)]
pub async fn add_set(workout_id: String, exercise_id: String) -> Result<WorkoutDay, ServerFnError> {
    server::modify(&session, &workout_id, |day, now| {
        day.edit_exercise(&exercise_id, now, |exercise| {
            exercise.add_set();
            Ok(())
        })
    })
    .await
    .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/sets/add")]
pub async fn add_set(workout_id: String, exercise_id: String) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/sets/update", session: tower_sessions::Session)]
pub async fn update_set(
    workout_id: String,
    exercise_id: String,
    index: usize,
    weight: f64,
    reps: u32,
    completed: bool,
) -> Result<WorkoutDay, ServerFnError> {
    server::modify(&session, &workout_id, |day, now| {
        day.edit_exercise(&exercise_id, now, |exercise| {
            exercise.update_set(index, weight, reps)?;
            exercise.set_completed(index, completed)
        })
    })
    .await
    .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/sets/update")]
pub async fn update_set(
    workout_id: String,
    exercise_id: String,
    index: usize,
    weight: f64,
    reps: u32,
    completed: bool,
) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Remove a set. Fails when it is the exercise's only set.
#[cfg(feature = "server")]
#[post("/api/sets/remove", session: tower_sessions::Session)]
pub async fn remove_set(
    workout_id: String,
    exercise_id: String,
    index: usize,
) -> Result<WorkoutDay, ServerFnError> {
    server::modify(&session, &workout_id, |day, now| {
        day.edit_exercise(&exercise_id, now, |exercise| {
            exercise.remove_set(index).map(|_| ())
        })
    })
    .await
    .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/sets/remove")]
pub async fn remove_set(
    workout_id: String,
    exercise_id: String,
    index: usize,
) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// History of one exercise, most recent first.
#[cfg(feature = "server")]
#[get("/api/history/:workout_id/:exercise_id", session: tower_sessions::Session)]
pub async fn list_history(
    workout_id: String,
    exercise_id: String,
) -> Result<Vec<HistoryEntry>, ServerFnError> {
    server::history(&session, &workout_id, &exercise_id)
        .await
        .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[get("/api/history/:workout_id/:exercise_id")]
pub async fn list_history(
    workout_id: String,
    exercise_id: String,
) -> Result<Vec<HistoryEntry>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Snapshot the exercise's current sets as the session of `date` (`YYYY-MM-DD`).
#[cfg(feature = "server")]
#[post("/api/history/save", session: tower_sessions::Session)]
pub async fn save_history(
    workout_id: String,
    exercise_id: String,
    date: String,
) -> Result<WorkoutDay, ServerFnError> {
    server::modify(&session, &workout_id, |day, now| {
        day.edit_exercise(&exercise_id, now, |exercise| {
            exercise.record_history(&date).map(|_| ())
        })
    })
    .await
    .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/history/save")]
pub async fn save_history(
    workout_id: String,
    exercise_id: String,
    date: String,
) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/history/delete", session: tower_sessions::Session)]
pub async fn delete_history(
    workout_id: String,
    exercise_id: String,
    entry_id: String,
) -> Result<WorkoutDay, ServerFnError> {
    server::modify(&session, &workout_id, |day, now| {
        day.edit_exercise(&exercise_id, now, |exercise| {
            exercise.delete_history(&entry_id).map(|_| ())
        })
    })
    .await
    .map_err(crate::error::server_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/history/delete")]
pub async fn delete_history(
    workout_id: String,
    exercise_id: String,
    entry_id: String,
) -> Result<WorkoutDay, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
mod server {
    use store::merge::merge_day;
    use store::{HistoryEntry, StoreError, WorkoutDay};
    use tower_sessions::Session;

    use crate::auth::current_user_id;
    use crate::db::get_pool;
    use crate::error::ApiError;
    use crate::models::workout::{modify_workout, parse_id, WorkoutRow};

    pub async fn list(session: &Session) -> Result<Vec<WorkoutDay>, ApiError> {
        let user_id = current_user_id(session).await?;
        let pool = get_pool().await?;
        Ok(WorkoutRow::list(user_id, pool).await?)
    }

    pub async fn get(session: &Session, id: &str) -> Result<Option<WorkoutDay>, ApiError> {
        let user_id = current_user_id(session).await?;
        let pool = get_pool().await?;
        Ok(WorkoutRow::find(user_id, parse_id(id)?, pool).await?)
    }

    pub async fn create(session: &Session, name: &str, day_index: u8) -> Result<WorkoutDay, ApiError> {
        let user_id = current_user_id(session).await?;
        let day = WorkoutDay::new(name, day_index, store::clock::now_millis())?;
        let pool = get_pool().await?;

        let mut tx = pool.begin().await?;
        WorkoutRow::upsert(user_id, &day, &mut tx).await?;
        tx.commit().await?;
        tracing::info!("Created workout {} for {}", day.id, user_id);
        Ok(day)
    }

    pub async fn save(session: &Session, mut day: WorkoutDay) -> Result<WorkoutDay, ApiError> {
        let user_id = current_user_id(session).await?;
        day.validate()?;
        let id = parse_id(&day.id)?;
        let pool = get_pool().await?;

        let mut tx = pool.begin().await?;
        let merged = match WorkoutRow::find_for_update(user_id, id, &mut tx).await? {
            Some(stored) => merge_day(&day, &stored),
            None => day,
        };
        WorkoutRow::upsert(user_id, &merged, &mut tx).await?;
        tx.commit().await?;
        Ok(merged)
    }

    pub async fn delete(session: &Session, id: &str) -> Result<(), ApiError> {
        let user_id = current_user_id(session).await?;
        let pool = get_pool().await?;
        if !WorkoutRow::delete(user_id, parse_id(id)?, pool).await? {
            tracing::debug!("Workout {} already gone", id);
        }
        Ok(())
    }

    pub async fn modify(
        session: &Session,
        workout_id: &str,
        edit: impl FnOnce(&mut WorkoutDay, i64) -> Result<(), StoreError>,
    ) -> Result<WorkoutDay, ApiError> {
        let user_id = current_user_id(session).await?;
        let pool = get_pool().await?;
        let ((), day) = modify_workout(user_id, workout_id, pool, edit).await?;
        Ok(day)
    }

    pub async fn history(
        session: &Session,
        workout_id: &str,
        exercise_id: &str,
    ) -> Result<Vec<HistoryEntry>, ApiError> {
        let day = get(session, workout_id)
            .await?
            .ok_or(ApiError::NotFound("Workout"))?;
        day.exercise(exercise_id)
            .map(|exercise| exercise.history.clone())
            .ok_or(ApiError::NotFound("Exercise"))
    }
}
