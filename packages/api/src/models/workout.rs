//! # Workout rows
//!
//! A workout day is one row of `workouts`; its exercises, their sets and their history
//! are embedded as a JSONB document, mirroring [`store::WorkoutDay`] exactly. Every
//! query is scoped by `user_id`, so one user can never read or overwrite another
//! user's days even when they guess an id.

use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use store::{Exercise, StoreError, WorkoutDay};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, FromRow)]
pub struct WorkoutRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub day_index: i16,
    pub exercises: Json<Vec<Exercise>>,
    pub updated_at: i64,
}

const COLUMNS: &str = "id, user_id, name, day_index, exercises, updated_at";

impl WorkoutRow {
    pub fn into_day(self) -> WorkoutDay {
        let mut day = WorkoutDay {
            id: self.id.to_string(),
            name: self.name,
            day_index: self.day_index.clamp(0, 6) as u8,
            exercises: self.exercises.0,
            updated_at: self.updated_at,
        };
        day.normalize();
        day
    }

    pub async fn list(user_id: Uuid, pool: &PgPool) -> Result<Vec<WorkoutDay>, sqlx::Error> {
        let rows: Vec<WorkoutRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM workouts WHERE user_id = $1 ORDER BY day_index, name"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(WorkoutRow::into_day).collect())
    }

    pub async fn find(
        user_id: Uuid,
        id: Uuid,
        pool: &PgPool,
    ) -> Result<Option<WorkoutDay>, sqlx::Error> {
        let row: Option<WorkoutRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM workouts WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(WorkoutRow::into_day))
    }

    /// Lock a day for a read-modify-write inside `tx`.
    pub async fn find_for_update(
        user_id: Uuid,
        id: Uuid,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Option<WorkoutDay>, sqlx::Error> {
        let row: Option<WorkoutRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM workouts WHERE user_id = $1 AND id = $2 FOR UPDATE"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(WorkoutRow::into_day))
    }

    /// Insert or replace a day owned by `user_id`.
    pub async fn upsert(
        user_id: Uuid,
        day: &WorkoutDay,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(), ApiError> {
        let id = parse_id(&day.id)?;
        let result = sqlx::query(
            "INSERT INTO workouts (id, user_id, name, day_index, exercises, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                name = $3,
                day_index = $4,
                exercises = $5,
                updated_at = $6
             WHERE workouts.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(&day.name)
        .bind(i16::from(day.day_index))
        .bind(Json(&day.exercises))
        .bind(day.updated_at)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Conflict(format!("Workout {} belongs to another user", day.id)));
        }
        Ok(())
    }

    pub async fn delete(user_id: Uuid, id: Uuid, pool: &PgPool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workouts WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Load a day, apply `edit`, stamp it and write it back in one transaction.
pub async fn modify_workout<T>(
    user_id: Uuid,
    workout_id: &str,
    pool: &PgPool,
    edit: impl FnOnce(&mut WorkoutDay, i64) -> Result<T, StoreError>,
) -> Result<(T, WorkoutDay), ApiError> {
    let id = parse_id(workout_id)?;
    let mut tx = pool.begin().await?;
    let mut day = WorkoutRow::find_for_update(user_id, id, &mut tx)
        .await?
        .ok_or(ApiError::NotFound("Workout"))?;

    let now = store::clock::now_millis().max(day.updated_at + 1);
    let out = edit(&mut day, now)?;
    WorkoutRow::upsert(user_id, &day, &mut tx).await?;
    tx.commit().await?;
    Ok((out, day))
}

pub fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::Validation(format!("Invalid id {id:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_day_normalizes() {
        let mut exercise = Exercise::new("Squat", 1).unwrap();
        exercise.sets.clear();
        let row = WorkoutRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Legs".into(),
            day_index: 3,
            exercises: Json(vec![exercise]),
            updated_at: 5,
        };
        let id = row.id.to_string();
        let day = row.into_day();
        assert_eq!(day.id, id);
        assert_eq!(day.day_index, 3);
        assert_eq!(day.exercises[0].sets.len(), 1);
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
