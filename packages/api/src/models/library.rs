//! Custom exercise names, merged with the built-in list on read.

use sqlx::{FromRow, PgPool};
use store::models::{validate_name, ExerciseName, BUILTIN_EXERCISES};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, FromRow)]
pub struct ExerciseNameRow {
    pub id: Uuid,
    pub name: String,
}

impl ExerciseNameRow {
    pub async fn list(user_id: Uuid, pool: &PgPool) -> Result<Vec<ExerciseNameRow>, sqlx::Error> {
        sqlx::query_as("SELECT id, name FROM exercise_names WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a custom name; adding an existing name returns the stored row.
    pub async fn add(user_id: Uuid, name: &str, pool: &PgPool) -> Result<ExerciseNameRow, ApiError> {
        let name = validate_name(name)?;
        let inserted: Option<ExerciseNameRow> = sqlx::query_as(
            "INSERT INTO exercise_names (user_id, name) VALUES ($1, $2)
             ON CONFLICT (user_id, LOWER(name)) DO NOTHING
             RETURNING id, name",
        )
        .bind(user_id)
        .bind(&name)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row);
        }
        let existing: ExerciseNameRow = sqlx::query_as(
            "SELECT id, name FROM exercise_names WHERE user_id = $1 AND LOWER(name) = LOWER($2)",
        )
        .bind(user_id)
        .bind(&name)
        .fetch_one(pool)
        .await?;
        Ok(existing)
    }

    pub async fn delete(user_id: Uuid, id: Uuid, pool: &PgPool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exercise_names WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub fn to_name(&self) -> ExerciseName {
        ExerciseName {
            id: self.id.to_string(),
            name: self.name.clone(),
            custom: true,
        }
    }
}

/// Built-in names plus `custom`, deduplicated case-insensitively and sorted by name.
///
/// A custom entry shadowing a built-in name wins so it stays deletable.
pub fn merge_library(custom: &[ExerciseNameRow]) -> Vec<ExerciseName> {
    let mut names: Vec<ExerciseName> = custom.iter().map(ExerciseNameRow::to_name).collect();
    for builtin in BUILTIN_EXERCISES {
        if !names.iter().any(|n| n.name.eq_ignore_ascii_case(builtin)) {
            names.push(ExerciseName {
                id: format!("builtin:{}", builtin.to_lowercase().replace(' ', "-")),
                name: builtin.to_string(),
                custom: false,
            });
        }
    }
    names.sort_by_key(|n| n.name.to_lowercase());
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_library_dedupes_and_sorts() {
        let custom = vec![
            ExerciseNameRow {
                id: Uuid::new_v4(),
                name: "squat".into(),
            },
            ExerciseNameRow {
                id: Uuid::new_v4(),
                name: "Arnold Press".into(),
            },
        ];
        let names = merge_library(&custom);

        assert_eq!(names.len(), BUILTIN_EXERCISES.len() + 1);
        assert_eq!(names[0].name, "Arnold Press");
        let squats: Vec<_> = names
            .iter()
            .filter(|n| n.name.eq_ignore_ascii_case("squat"))
            .collect();
        assert_eq!(squats.len(), 1);
        assert!(squats[0].custom);
        assert!(names.windows(2).all(|w| w[0].name.to_lowercase() <= w[1].name.to_lowercase()));
    }
}
