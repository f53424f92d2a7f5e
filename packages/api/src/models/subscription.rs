//! Browser push subscriptions, one row per endpoint.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct PushSubscriptionRow {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

impl PushSubscriptionRow {
    pub async fn for_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<PushSubscriptionRow>, sqlx::Error> {
        sqlx::query_as("SELECT endpoint, p256dh, auth FROM push_subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Store a subscription; an endpoint re-subscribed by another user moves to them.
    pub async fn upsert(&self, user_id: Uuid, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (endpoint) DO UPDATE SET
                user_id = $1,
                p256dh = $3,
                auth = $4",
        )
        .bind(user_id)
        .bind(&self.endpoint)
        .bind(&self.p256dh)
        .bind(&self.auth)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(user_id: Uuid, endpoint: &str, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
            .bind(user_id)
            .bind(endpoint)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Drop an endpoint the push service reported as gone.
    pub async fn delete_endpoint(endpoint: &str, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM push_subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(pool)
            .await?;
        Ok(())
    }
}
