/// Restriction model and database operations
///
/// Free-text dietary and schedule constraints a member records for a house.
/// Each submission of the restrictions form adds a row; rows are removed only
/// together with the house.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE restrictions (
///     house_id UUID NOT NULL REFERENCES houses(house_id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     diet_restrictions TEXT NOT NULL DEFAULT '',
///     schedule_restrictions TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

/// Restriction row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restriction {
    pub house_id: Uuid,
    pub user_id: Uuid,
    pub diet_restrictions: String,
    pub schedule_restrictions: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording restrictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRestriction {
    pub house_id: Uuid,
    pub user_id: Uuid,
    pub diet_restrictions: String,
    pub schedule_restrictions: String,
}

impl Restriction {
    /// Records a member's restrictions for a house
    ///
    /// # Errors
    ///
    /// Returns an error if the house or user doesn't exist (foreign key
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateRestriction) -> Result<Self, sqlx::Error> {
        let restriction = sqlx::query_as::<_, Restriction>(
            r#"
            INSERT INTO restrictions (house_id, user_id, diet_restrictions, schedule_restrictions)
            VALUES ($1, $2, $3, $4)
            RETURNING house_id, user_id, diet_restrictions, schedule_restrictions, created_at
            "#,
        )
        .bind(data.house_id)
        .bind(data.user_id)
        .bind(&data.diet_restrictions)
        .bind(&data.schedule_restrictions)
        .fetch_one(pool)
        .await?;

        info!(house_id = %data.house_id, user_id = %data.user_id, "Restrictions recorded");

        Ok(restriction)
    }

    /// All restrictions recorded for a house, oldest first
    pub async fn list_by_house(pool: &PgPool, house_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let restrictions = sqlx::query_as::<_, Restriction>(
            r#"
            SELECT house_id, user_id, diet_restrictions, schedule_restrictions, created_at
            FROM restrictions
            WHERE house_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(house_id)
        .fetch_all(pool)
        .await?;

        Ok(restrictions)
    }

    /// Deletes every restriction of a house
    ///
    /// # Returns
    ///
    /// Number of deleted rows
    pub async fn delete_by_house<'e, E>(executor: E, house_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM restrictions WHERE house_id = $1")
            .bind(house_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
