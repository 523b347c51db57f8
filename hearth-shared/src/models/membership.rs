/// Membership model and database operations
///
/// A membership is a row in the `user_houses` join table: user U belongs to
/// house H. It has no identity of its own.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_houses (
///     user_id UUID NOT NULL REFERENCES users(id),
///     house_id UUID NOT NULL REFERENCES houses(house_id),
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, house_id)
/// );
/// ```
///
/// # Last member
///
/// A house with no members must not exist. [`Membership::leave`] removes the
/// caller's row and, when nobody is left, deletes the house's tasks, its
/// restrictions and the house itself in the same transaction. The house row is
/// locked with `SELECT ... FOR UPDATE` first, so two members leaving at once
/// are serialized and exactly one of them performs the cleanup.
///
/// # Example
///
/// ```no_run
/// use hearth_shared::models::membership::Membership;
/// use hearth_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid, house_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// Membership::add(&pool, user_id, house_id).await?;
///
/// let outcome = Membership::leave(&pool, user_id, house_id).await?;
/// if outcome.house_deleted {
///     println!("House removed with its last member");
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{house::House, restriction::Restriction, task::Task};

/// A user's membership in a house
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Member
    pub user_id: Uuid,

    /// House
    pub house_id: Uuid,

    /// When the user joined (or created) the house
    pub joined_at: DateTime<Utc>,
}

/// A member of a house as shown to other members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HouseMember {
    /// User ID
    pub user_id: Uuid,

    /// Username
    pub username: String,
}

/// What [`Membership::leave`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveOutcome {
    /// The caller's membership row existed and was deleted
    pub membership_removed: bool,

    /// The house had no members left and was deleted with its tasks and
    /// restrictions
    pub house_deleted: bool,
}

impl Membership {
    /// Adds a user to a house (join)
    ///
    /// # Errors
    ///
    /// Returns an error if the user is already a member (primary key
    /// violation), the user or house doesn't exist (foreign key violation),
    /// or the database connection fails.
    pub async fn add(pool: &PgPool, user_id: Uuid, house_id: Uuid) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO user_houses (user_id, house_id)
            VALUES ($1, $2)
            RETURNING user_id, house_id, joined_at
            "#,
        )
        .bind(user_id)
        .bind(house_id)
        .fetch_one(pool)
        .await?;

        info!(user_id = %user_id, house_id = %house_id, "User joined house");

        Ok(membership)
    }

    /// Deletes the membership row without any last-member cleanup
    ///
    /// Prefer [`Membership::leave`] for a user leaving a house; this is the
    /// raw join-table delete.
    ///
    /// # Returns
    ///
    /// True if the membership existed
    pub async fn remove(pool: &PgPool, user_id: Uuid, house_id: Uuid) -> Result<bool, sqlx::Error> {
        Self::delete(pool, user_id, house_id).await
    }

    async fn delete<'e, E>(executor: E, user_id: Uuid, house_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM user_houses WHERE user_id = $1 AND house_id = $2")
            .bind(user_id)
            .bind(house_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a user from a house, deleting the house when it empties
    ///
    /// Runs as one transaction:
    ///
    /// 1. lock the house row (`FOR UPDATE`)
    /// 2. delete the caller's membership
    /// 3. if no memberships remain, delete the house's tasks, then its
    ///    restrictions, then the house row
    ///
    /// If anything fails the transaction is rolled back on drop and no partial
    /// state is visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or a statement is
    /// rejected.
    pub async fn leave(pool: &PgPool, user_id: Uuid, house_id: Uuid) -> Result<LeaveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT house_id FROM houses WHERE house_id = $1 FOR UPDATE")
                .bind(house_id)
                .fetch_optional(&mut *tx)
                .await?;

        let membership_removed = Self::delete(&mut *tx, user_id, house_id).await?;

        if locked.is_none() {
            debug!(house_id = %house_id, "House already gone, nothing to clean up");
            tx.commit().await?;
            return Ok(LeaveOutcome {
                membership_removed,
                house_deleted: false,
            });
        }

        let remaining = Self::count_by_house(&mut *tx, house_id).await?;

        let house_deleted = if remaining == 0 {
            let tasks = Task::delete_by_house(&mut *tx, house_id).await?;
            let restrictions = Restriction::delete_by_house(&mut *tx, house_id).await?;
            let deleted = House::delete(&mut *tx, house_id).await?;

            info!(
                house_id = %house_id,
                tasks_deleted = tasks,
                restrictions_deleted = restrictions,
                "Last member left, house deleted"
            );

            deleted
        } else {
            false
        };

        tx.commit().await?;

        info!(
            user_id = %user_id,
            house_id = %house_id,
            membership_removed,
            remaining_members = remaining,
            "User left house"
        );

        Ok(LeaveOutcome {
            membership_removed,
            house_deleted,
        })
    }

    /// Checks if a user is a member of a house
    pub async fn has_access(pool: &PgPool, house_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_houses
                WHERE house_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(house_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Counts the members of a house
    pub async fn count_by_house<'e, E>(executor: E, house_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_houses WHERE house_id = $1")
            .bind(house_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    /// True when exactly one member is left in the house
    ///
    /// Informational only (e.g. to warn before leaving). The actual cleanup
    /// decision is made inside [`Membership::leave`].
    pub async fn is_last_member(pool: &PgPool, house_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(Self::count_by_house(pool, house_id).await? == 1)
    }

    /// Usernames of the house's members, in join order
    ///
    /// Empty when the house has no members or doesn't exist.
    pub async fn member_names(pool: &PgPool, house_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT u.username
            FROM users u
            JOIN user_houses uh ON u.id = uh.user_id
            WHERE uh.house_id = $1
            ORDER BY uh.joined_at ASC
            "#,
        )
        .bind(house_id)
        .fetch_all(pool)
        .await?;

        Ok(names)
    }

    /// Members of the house with their ids, in join order
    pub async fn list_members(pool: &PgPool, house_id: Uuid) -> Result<Vec<HouseMember>, sqlx::Error> {
        let members = sqlx::query_as::<_, HouseMember>(
            r#"
            SELECT u.id AS user_id, u.username
            FROM users u
            JOIN user_houses uh ON u.id = uh.user_id
            WHERE uh.house_id = $1
            ORDER BY uh.joined_at ASC
            "#,
        )
        .bind(house_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_outcome_serializes() {
        let outcome = LeaveOutcome {
            membership_removed: true,
            house_deleted: false,
        };

        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["membership_removed"], true);
        assert_eq!(json["house_deleted"], false);
    }

    // Integration tests for database operations are in tests/models_tests.rs
}
