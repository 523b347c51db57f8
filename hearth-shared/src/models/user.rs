/// User model and database operations
///
/// Users are created the first time a bearer token with an unknown email is
/// seen and are never deleted by Hearth. A user belongs to any number of houses
/// through the `user_houses` join table (see [`crate::models::membership`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use hearth_shared::models::user::{CreateUser, User};
/// use hearth_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// if User::find_by_email(&pool, "alice@x.com").await?.is_none() {
///     User::create(&pool, CreateUser {
///         username: "alice".to_string(),
///         email: "alice@x.com".to_string(),
///     }).await?;
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Surrogate key
    pub id: Uuid,

    /// Display name (the identity provider's nickname at first login)
    pub username: String,

    /// Natural key used to look the account up after authentication
    pub email: String,

    /// When the account was provisioned
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub username: String,

    /// Email address, unique across all users
    pub email: String,
}

impl User {
    /// Creates a new user account
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already taken (unique constraint
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        info!(username = %data.username, "Adding user account");

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING id, username, email, created_at
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Returns the account for `data.email`, creating it first if needed
    ///
    /// Safe to call concurrently for the same email: the insert is a no-op
    /// when another request provisioned the account first, and an existing
    /// account keeps its username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn provision(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        if let Some(user) = Self::find_by_email(pool, &data.email).await? {
            return Ok(user);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .execute(pool)
        .await?;

        if inserted.rows_affected() > 0 {
            info!(username = %data.username, "Provisioned user account on first login");
        }

        Self::find_by_email(pool, &data.email)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Finds a user by email
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds only the id of the user with this email
    pub async fn find_id_by_email(pool: &PgPool, email: &str) -> Result<Option<Uuid>, sqlx::Error> {
        let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(id)
    }

    /// Finds a user by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
