/// House model and database operations
///
/// A house is a named group of users sharing chores and restrictions. Houses
/// are created together with the creator's membership and disappear when the
/// last member leaves (see [`Membership::leave`](crate::models::membership::Membership::leave)).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE houses (
///     house_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     house_name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT houses_house_name_key UNIQUE (house_name)
/// );
/// ```
///
/// # Naming
///
/// Names are stored in normalized form: surrounding whitespace trimmed and
/// every run of inner spaces collapsed to one. Lookups by name must pass the
/// normalized form as well.
///
/// ```
/// use hearth_shared::models::house::normalize_house_name;
///
/// assert_eq!(normalize_house_name("  Smith   House  "), "Smith House");
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

/// Longest accepted house name, in characters, after normalization
pub const MAX_HOUSE_NAME_CHARS: usize = 20;

/// House row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct House {
    /// Surrogate key
    pub house_id: Uuid,

    /// Normalized display name
    pub house_name: String,

    /// When the house was created
    pub created_at: DateTime<Utc>,
}

/// Why a submitted house name was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HouseNameError {
    #[error("House name must not be blank")]
    Blank,

    #[error("House name must be at most {} characters", MAX_HOUSE_NAME_CHARS)]
    TooLong,
}

/// Trims surrounding whitespace and collapses runs of inner spaces
///
/// Only the space character is collapsed; tabs and other characters inside
/// the name are kept as they are.
pub fn normalize_house_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut previous_was_space = false;

    for c in name.trim().chars() {
        if c == ' ' {
            if !previous_was_space {
                normalized.push(c);
            }
            previous_was_space = true;
        } else {
            normalized.push(c);
            previous_was_space = false;
        }
    }

    normalized
}

/// Normalizes a submitted name and checks it is usable
///
/// # Errors
///
/// [`HouseNameError::Blank`] when nothing but whitespace was submitted,
/// [`HouseNameError::TooLong`] past [`MAX_HOUSE_NAME_CHARS`].
pub fn validate_house_name(name: &str) -> Result<String, HouseNameError> {
    let normalized = normalize_house_name(name);

    if normalized.is_empty() {
        return Err(HouseNameError::Blank);
    }

    if normalized.chars().count() > MAX_HOUSE_NAME_CHARS {
        return Err(HouseNameError::TooLong);
    }

    Ok(normalized)
}

impl House {
    /// Creates a house and makes `creator_id` its first member
    ///
    /// The name is normalized before insert. Both rows are written in one
    /// transaction, so a failed membership insert leaves no empty house behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized name is taken (unique constraint
    /// violation), the creator doesn't exist (foreign key violation), or the
    /// database connection fails.
    pub async fn create(pool: &PgPool, house_name: &str, creator_id: Uuid) -> Result<Self, sqlx::Error> {
        let house_name = normalize_house_name(house_name);
        let mut tx = pool.begin().await?;

        let house = sqlx::query_as::<_, House>(
            r#"
            INSERT INTO houses (house_name)
            VALUES ($1)
            RETURNING house_id, house_name, created_at
            "#,
        )
        .bind(&house_name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_houses (user_id, house_id) VALUES ($1, $2)")
            .bind(creator_id)
            .bind(house.house_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            house_id = %house.house_id,
            house_name = %house.house_name,
            creator_id = %creator_id,
            "Created house"
        );

        Ok(house)
    }

    /// Finds a house by its exact (already normalized) name
    pub async fn find_by_name(pool: &PgPool, house_name: &str) -> Result<Option<Self>, sqlx::Error> {
        let house = sqlx::query_as::<_, House>(
            r#"
            SELECT house_id, house_name, created_at
            FROM houses
            WHERE house_name = $1
            "#,
        )
        .bind(house_name)
        .fetch_optional(pool)
        .await?;

        Ok(house)
    }

    /// Finds a house by id
    pub async fn find_by_id(pool: &PgPool, house_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let house = sqlx::query_as::<_, House>(
            r#"
            SELECT house_id, house_name, created_at
            FROM houses
            WHERE house_id = $1
            "#,
        )
        .bind(house_id)
        .fetch_optional(pool)
        .await?;

        Ok(house)
    }

    /// Lists every house, by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let houses = sqlx::query_as::<_, House>(
            r#"
            SELECT house_id, house_name, created_at
            FROM houses
            ORDER BY house_name ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(houses)
    }

    /// Lists the houses `user_id` is not a member of
    pub async fn list_joinable(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let houses = sqlx::query_as::<_, House>(
            r#"
            SELECT h.house_id, h.house_name, h.created_at
            FROM houses h
            WHERE NOT EXISTS (
                SELECT 1 FROM user_houses uh
                WHERE uh.house_id = h.house_id AND uh.user_id = $1
            )
            ORDER BY h.house_name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(houses)
    }

    /// Lists the houses `user_id` belongs to, oldest membership first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let houses = sqlx::query_as::<_, House>(
            r#"
            SELECT h.house_id, h.house_name, h.created_at
            FROM user_houses uh
            JOIN houses h USING (house_id)
            WHERE uh.user_id = $1
            ORDER BY uh.joined_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(houses)
    }

    /// Deletes the house row only
    ///
    /// Memberships, tasks and restrictions must be gone already; otherwise the
    /// foreign keys reject the delete and the error is returned.
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete<'e, E>(executor: E, house_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM houses WHERE house_id = $1")
            .bind(house_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_double_space(s: &str) -> bool {
        s.contains("  ")
    }

    #[test]
    fn test_normalize_example() {
        assert_eq!(normalize_house_name("  Smith   House  "), "Smith House");
    }

    #[test]
    fn test_normalize_keeps_other_characters_in_order() {
        assert_eq!(normalize_house_name("Maple St."), "Maple St.");
        assert_eq!(normalize_house_name("a\tb"), "a\tb");
        assert_eq!(normalize_house_name("Café  Ünïcode"), "Café Ünïcode");
    }

    #[test]
    fn test_normalize_trims_all_surrounding_whitespace() {
        assert_eq!(normalize_house_name("\n\t Maple \t\n"), "Maple");
        assert_eq!(normalize_house_name("   "), "");
        assert_eq!(normalize_house_name(""), "");
    }

    #[test]
    fn test_normalize_properties() {
        let samples = [
            "",
            " ",
            "a",
            "  a  b   c  ",
            "x     y",
            " lead",
            "trail ",
            "\t mixed \t  spaces\t",
            "Ω  ≈  ç",
        ];

        for sample in samples {
            let once = normalize_house_name(sample);
            assert!(!has_double_space(&once), "{:?} -> {:?}", sample, once);
            assert!(!once.starts_with(' '), "{:?} -> {:?}", sample, once);
            assert!(!once.ends_with(' '), "{:?} -> {:?}", sample, once);
            assert_eq!(normalize_house_name(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_validate_house_name() {
        assert_eq!(validate_house_name("  Maple   St ").unwrap(), "Maple St");
        assert_eq!(validate_house_name("   "), Err(HouseNameError::Blank));
        assert_eq!(validate_house_name(""), Err(HouseNameError::Blank));
    }

    #[test]
    fn test_validate_house_name_length_counts_normalized_chars() {
        // 20 characters once the inner run collapses
        assert!(validate_house_name("abcdefghi     abcdefghij").is_ok());
        assert_eq!(
            validate_house_name("abcdefghijabcdefghijk"),
            Err(HouseNameError::TooLong)
        );
        // Multi-byte characters count once
        assert!(validate_house_name(&"é".repeat(MAX_HOUSE_NAME_CHARS)).is_ok());
    }

    // Integration tests for database operations are in tests/models_tests.rs
}
