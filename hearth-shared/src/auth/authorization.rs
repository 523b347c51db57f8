/// Membership checks for house-scoped resources
///
/// Every house route is visible only to the house's members. A task id in a
/// URL must also belong to the house named next to it.
///
/// # Example
///
/// ```no_run
/// use hearth_shared::auth::authorization::{require_membership, AuthzError};
/// use hearth_shared::auth::middleware::AuthContext;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn check(pool: &PgPool, auth: &AuthContext, house_id: Uuid) -> Result<(), AuthzError> {
///     require_membership(pool, house_id, auth.user_id).await
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{membership::Membership, task::Task};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is not a member of the house
    #[error("Not a member of house {0}")]
    NotMember(Uuid),

    /// The task exists but belongs to another house
    #[error("Task {task_id} does not belong to house {house_id}")]
    TaskNotInHouse { task_id: Uuid, house_id: Uuid },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that a user is a member of a house
///
/// # Errors
///
/// Returns `AuthzError::NotMember` if the user is not a member
pub async fn require_membership(
    pool: &PgPool,
    house_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    let has_access = Membership::has_access(pool, house_id, user_id).await?;

    if !has_access {
        return Err(AuthzError::NotMember(house_id));
    }

    Ok(())
}

/// Loads a task and checks it belongs to the house
///
/// # Returns
///
/// `Ok(None)` if the task doesn't exist
///
/// # Errors
///
/// Returns `AuthzError::TaskNotInHouse` for a task of another house
pub async fn require_task_in_house(
    pool: &PgPool,
    house_id: Uuid,
    task_id: Uuid,
) -> Result<Option<Task>, AuthzError> {
    let Some(task) = Task::find_by_id(pool, task_id).await? else {
        return Ok(None);
    };

    check_task_house(&task, house_id)?;

    Ok(Some(task))
}

fn check_task_house(task: &Task, house_id: Uuid) -> Result<(), AuthzError> {
    if task.house_id != house_id {
        return Err(AuthzError::TaskNotInHouse {
            task_id: task.task_id,
            house_id,
        });
    }

    Ok(())
}
