/// Task (chore) model and database operations
///
/// A task is a chore assigned to one member of a house with a due date.
/// Tasks are created by assignment, edited, deleted explicitly, or removed with
/// the house when its last member leaves.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     task_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_name VARCHAR(255) NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id),
///     house_id UUID NOT NULL REFERENCES houses(house_id),
///     added_timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     due_date TIMESTAMP NOT NULL
/// );
/// ```
///
/// Due dates are wall-clock times as entered in the browser and carry no
/// time zone.
///
/// # Example
///
/// ```no_run
/// use hearth_shared::models::task::{parse_due_date, CreateTask, Task};
/// use hearth_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(house_id: Uuid, assignee: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     task_name: "Take out trash".to_string(),
///     user_id: assignee,
///     house_id,
///     due_date: parse_due_date("2024-03-05T19:30")?,
/// }).await?;
///
/// println!("{}", task.due_label());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

/// Format produced by `<input type="datetime-local">`
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

const DUE_DATE_FORMAT_WITH_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Task ID
    pub task_id: Uuid,

    /// What has to be done
    pub task_name: String,

    /// Assignee
    pub user_id: Uuid,

    /// Owning house
    pub house_id: Uuid,

    /// When the task was assigned
    pub added_timestamp: DateTime<Utc>,

    /// When the task is due
    pub due_date: NaiveDateTime,
}

/// Task joined with the assignee's username, for calendar views
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssignedTask {
    pub task_id: Uuid,
    pub task_name: String,
    pub user_id: Uuid,
    pub assignee: String,
    pub due_date: NaiveDateTime,
}

/// Input for assigning a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub task_name: String,
    pub user_id: Uuid,
    pub house_id: Uuid,
    pub due_date: NaiveDateTime,
}

/// Input for editing a task; every field is replaced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub task_name: String,
    pub user_id: Uuid,
    pub due_date: NaiveDateTime,
}

/// Parses a due date from the browser form format
///
/// Accepts `2024-03-05T19:30` and `2024-03-05T19:30:00`.
pub fn parse_due_date(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input, DUE_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, DUE_DATE_FORMAT_WITH_SECONDS))
}

/// Rounds a timestamp to a day boundary
///
/// Anything up to and including 12:00:00.000 rounds down to midnight of the
/// same day; anything later rounds up to the following midnight.
pub fn round_to_day(t: NaiveDateTime) -> NaiveDateTime {
    let midnight = t.date().and_time(NaiveTime::MIN);
    let seconds = t.time().num_seconds_from_midnight();
    let before_or_at_noon = seconds < 12 * 3600 || (seconds == 12 * 3600 && t.nanosecond() == 0);

    if before_or_at_noon {
        midnight
    } else {
        midnight + Duration::days(1)
    }
}

/// Renders a due date like `03/05, 7:30PM`
pub fn format_due_date(due_date: NaiveDateTime) -> String {
    due_date.format("%m/%d, %I:%M%p").to_string().replace(" 0", " ")
}

impl Task {
    /// One-line description used in task pickers: `"{name} due {date}"`
    pub fn due_label(&self) -> String {
        format!("{} due {}", self.task_name, format_due_date(self.due_date))
    }

    /// Assigns a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the assignee or house doesn't exist (foreign key
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (task_name, user_id, house_id, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING task_id, task_name, user_id, house_id, added_timestamp, due_date
            "#,
        )
        .bind(&data.task_name)
        .bind(data.user_id)
        .bind(data.house_id)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        info!(
            task_id = %task.task_id,
            house_id = %task.house_id,
            assignee = %task.user_id,
            "Task assigned"
        );

        Ok(task)
    }

    /// Finds a task by id
    pub async fn find_by_id(pool: &PgPool, task_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT task_id, task_name, user_id, house_id, added_timestamp, due_date
            FROM tasks
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Replaces name, assignee and due date of a task
    ///
    /// # Returns
    ///
    /// The updated task, or None if no task has this id
    pub async fn update(pool: &PgPool, task_id: Uuid, data: UpdateTask) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET task_name = $2, user_id = $3, due_date = $4
            WHERE task_id = $1
            RETURNING task_id, task_name, user_id, house_id, added_timestamp, due_date
            "#,
        )
        .bind(task_id)
        .bind(&data.task_name)
        .bind(data.user_id)
        .bind(data.due_date)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// # Returns
    ///
    /// True if the task existed
    pub async fn delete_by_id(pool: &PgPool, task_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE task_id = $1")
            .bind(task_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All tasks of a house, soonest due first
    pub async fn list_by_house(pool: &PgPool, house_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT task_id, task_name, user_id, house_id, added_timestamp, due_date
            FROM tasks
            WHERE house_id = $1
            ORDER BY due_date ASC
            "#,
        )
        .bind(house_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// All tasks of a house with the assignee's username
    pub async fn list_assigned_by_house(pool: &PgPool, house_id: Uuid) -> Result<Vec<AssignedTask>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, AssignedTask>(
            r#"
            SELECT t.task_id, t.task_name, t.user_id, u.username AS assignee, t.due_date
            FROM tasks t
            JOIN users u ON u.id = t.user_id
            WHERE t.house_id = $1
            ORDER BY t.due_date ASC
            "#,
        )
        .bind(house_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Deletes every task of a house
    ///
    /// # Returns
    ///
    /// Number of deleted tasks
    pub async fn delete_by_house<'e, E>(executor: E, house_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE house_id = $1")
            .bind(house_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes the tasks assigned to one user within one house
    pub async fn delete_by_user_and_house(pool: &PgPool, user_id: Uuid, house_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1 AND house_id = $2")
            .bind(user_id)
            .bind(house_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
