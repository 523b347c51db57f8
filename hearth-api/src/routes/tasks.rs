/// Task endpoints
///
/// All of them are limited to members of the house in the path.
///
/// # Endpoints
///
/// - `GET /v1/houses/:house_id/tasks` - Task picker entries
/// - `POST /v1/houses/:house_id/tasks` - Assign a task
/// - `PUT /v1/houses/:house_id/tasks/:task_id` - Edit a task
/// - `DELETE /v1/houses/:house_id/tasks/:task_id` - Delete a task
/// - `GET /v1/houses/:house_id/events` - Calendar feed
///
/// Due dates travel in the browser's `datetime-local` format,
/// e.g. `2024-03-05T19:30`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Duration, NaiveDateTime};
use hearth_shared::{
    auth::{
        authorization::{require_membership, require_task_in_house},
        middleware::AuthContext,
    },
    models::{
        membership::Membership,
        task::{parse_due_date, round_to_day, AssignedTask, CreateTask, Task, UpdateTask},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body for assigning or editing a task
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    /// What has to be done
    #[validate(length(min = 1, max = 255, message = "Task name must be 1-255 characters"))]
    pub task_name: String,

    /// Member the task is assigned to
    pub assignee_id: Uuid,

    /// `YYYY-MM-DDTHH:MM`
    pub due_date: String,
}

/// Task as shown on the house page
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskView {
    pub task_id: Uuid,
    pub task_name: String,
    pub assignee_id: Uuid,
    pub due_date: NaiveDateTime,
    pub label: String,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        let label = task.due_label();
        Self {
            task_id: task.task_id,
            task_name: task.task_name,
            assignee_id: task.user_id,
            due_date: task.due_date,
            label,
        }
    }
}

/// Task picker entry
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskOption {
    pub task_id: Uuid,
    pub label: String,
}

/// Calendar event
#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub task_id: Uuid,
    pub title: String,
    pub assignee: String,
    pub start: NaiveDateTime,

    /// One hour after `start`
    pub end: NaiveDateTime,

    /// `start` rounded to a day boundary, for all-day views
    pub end_day: NaiveDateTime,
}

impl From<AssignedTask> for CalendarEvent {
    fn from(task: AssignedTask) -> Self {
        Self {
            task_id: task.task_id,
            title: task.task_name,
            assignee: task.assignee,
            start: task.due_date,
            end: task.due_date + Duration::hours(1),
            end_day: round_to_day(task.due_date),
        }
    }
}

/// Checks a task body and resolves its due date
///
/// The assignee has to be a member of the house.
async fn validated_task(
    state: &AppState,
    house_id: Uuid,
    req: &TaskRequest,
) -> ApiResult<NaiveDateTime> {
    req.validate()?;

    let due_date = parse_due_date(req.due_date.trim()).map_err(|_| {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(
            "due_date",
            "Due date must look like 2024-03-05T19:30",
        )])
    })?;

    if !Membership::has_access(&state.db, house_id, req.assignee_id).await? {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail::new(
            "assignee_id",
            "Assignee must be a member of this house",
        )]));
    }

    Ok(due_date)
}

/// Lists the house's tasks as `{task_id, label}` picker entries
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(house_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskOption>>> {
    require_membership(&state.db, house_id, auth.user_id).await?;

    let options = Task::list_by_house(&state.db, house_id)
        .await?
        .into_iter()
        .map(|task| TaskOption {
            label: task.due_label(),
            task_id: task.task_id,
        })
        .collect();

    Ok(Json(options))
}

/// Assigns a task to a member
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member
/// - `422 Unprocessable Entity`: Bad name, unparseable due date or an
///   assignee outside the house
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(house_id): Path<Uuid>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    require_membership(&state.db, house_id, auth.user_id).await?;
    let due_date = validated_task(&state, house_id, &req).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            task_name: req.task_name.trim().to_string(),
            user_id: req.assignee_id,
            house_id,
            due_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(TaskView::from(task))))
}

/// Replaces a task's name, assignee and due date
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((house_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<TaskView>> {
    require_membership(&state.db, house_id, auth.user_id).await?;

    if require_task_in_house(&state.db, house_id, task_id).await?.is_none() {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    let due_date = validated_task(&state, house_id, &req).await?;

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            task_name: req.task_name.trim().to_string(),
            user_id: req.assignee_id,
            due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskView::from(task)))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((house_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_membership(&state.db, house_id, auth.user_id).await?;

    if require_task_in_house(&state.db, house_id, task_id).await?.is_none() {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    if !Task::delete_by_id(&state.db, task_id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Calendar feed: one event per task, named after its assignee
pub async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(house_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    require_membership(&state.db, house_id, auth.user_id).await?;

    let events = Task::list_assigned_by_house(&state.db, house_id)
        .await?
        .into_iter()
        .map(CalendarEvent::from)
        .collect();

    Ok(Json(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_calendar_event_from_assigned_task() {
        let event = CalendarEvent::from(AssignedTask {
            task_id: Uuid::new_v4(),
            task_name: "Trash".to_string(),
            user_id: Uuid::new_v4(),
            assignee: "alice".to_string(),
            due_date: at(19, 30),
        });

        assert_eq!(event.title, "Trash");
        assert_eq!(event.assignee, "alice");
        assert_eq!(event.end, at(20, 30));
        assert_eq!(event.end_day, at(0, 0) + Duration::days(1));
    }

    #[test]
    fn test_morning_event_ends_same_day() {
        let event = CalendarEvent::from(AssignedTask {
            task_id: Uuid::new_v4(),
            task_name: "Dishes".to_string(),
            user_id: Uuid::new_v4(),
            assignee: "bob".to_string(),
            due_date: at(9, 0),
        });

        assert_eq!(event.end_day, at(0, 0));
    }

    #[test]
    fn test_task_view_label() {
        let task = Task {
            task_id: Uuid::new_v4(),
            task_name: "Trash".to_string(),
            user_id: Uuid::new_v4(),
            house_id: Uuid::new_v4(),
            added_timestamp: chrono::Utc::now(),
            due_date: at(19, 30),
        };

        let view = TaskView::from(task);
        assert_eq!(view.label, "Trash due 03/05, 7:30PM");
    }

    #[test]
    fn test_task_request_validation() {
        let req: TaskRequest = serde_json::from_value(serde_json::json!({
            "task_name": "",
            "assignee_id": Uuid::new_v4(),
            "due_date": "2024-03-05T19:30",
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }
}
