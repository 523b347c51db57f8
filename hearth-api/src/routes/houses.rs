/// House endpoints
///
/// # Endpoints
///
/// - `GET /v1/houses` - Browse every house (public)
/// - `GET /v1/houses/:house_id/members` - Member usernames (public)
/// - `POST /v1/houses` - Create a house, the caller becomes its first member
/// - `GET /v1/houses/:house_id` - House page: members and tasks (members only)
/// - `POST /v1/houses/:house_id/join` - Join
/// - `POST /v1/houses/:house_id/leave` - Leave; the last member out deletes the house
/// - `GET /v1/houses/:house_id/last-member` - Whether one member is left

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::tasks::TaskView,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use hearth_shared::{
    auth::{authorization::require_membership, middleware::AuthContext},
    models::{
        house::{validate_house_name, House},
        membership::{HouseMember, LeaveOutcome, Membership},
        task::Task,
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Create house request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHouseRequest {
    /// Submitted name; normalized before it is checked and stored
    #[validate(length(min = 1, max = 255, message = "House name must be 1-255 characters"))]
    pub house_name: String,
}

/// Member names response
#[derive(Debug, Serialize, Deserialize)]
pub struct MembersResponse {
    /// Usernames in join order; empty when the house has no members
    pub members: Vec<String>,
}

/// House page response
#[derive(Debug, Serialize, Deserialize)]
pub struct HousePageResponse {
    pub house_id: Uuid,
    pub house_name: String,
    pub members: Vec<HouseMember>,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LastMemberResponse {
    pub is_last_member: bool,
}

/// Lists every house by name
pub async fn list_houses(State(state): State<AppState>) -> ApiResult<Json<Vec<House>>> {
    let houses = House::list(&state.db).await?;
    Ok(Json(houses))
}

/// Lists the usernames of a house's members
///
/// An unknown house and a house without members both answer with an empty
/// list.
pub async fn house_members(
    State(state): State<AppState>,
    Path(house_id): Path<Uuid>,
) -> ApiResult<Json<MembersResponse>> {
    let members = Membership::member_names(&state.db, house_id).await?;
    Ok(Json(MembersResponse { members }))
}

/// Creates a house with the caller as its first member
///
/// # Errors
///
/// - `409 Conflict`: A house with the normalized name exists
/// - `422 Unprocessable Entity`: The name is blank or too long
pub async fn create_house(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateHouseRequest>,
) -> ApiResult<(StatusCode, Json<House>)> {
    req.validate()?;
    let house_name = validate_house_name(&req.house_name)?;

    if House::find_by_name(&state.db, &house_name).await?.is_some() {
        return Err(ApiError::Conflict("House name already taken".to_string()));
    }

    // A concurrent create with the same name still fails on the unique
    // constraint and maps to 409
    let house = House::create(&state.db, &house_name, auth.user_id).await?;

    Ok((StatusCode::CREATED, Json(house)))
}

/// House page: name, members and tasks
pub async fn house_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(house_id): Path<Uuid>,
) -> ApiResult<Json<HousePageResponse>> {
    require_membership(&state.db, house_id, auth.user_id).await?;

    let house = House::find_by_id(&state.db, house_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("House not found".to_string()))?;

    let members = Membership::list_members(&state.db, house_id).await?;
    let tasks = Task::list_by_house(&state.db, house_id)
        .await?
        .into_iter()
        .map(TaskView::from)
        .collect();

    Ok(Json(HousePageResponse {
        house_id: house.house_id,
        house_name: house.house_name,
        members,
        tasks,
    }))
}

/// Adds the caller to a house
///
/// # Errors
///
/// - `404 Not Found`: No such house
/// - `409 Conflict`: Already a member
pub async fn join_house(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(house_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Membership>)> {
    if House::find_by_id(&state.db, house_id).await?.is_none() {
        return Err(ApiError::NotFound("House not found".to_string()));
    }

    if Membership::has_access(&state.db, house_id, auth.user_id).await? {
        return Err(ApiError::Conflict(
            "Already a member of this house".to_string(),
        ));
    }

    let membership = Membership::add(&state.db, auth.user_id, house_id).await?;

    Ok((StatusCode::CREATED, Json(membership)))
}

/// Removes the caller from a house
///
/// When the caller was the last member the house is deleted together with
/// its tasks and restrictions; the response says so.
///
/// # Errors
///
/// - `404 Not Found`: The caller is not a member (or the house is gone)
pub async fn leave_house(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(house_id): Path<Uuid>,
) -> ApiResult<Json<LeaveOutcome>> {
    let outcome = Membership::leave(&state.db, auth.user_id, house_id).await?;

    if !outcome.membership_removed {
        return Err(ApiError::NotFound(
            "Not a member of this house".to_string(),
        ));
    }

    if outcome.house_deleted {
        info!(house_id = %house_id, user_id = %auth.user_id, "House closed by its last member");
    }

    Ok(Json(outcome))
}

/// Whether exactly one member is left
pub async fn last_member(
    State(state): State<AppState>,
    Path(house_id): Path<Uuid>,
) -> ApiResult<Json<LastMemberResponse>> {
    let is_last_member = Membership::is_last_member(&state.db, house_id).await?;
    Ok(Json(LastMemberResponse { is_last_member }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_house_request_validation() {
        let req: CreateHouseRequest = serde_json::from_str(r#"{"house_name": ""}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateHouseRequest =
            serde_json::from_str(r#"{"house_name": "  Maple   St "}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(validate_house_name(&req.house_name).unwrap(), "Maple St");
    }

    #[test]
    fn test_members_response_shape() {
        let json = serde_json::to_value(MembersResponse { members: vec![] }).unwrap();
        assert_eq!(json, serde_json::json!({ "members": [] }));
    }
}
