/// Restriction endpoints
///
/// - `GET /v1/houses/:house_id/restrictions` - Everything recorded, with usernames
/// - `POST /v1/houses/:house_id/restrictions` - Record the caller's restrictions

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use hearth_shared::{
    auth::{authorization::require_membership, middleware::AuthContext},
    models::{
        membership::Membership,
        restriction::{CreateRestriction, Restriction},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Record restrictions request
#[derive(Debug, Deserialize, Validate)]
pub struct RestrictionRequest {
    #[serde(default)]
    #[validate(length(max = 2000, message = "Dietary restrictions must be at most 2000 characters"))]
    pub dietary_restrictions: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Schedule restrictions must be at most 2000 characters"))]
    pub schedule_restrictions: String,
}

/// One recorded restriction with its author's name
#[derive(Debug, Serialize, Deserialize)]
pub struct RestrictionView {
    pub user_id: Uuid,
    pub username: String,
    pub dietary_restrictions: String,
    pub schedule_restrictions: String,
    pub created_at: DateTime<Utc>,
}

fn view(restriction: Restriction, username: String) -> RestrictionView {
    RestrictionView {
        user_id: restriction.user_id,
        username,
        dietary_restrictions: restriction.diet_restrictions,
        schedule_restrictions: restriction.schedule_restrictions,
        created_at: restriction.created_at,
    }
}

/// Lists the house's restrictions, oldest first
///
/// Authors who have since left the house are looked up individually.
pub async fn list_restrictions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(house_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RestrictionView>>> {
    require_membership(&state.db, house_id, auth.user_id).await?;

    let mut usernames: HashMap<Uuid, String> = Membership::list_members(&state.db, house_id)
        .await?
        .into_iter()
        .map(|member| (member.user_id, member.username))
        .collect();

    let restrictions = Restriction::list_by_house(&state.db, house_id).await?;
    let mut views = Vec::with_capacity(restrictions.len());

    for restriction in restrictions {
        let username = match usernames.get(&restriction.user_id) {
            Some(name) => name.clone(),
            None => {
                let name = User::find_by_id(&state.db, restriction.user_id)
                    .await?
                    .map(|user| user.username)
                    .unwrap_or_default();
                usernames.insert(restriction.user_id, name.clone());
                name
            }
        };

        views.push(view(restriction, username));
    }

    Ok(Json(views))
}

/// Records the caller's restrictions for the house
pub async fn create_restriction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(house_id): Path<Uuid>,
    Json(req): Json<RestrictionRequest>,
) -> ApiResult<(StatusCode, Json<RestrictionView>)> {
    require_membership(&state.db, house_id, auth.user_id).await?;
    req.validate()?;

    let restriction = Restriction::create(
        &state.db,
        CreateRestriction {
            house_id,
            user_id: auth.user_id,
            diet_restrictions: req.dietary_restrictions.trim().to_string(),
            schedule_restrictions: req.schedule_restrictions.trim().to_string(),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(view(restriction, auth.username))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fields_default_to_empty() {
        let req: RestrictionRequest =
            serde_json::from_str(r#"{"dietary_restrictions": "vegetarian"}"#).unwrap();

        assert_eq!(req.dietary_restrictions, "vegetarian");
        assert_eq!(req.schedule_restrictions, "");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_length_limit() {
        let req = RestrictionRequest {
            dietary_restrictions: "x".repeat(2001),
            schedule_restrictions: String::new(),
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_view_renames_diet_field() {
        let restriction = Restriction {
            house_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            diet_restrictions: "no nuts".to_string(),
            schedule_restrictions: "away weekends".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(view(restriction, "alice".to_string())).unwrap();
        assert_eq!(json["dietary_restrictions"], "no nuts");
        assert_eq!(json["username"], "alice");
    }
}
