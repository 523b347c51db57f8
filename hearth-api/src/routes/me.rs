/// The caller's own account
///
/// # Endpoint
///
/// ```text
/// GET /v1/me
/// ```
///
/// Returns the account, the houses the caller belongs to and the houses they
/// could still join. This is what the home page renders after login.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use hearth_shared::{auth::middleware::AuthContext, models::house::House};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account summary
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserSummary,

    /// Houses the caller is a member of, in join order
    pub user_houses: Vec<House>,

    /// Houses the caller is not a member of, by name
    pub houses_to_join: Vec<House>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user_houses = House::list_by_user(&state.db, auth.user_id).await?;
    let houses_to_join = House::list_joinable(&state.db, auth.user_id).await?;

    Ok(Json(MeResponse {
        user: UserSummary {
            user_id: auth.user_id,
            username: auth.username,
            email: auth.email,
        },
        user_houses,
        houses_to_join,
    }))
}
