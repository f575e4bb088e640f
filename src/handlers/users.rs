use crate::{
    auth::{AuthenticatedUser, UserResponse},
    errors::ServiceError,
    AppState,
};
use axum::{extract::State, routing::get, Json, Router};

pub fn users_router() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

/// List registered accounts (for owner selection and the admin view)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Accounts returned", body = [UserResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
) -> Result<Json<Vec<UserResponse>>, ServiceError> {
    let users = state.services.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
