use crate::{auth::AuthenticatedUser, errors::ServiceError, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
}

pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", axum::routing::put(rename_category).delete(delete_category))
}

/// Register a new category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Json(request): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    current.require_admin()?;
    let category = state
        .services
        .categories
        .create(&request.name, current.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// List categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses((status = 200, description = "Categories returned")),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.categories.list().await?;
    Ok(Json(categories))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category renamed"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn rename_category(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    current.require_admin()?;
    let category = state.services.categories.rename(id, &request.name).await?;
    Ok(Json(category))
}

/// Delete an unused category
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Category still referenced", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    current.require_admin()?;
    state.services.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
