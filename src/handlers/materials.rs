use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    services::materials::{CreateMaterialCommand, LowStockItem, UpdateMaterialCommand},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MaterialListQuery {
    pub category_id: Option<Uuid>,
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
}

pub fn materials_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_materials).post(create_material))
        .route("/low-stock", get(low_stock))
        .route(
            "/:id",
            get(get_material).put(update_material).delete(delete_material),
        )
}

/// Register a new material
#[utoipa::path(
    post,
    path = "/api/v1/materials",
    request_body = CreateMaterialCommand,
    responses(
        (status = 201, description = "Material created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category or machine not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn create_material(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Json(command): Json<CreateMaterialCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    current.require_admin()?;
    let material = state
        .services
        .materials
        .create(command, current.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(material)))
}

/// List materials, optionally per category
#[utoipa::path(
    get,
    path = "/api/v1/materials",
    params(MaterialListQuery),
    responses((status = 200, description = "Materials returned")),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn list_materials(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
    Query(query): Query<MaterialListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .materials
        .list(query.category_id, query.page, query.limit)
        .await?;
    Ok(Json(json!({
        "materials": items,
        "total": total,
        "page": query.page,
        "limit": query.limit,
    })))
}

/// Materials at or below their minimum quantity
#[utoipa::path(
    get,
    path = "/api/v1/materials/low-stock",
    responses((status = 200, description = "Low-stock materials", body = [LowStockItem])),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn low_stock(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
) -> Result<Json<Vec<LowStockItem>>, ServiceError> {
    let items = state.services.materials.low_stock().await?;
    Ok(Json(items))
}

/// Fetch one material
#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material returned"),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn get_material(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let material = state.services.materials.get(id).await?;
    Ok(Json(material))
}

/// Update a material's descriptive fields
#[utoipa::path(
    put,
    path = "/api/v1/materials/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    request_body = UpdateMaterialCommand,
    responses(
        (status = 200, description = "Material updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn update_material(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(command): Json<UpdateMaterialCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    current.require_admin()?;
    let material = state.services.materials.update(id, command).await?;
    Ok(Json(material))
}

/// Delete a material and its stock record; history is retained
#[utoipa::path(
    delete,
    path = "/api/v1/materials/{id}",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 204, description = "Material deleted"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn delete_material(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    current.require_admin()?;
    state.services.materials.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
