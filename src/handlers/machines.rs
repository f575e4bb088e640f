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
pub struct MachineRequest {
    pub name: String,
}

pub fn machines_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_machines).post(create_machine))
        .route("/:id", axum::routing::put(rename_machine).delete(delete_machine))
}

/// Register a new machine
#[utoipa::path(
    post,
    path = "/api/v1/machines",
    request_body = MachineRequest,
    responses(
        (status = 201, description = "Machine created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "machines"
)]
pub async fn create_machine(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Json(request): Json<MachineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    current.require_admin()?;
    let machine = state
        .services
        .machines
        .create(&request.name, current.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

/// List machines
#[utoipa::path(
    get,
    path = "/api/v1/machines",
    responses((status = 200, description = "Machines returned")),
    security(("bearer_auth" = [])),
    tag = "machines"
)]
pub async fn list_machines(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let machines = state.services.machines.list().await?;
    Ok(Json(machines))
}

/// Rename a machine
#[utoipa::path(
    put,
    path = "/api/v1/machines/{id}",
    params(("id" = Uuid, Path, description = "Machine id")),
    request_body = MachineRequest,
    responses(
        (status = 200, description = "Machine renamed"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Machine not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "machines"
)]
pub async fn rename_machine(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<MachineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    current.require_admin()?;
    let machine = state.services.machines.rename(id, &request.name).await?;
    Ok(Json(machine))
}

/// Delete an unused machine
#[utoipa::path(
    delete,
    path = "/api/v1/machines/{id}",
    params(("id" = Uuid, Path, description = "Machine id")),
    responses(
        (status = 204, description = "Machine deleted"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Machine not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Machine still referenced", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "machines"
)]
pub async fn delete_machine(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    current.require_admin()?;
    state.services.machines.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
