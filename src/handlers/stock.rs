use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    services::stock_ledger::{AuditReport, StockFilter, StockMutationCommand, StockMutationResult},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Current stock level for one material. Materials without a stock record yet
/// report zero with no owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct StockLevelResponse {
    pub material_id: Uuid,
    pub material_name: String,
    pub quantity: i32,
    pub owner_name: Option<String>,
    pub assigned_date: Option<NaiveDate>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StockListQuery {
    pub category_id: Option<Uuid>,
    /// `YYYY-MM`, filters on assigned date
    pub month: Option<String>,
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
}

pub fn stock_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock))
        .route("/mutations", post(mutate_stock))
        .route("/:material_id", get(get_stock))
        .route("/:material_id/audit", get(audit_stock))
}

/// Apply one stock mutation (the ledger entry point)
#[utoipa::path(
    post,
    path = "/api/v1/stock/mutations",
    request_body = StockMutationCommand,
    responses(
        (status = 201, description = "Mutation committed", body = StockMutationResult),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material, category, or machine not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent mutation, retry", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "stock"
)]
pub async fn mutate_stock(
    State(state): State<AppState>,
    current: AuthenticatedUser,
    Json(command): Json<StockMutationCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state
        .services
        .ledger
        .apply_mutation(command, current.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// List stock records with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/stock",
    params(StockListQuery),
    responses(
        (status = 200, description = "Stock records returned"),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "stock"
)]
pub async fn list_stock(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
    Query(query): Query<StockListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .ledger
        .list_stock(StockFilter {
            category_id: query.category_id,
            month: query.month,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(Json(json!({
        "records": items,
        "total": total,
        "page": query.page,
        "limit": query.limit,
    })))
}

/// Current stock level for a material
#[utoipa::path(
    get,
    path = "/api/v1/stock/{material_id}",
    params(("material_id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "Current stock level", body = StockLevelResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "stock"
)]
pub async fn get_stock(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
    Path(material_id): Path<Uuid>,
) -> Result<Json<StockLevelResponse>, ServiceError> {
    let (material, record) = state.services.ledger.stock_for_material(material_id).await?;
    let response = match record {
        Some(record) => StockLevelResponse {
            material_id: material.id,
            material_name: material.name,
            quantity: record.quantity,
            owner_name: Some(record.owner_name),
            assigned_date: Some(record.assigned_date),
            updated_at: Some(record.updated_at),
        },
        None => StockLevelResponse {
            material_id: material.id,
            material_name: material.name,
            quantity: 0,
            owner_name: None,
            assigned_date: None,
            updated_at: None,
        },
    };
    Ok(Json(response))
}

/// Replay a material's audit trail against its stock record
#[utoipa::path(
    get,
    path = "/api/v1/stock/{material_id}/audit",
    params(("material_id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "Audit replay report", body = AuditReport),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "stock"
)]
pub async fn audit_stock(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
    Path(material_id): Path<Uuid>,
) -> Result<Json<AuditReport>, ServiceError> {
    let report = state
        .services
        .ledger
        .verify_material_audit(material_id)
        .await?;
    Ok(Json(report))
}
