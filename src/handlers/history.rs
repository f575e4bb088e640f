use crate::{
    auth::AuthenticatedUser, errors::ServiceError, services::history::HistoryFilter, AppState,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct HistoryQuery {
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub machine_id: Option<Uuid>,
    /// `YYYY-MM`, filters on assigned date
    pub month: Option<String>,
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
}

pub fn history_router() -> Router<AppState> {
    Router::new().route("/", get(list_history))
}

/// List stock transactions, newest first
#[utoipa::path(
    get,
    path = "/api/v1/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Transactions returned"),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "history"
)]
pub async fn list_history(
    State(state): State<AppState>,
    _current: AuthenticatedUser,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .history
        .list(HistoryFilter {
            category_id: query.category_id,
            material_id: query.material_id,
            machine_id: query.machine_id,
            month: query.month,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(Json(json!({
        "transactions": items,
        "total": total,
        "page": query.page,
        "limit": query.limit,
    })))
}
