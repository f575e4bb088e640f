use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.1.0",
        description = r#"
Backend for a maintenance-stockroom inventory system.

Material categories, machines, and materials are simple registries. Stock
levels are changed only through the stock ledger (`POST /api/v1/stock/mutations`),
which atomically updates the material's stock record and appends an immutable
transaction entry. `GET /api/v1/stock/{material_id}/audit` replays the trail to
verify the record.

All endpoints except `/health` and the auth endpoints require a bearer token
from `POST /api/v1/auth/login`.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::auth::register_handler,
        crate::auth::login_handler,
        crate::auth::me_handler,
        crate::handlers::stock::mutate_stock,
        crate::handlers::stock::list_stock,
        crate::handlers::stock::get_stock,
        crate::handlers::stock::audit_stock,
        crate::handlers::materials::create_material,
        crate::handlers::materials::list_materials,
        crate::handlers::materials::low_stock,
        crate::handlers::materials::get_material,
        crate::handlers::materials::update_material,
        crate::handlers::materials::delete_material,
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::rename_category,
        crate::handlers::categories::delete_category,
        crate::handlers::machines::create_machine,
        crate::handlers::machines::list_machines,
        crate::handlers::machines::rename_machine,
        crate::handlers::machines::delete_machine,
        crate::handlers::history::list_history,
        crate::handlers::users::list_users,
        crate::handlers::health::health,
        crate::handlers::health::ready,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::auth::TokenPair,
        crate::auth::RegisterRequest,
        crate::auth::LoginRequest,
        crate::auth::UserResponse,
        crate::entities::stock_transaction::StockAction,
        crate::services::stock_ledger::StockMutationCommand,
        crate::services::stock_ledger::StockMutationResult,
        crate::services::stock_ledger::AuditReport,
        crate::services::materials::CreateMaterialCommand,
        crate::services::materials::UpdateMaterialCommand,
        crate::services::materials::LowStockItem,
        crate::handlers::stock::StockLevelResponse,
        crate::handlers::categories::CategoryRequest,
        crate::handlers::machines::MachineRequest,
        crate::handlers::health::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and token issuance"),
        (name = "stock", description = "The stock ledger and current levels"),
        (name = "materials", description = "Material registry and low-stock listing"),
        (name = "categories", description = "Category registry"),
        (name = "machines", description = "Machine registry"),
        (name = "history", description = "Stock-transaction audit trail"),
        (name = "users", description = "Account directory"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI mounted at `/docs`, serving the schema at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
