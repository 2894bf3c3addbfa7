//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{communications, health, uploads, walkins};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus Admin API",
        version = "0.1.0",
        description = "Admissions platform admin REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Walk-ins
        walkins::create_walkin,
        walkins::list_my_walkins,
        walkins::list_assigned_walkins,
        walkins::update_walkin_status,
        // Communications
        communications::send_communication,
        communications::list_communications,
        communications::get_communication,
        // Uploads
        uploads::upload_file,
    ),
    components(
        schemas(
            // Walk-ins
            crate::models::walkin::WalkIn,
            crate::models::walkin::WalkInCreate,
            crate::models::walkin::WalkInTransition,
            crate::models::walkin::WalkInListResponse,
            crate::models::enums::WalkInStatus,
            // Communications
            crate::models::communication::AdminCommunication,
            crate::models::communication::AdminCommunicationCreate,
            crate::models::communication::AdminCommunicationHistoryResponse,
            crate::models::enums::CommunicationType,
            crate::models::enums::CommunicationStatus,
            // Uploads
            uploads::UploadForm,
            uploads::UploadResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "walkins", description = "Campus walk-in requests"),
        (name = "communications", description = "Bulk communications to universities"),
        (name = "uploads", description = "File uploads to object storage")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
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

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
