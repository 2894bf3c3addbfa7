//! Admin communication endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::communication::{AdminCommunicationCreate, AdminCommunicationHistoryResponse},
};

use super::AuthenticatedUser;

/// Send an email to selected universities, or to all of them
#[utoipa::path(
    post,
    path = "/admin/communications",
    tag = "communications",
    security(("bearer_auth" = [])),
    request_body = AdminCommunicationCreate,
    responses(
        (status = 201, description = "Communication dispatched", body = AdminCommunicationHistoryResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_communication(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Json(data), _): WithRejection<Json<AdminCommunicationCreate>, AppError>,
) -> AppResult<(StatusCode, Json<AdminCommunicationHistoryResponse>)> {
    claims.require_admin()?;

    let communication = state.services.communications.send(data, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(communication)))
}

/// Communication history
#[utoipa::path(
    get,
    path = "/admin/communications",
    tag = "communications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Communication history", body = Vec<AdminCommunicationHistoryResponse>)
    )
)]
pub async fn list_communications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AdminCommunicationHistoryResponse>>> {
    claims.require_admin()?;

    let history = state.services.communications.history().await?;
    Ok(Json(history))
}

/// Get one communication
#[utoipa::path(
    get,
    path = "/admin/communications/{id}",
    tag = "communications",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Communication ID")),
    responses(
        (status = 200, description = "Communication", body = AdminCommunicationHistoryResponse),
        (status = 404, description = "Communication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_communication(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<AdminCommunicationHistoryResponse>> {
    claims.require_admin()?;

    let communication = state.services.communications.get(&id).await?;
    Ok(Json(communication))
}
