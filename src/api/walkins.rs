//! Walk-in request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::walkin::{WalkIn, WalkInCreate, WalkInListResponse, WalkInTransition},
};

use super::AuthenticatedUser;

/// Query parameters for the staff listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct AssignedWalkInsQuery {
    /// University to list (required for admins, optional for counsellors)
    pub university_id: Option<String>,
}

/// Request a campus visit
#[utoipa::path(
    post,
    path = "/walkins",
    tag = "walkins",
    security(("bearer_auth" = [])),
    request_body = WalkInCreate,
    responses(
        (status = 201, description = "Walk-in requested", body = WalkIn),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_walkin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Json(data), _): WithRejection<Json<WalkInCreate>, AppError>,
) -> AppResult<(StatusCode, Json<WalkIn>)> {
    let owner = claims.walkin_owner()?;

    let walkin = state.services.walkins.create(data, owner).await?;
    Ok((StatusCode::CREATED, Json(walkin)))
}

/// List the current student's walk-in requests
#[utoipa::path(
    get,
    path = "/walkins/my",
    tag = "walkins",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own walk-in requests", body = WalkInListResponse)
    )
)]
pub async fn list_my_walkins(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<WalkInListResponse>> {
    claims.require_student()?;

    let data = state.services.walkins.list_for_student(&claims.sub).await?;
    Ok(Json(WalkInListResponse { data }))
}

/// List walk-in requests addressed to a university
///
/// Counsellors see their own university; admins pass `university_id`.
#[utoipa::path(
    get,
    path = "/walkins/assigned",
    tag = "walkins",
    security(("bearer_auth" = [])),
    params(AssignedWalkInsQuery),
    responses(
        (status = 200, description = "Walk-in requests to handle", body = WalkInListResponse),
        (status = 400, description = "Admin did not name a university", body = crate::error::ErrorResponse),
        (status = 403, description = "Not allowed for this university", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_assigned_walkins(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AssignedWalkInsQuery>,
) -> AppResult<Json<WalkInListResponse>> {
    claims.require_staff()?;

    let university_id = claims.assigned_university(query.university_id.as_deref())?;
    let data = state.services.walkins.list_for_university(university_id).await?;
    Ok(Json(WalkInListResponse { data }))
}

/// Approve, modify, reject or complete a walk-in request
#[utoipa::path(
    put,
    path = "/walkins/{id}/status",
    tag = "walkins",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Walk-in ID")),
    request_body = WalkInTransition,
    responses(
        (status = 200, description = "Walk-in updated", body = WalkIn),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Walk-in not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_walkin_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    WithRejection(Json(data), _): WithRejection<Json<WalkInTransition>, AppError>,
) -> AppResult<Json<WalkIn>> {
    claims.require_staff()?;
    let scope = claims.staff_scope()?;

    let walkin = state
        .services
        .walkins
        .transition(&id, &claims.sub, scope, data)
        .await?;
    Ok(Json(walkin))
}
