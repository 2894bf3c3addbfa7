//! File upload endpoint

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Multipart;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    /// Object key in the bucket
    pub key: String,
    /// Public URL of the stored object
    pub url: String,
}

/// Multipart form accepted by the upload endpoint
#[derive(ToSchema)]
pub struct UploadForm {
    /// File contents; the part's file name and content type are kept
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Upload a file (multipart field `file`) to object storage
#[utoipa::path(
    post,
    path = "/uploads",
    tag = "uploads",
    security(("bearer_auth" = [])),
    request_body(
        content = UploadForm,
        content_type = "multipart/form-data",
        description = "Multipart form with a `file` field"
    ),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 502, description = "Object storage unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let payload = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?;
        if payload.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let key = format!("uploads/{}-{}", Uuid::new_v4(), sanitize_file_name(&file_name));
        let url = state
            .services
            .storage
            .put(payload.to_vec(), &key, &content_type)
            .await?;

        tracing::info!(user_id = %claims.sub, key = %key, "File uploaded");
        return Ok((StatusCode::CREATED, Json(UploadResponse { key, url })));
    }

    Err(AppError::Validation("Missing 'file' field".to_string()))
}

/// Keep the base name only, with characters that are safe in object keys
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
