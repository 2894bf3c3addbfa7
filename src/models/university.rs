//! University directory entry

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// University known to the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct University {
    pub id: String,
    pub name: String,
    /// Contact address bulk communications are delivered to
    pub email: Option<String>,
}
