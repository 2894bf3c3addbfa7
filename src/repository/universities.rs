//! Universities repository (recipient directory)

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::university::University};

/// Resolves communication recipients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Every university id, in a stable order
    async fn all_university_ids(&self) -> AppResult<Vec<String>>;

    /// Universities matching `ids`; unknown ids are absent from the result
    async fn find(&self, ids: &[String]) -> AppResult<Vec<University>>;
}

#[derive(Clone)]
pub struct UniversitiesRepository {
    pool: Pool<Postgres>,
}

impl UniversitiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientDirectory for UniversitiesRepository {
    async fn all_university_ids(&self) -> AppResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM universities ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn find(&self, ids: &[String]) -> AppResult<Vec<University>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, University>("SELECT * FROM universities WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
