//! Admin communications repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::communication::AdminCommunication,
};

/// Keyed persistence for bulk communication records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunicationStore: Send + Sync {
    async fn insert(&self, communication: &AdminCommunication) -> AppResult<()>;

    async fn get(&self, id: &str) -> AppResult<Option<AdminCommunication>>;

    /// Persist delivery counts, status and updated_at
    async fn update(&self, communication: &AdminCommunication) -> AppResult<()>;

    /// All records, newest first
    async fn list(&self) -> AppResult<Vec<AdminCommunication>>;
}

#[derive(Clone)]
pub struct CommunicationsRepository {
    pool: Pool<Postgres>,
}

impl CommunicationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommunicationStore for CommunicationsRepository {
    async fn insert(&self, communication: &AdminCommunication) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_communications (
                id, type, subject, message, sent_by,
                recipient_university_ids, send_to_all, total_recipients,
                successful, failed, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&communication.id)
        .bind(communication.communication_type)
        .bind(&communication.subject)
        .bind(&communication.message)
        .bind(&communication.sent_by)
        .bind(&communication.recipient_university_ids)
        .bind(communication.send_to_all)
        .bind(communication.total_recipients)
        .bind(communication.successful)
        .bind(communication.failed)
        .bind(communication.status)
        .bind(communication.created_at)
        .bind(communication.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Option<AdminCommunication>> {
        let row = sqlx::query_as::<_, AdminCommunication>(
            "SELECT * FROM admin_communications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, communication: &AdminCommunication) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE admin_communications
            SET successful = $2, failed = $3, status = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(&communication.id)
        .bind(communication.successful)
        .bind(communication.failed)
        .bind(communication.status)
        .bind(communication.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Communication {} not found",
                communication.id
            )));
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<AdminCommunication>> {
        let rows = sqlx::query_as::<_, AdminCommunication>(
            "SELECT * FROM admin_communications ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
