//! Walk-ins repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::walkin::WalkIn};

/// Keyed persistence for walk-in requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalkInStore: Send + Sync {
    async fn insert(&self, walkin: &WalkIn) -> AppResult<()>;

    async fn get(&self, id: &str) -> AppResult<Option<WalkIn>>;

    /// Overwrite the mutable fields of an existing record
    async fn update(&self, walkin: &WalkIn) -> AppResult<()>;

    async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<WalkIn>>;

    async fn list_for_university(&self, university_id: &str) -> AppResult<Vec<WalkIn>>;
}

#[derive(Clone)]
pub struct WalkInsRepository {
    pool: Pool<Postgres>,
}

impl WalkInsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalkInStore for WalkInsRepository {
    async fn insert(&self, walkin: &WalkIn) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO walkins (
                id, university_id, lead_id, student_id, counsellor_id,
                visit_date, visit_time, number_of_persons, reason,
                status, counsellor_note, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&walkin.id)
        .bind(&walkin.university_id)
        .bind(&walkin.lead_id)
        .bind(&walkin.student_id)
        .bind(&walkin.counsellor_id)
        .bind(walkin.visit_date)
        .bind(&walkin.visit_time)
        .bind(walkin.number_of_persons)
        .bind(&walkin.reason)
        .bind(walkin.status)
        .bind(&walkin.counsellor_note)
        .bind(walkin.created_at)
        .bind(walkin.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Option<WalkIn>> {
        let row = sqlx::query_as::<_, WalkIn>("SELECT * FROM walkins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, walkin: &WalkIn) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE walkins SET
                counsellor_id = $2,
                visit_date = $3,
                visit_time = $4,
                status = $5,
                counsellor_note = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(&walkin.id)
        .bind(&walkin.counsellor_id)
        .bind(walkin.visit_date)
        .bind(&walkin.visit_time)
        .bind(walkin.status)
        .bind(&walkin.counsellor_note)
        .bind(walkin.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::AppError::NotFound(format!(
                "Walk-in {} not found",
                walkin.id
            )));
        }
        Ok(())
    }

    async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<WalkIn>> {
        let rows = sqlx::query_as::<_, WalkIn>(
            "SELECT * FROM walkins WHERE student_id = $1 ORDER BY created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_for_university(&self, university_id: &str) -> AppResult<Vec<WalkIn>> {
        let rows = sqlx::query_as::<_, WalkIn>(
            "SELECT * FROM walkins WHERE university_id = $1 ORDER BY created_at DESC",
        )
        .bind(university_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
