//! Walk-in request service

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::walkin::{WalkIn, WalkInCreate, WalkInOwner, WalkInTransition},
    repository::WalkInStore,
};

#[derive(Clone)]
pub struct WalkInsService {
    store: Arc<dyn WalkInStore>,
}

impl WalkInsService {
    pub fn new(store: Arc<dyn WalkInStore>) -> Self {
        Self { store }
    }

    /// Submit a new walk-in request for a student
    pub async fn create(&self, request: WalkInCreate, owner: WalkInOwner) -> AppResult<WalkIn> {
        let walkin = WalkIn::new(request, owner, Uuid::new_v4().to_string(), Utc::now())?;
        self.store.insert(&walkin).await?;

        tracing::info!(
            walkin_id = %walkin.id,
            student_id = %walkin.student_id,
            university_id = %walkin.university_id,
            "Walk-in requested"
        );
        Ok(walkin)
    }

    /// Apply a counsellor status change.
    ///
    /// `scope_university_id` restricts the counsellor to requests of one university.
    pub async fn transition(
        &self,
        id: &str,
        counsellor_id: &str,
        scope_university_id: Option<&str>,
        update: WalkInTransition,
    ) -> AppResult<WalkIn> {
        let mut walkin = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Walk-in {} not found", id)))?;

        if let Some(university_id) = scope_university_id {
            if walkin.university_id != university_id {
                return Err(AppError::Authorization(
                    "Walk-in belongs to another university".to_string(),
                ));
            }
        }

        let from = walkin.status;
        walkin.transition(update, counsellor_id, Utc::now())?;
        self.store.update(&walkin).await?;

        tracing::info!(
            walkin_id = %walkin.id,
            counsellor_id,
            %from,
            to = %walkin.status,
            "Walk-in status changed"
        );
        Ok(walkin)
    }

    /// Requests submitted by a student, newest first
    pub async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<WalkIn>> {
        self.store.list_for_student(student_id).await
    }

    /// Requests addressed to a university, newest first
    pub async fn list_for_university(&self, university_id: &str) -> AppResult<Vec<WalkIn>> {
        self.store.list_for_university(university_id).await
    }
}
