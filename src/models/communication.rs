//! Admin bulk communication model and delivery accounting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::enums::{CommunicationStatus, CommunicationType},
};

/// Bulk communication record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AdminCommunication {
    pub id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub communication_type: CommunicationType,
    pub subject: String,
    /// HTML or plain text body
    pub message: String,
    /// Admin who sent the communication
    pub sent_by: String,
    pub recipient_university_ids: Vec<String>,
    pub send_to_all: bool,
    pub total_recipients: i32,
    pub successful: i32,
    pub failed: i32,
    pub status: CommunicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Send communication request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AdminCommunicationCreate {
    pub university_ids: Option<Vec<String>>,
    #[serde(default)]
    pub send_to_all: bool,
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

/// Communication history entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminCommunicationHistoryResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub communication_type: CommunicationType,
    pub subject: String,
    pub message: String,
    pub sent_by: String,
    pub recipient_university_ids: Vec<String>,
    pub send_to_all: bool,
    pub total_recipients: i32,
    pub successful: i32,
    pub failed: i32,
    pub status: CommunicationStatus,
    /// Names of the recipient universities, in recipient order
    pub university_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminCommunicationCreate {
    /// Check the request shape before any recipient lookup happens
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if self.subject.trim().is_empty() {
            return Err(AppError::Validation("subject is required".to_string()));
        }
        if self.message.trim().is_empty() {
            return Err(AppError::Validation("message is required".to_string()));
        }
        if !self.send_to_all && self.university_ids.as_ref().map_or(true, |ids| ids.is_empty()) {
            return Err(AppError::Validation(
                "select at least one university or send to all".to_string(),
            ));
        }
        Ok(())
    }
}

impl AdminCommunication {
    /// Build a record for an already resolved recipient list
    pub fn new(
        request: AdminCommunicationCreate,
        sent_by: &str,
        recipients: Vec<String>,
        id: String,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        request.check()?;
        let total_recipients = i32::try_from(recipients.len())
            .map_err(|_| AppError::Validation("too many recipients".to_string()))?;

        Ok(Self {
            id,
            communication_type: CommunicationType::Email,
            subject: request.subject,
            message: request.message,
            sent_by: sent_by.to_string(),
            recipient_university_ids: recipients,
            send_to_all: request.send_to_all,
            total_recipients,
            successful: 0,
            failed: 0,
            status: CommunicationStatus::Sent,
            created_at: now,
            updated_at: now,
        })
    }

    /// Store the delivery counts and derive the status from them
    pub fn record_delivery_outcome(
        &mut self,
        successful: i32,
        failed: i32,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if successful < 0 || failed < 0 {
            return Err(AppError::InvariantViolation(format!(
                "delivery counts must be non-negative (successful={}, failed={})",
                successful, failed
            )));
        }
        let counted = i64::from(successful) + i64::from(failed);
        if counted > i64::from(self.total_recipients) {
            return Err(AppError::InvariantViolation(format!(
                "successful ({}) + failed ({}) exceeds total recipients ({})",
                successful, failed, self.total_recipients
            )));
        }

        self.successful = successful;
        self.failed = failed;
        self.status = CommunicationStatus::derive(successful, failed);
        self.updated_at = now.max(self.created_at);
        Ok(())
    }

    pub fn into_history(self, university_names: Vec<String>) -> AdminCommunicationHistoryResponse {
        AdminCommunicationHistoryResponse {
            id: self.id,
            communication_type: self.communication_type,
            subject: self.subject,
            message: self.message,
            sent_by: self.sent_by,
            recipient_university_ids: self.recipient_university_ids,
            send_to_all: self.send_to_all,
            total_recipients: self.total_recipients,
            successful: self.successful,
            failed: self.failed,
            status: self.status,
            university_names,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
