//! Walk-in visit request model and its status state machine

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::enums::WalkInStatus,
};

/// Walk-in request record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WalkIn {
    pub id: String,
    pub university_id: String,
    pub lead_id: String,
    pub student_id: String,
    /// Counsellor who last acted on the request
    pub counsellor_id: Option<String>,
    pub visit_date: DateTime<Utc>,
    /// Free-form time slot, e.g. "14:30"
    pub visit_time: String,
    pub number_of_persons: i32,
    pub reason: Option<String>,
    pub status: WalkInStatus,
    pub counsellor_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create walk-in request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct WalkInCreate {
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[serde(deserialize_with = "deserialize_visit_date")]
    #[schema(value_type = String)]
    pub visit_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "visit_time is required"))]
    pub visit_time: String,
    #[validate(range(min = 1, message = "number_of_persons must be greater than 0"))]
    pub number_of_persons: i32,
    pub reason: Option<String>,
}

/// Identities a walk-in belongs to, taken from the requesting student
#[derive(Debug, Clone)]
pub struct WalkInOwner {
    pub university_id: String,
    pub lead_id: String,
    pub student_id: String,
}

/// Status change requested by a counsellor
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WalkInTransition {
    pub status: WalkInStatus,
    pub counsellor_note: Option<String>,
    /// New visit date, only with `modified`
    #[serde(default, deserialize_with = "deserialize_optional_visit_date")]
    #[schema(value_type = Option<String>)]
    pub visit_date: Option<DateTime<Utc>>,
    /// New visit time, only with `modified`
    #[serde(default)]
    pub visit_time: Option<String>,
}

impl WalkInTransition {
    pub fn to(status: WalkInStatus) -> Self {
        Self {
            status,
            counsellor_note: None,
            visit_date: None,
            visit_time: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.counsellor_note = Some(note.into());
        self
    }

    fn reschedules(&self) -> bool {
        self.visit_date.is_some() || self.visit_time.is_some()
    }
}

/// List wrapper returned by the walk-in listing endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct WalkInListResponse {
    pub data: Vec<WalkIn>,
}

impl WalkIn {
    /// Build a new request in `requested` status
    pub fn new(
        request: WalkInCreate,
        owner: WalkInOwner,
        id: String,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        request.validate()?;
        if request.visit_time.trim().is_empty() {
            return Err(AppError::Validation("visit_time is required".to_string()));
        }
        for (field, value) in [
            ("university_id", &owner.university_id),
            ("lead_id", &owner.lead_id),
            ("student_id", &owner.student_id),
        ] {
            if value.is_empty() {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }

        Ok(Self {
            id,
            university_id: owner.university_id,
            lead_id: owner.lead_id,
            student_id: owner.student_id,
            counsellor_id: None,
            visit_date: request.visit_date,
            visit_time: request.visit_time,
            number_of_persons: request.number_of_persons,
            reason: request.reason,
            status: WalkInStatus::Requested,
            counsellor_note: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move to `update.status` if it is a direct successor of the current status.
    ///
    /// The record is left untouched on error.
    pub fn transition(
        &mut self,
        update: WalkInTransition,
        counsellor_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.status.is_terminal() {
            return Err(AppError::AlreadyTerminal(self.status));
        }
        if !self.status.can_transition_to(update.status) {
            return Err(AppError::InvalidTransition {
                from: self.status,
                to: update.status,
            });
        }
        if update.reschedules() && update.status != WalkInStatus::Modified {
            return Err(AppError::Validation(
                "visit_date and visit_time can only change with status 'modified'".to_string(),
            ));
        }
        if matches!(&update.visit_time, Some(t) if t.trim().is_empty()) {
            return Err(AppError::Validation("visit_time cannot be empty".to_string()));
        }

        if let Some(visit_date) = update.visit_date {
            self.visit_date = visit_date;
        }
        if let Some(visit_time) = update.visit_time {
            self.visit_time = visit_time;
        }
        if let Some(note) = update.counsellor_note {
            self.counsellor_note = Some(note);
        }
        self.status = update.status;
        self.counsellor_id = Some(counsellor_id.to_string());
        self.updated_at = now.max(self.created_at);
        Ok(())
    }
}

fn parse_visit_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| format!("invalid visit_date '{}'", raw))
}

fn deserialize_visit_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_visit_date(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_visit_date<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.is_empty() => parse_visit_date(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
