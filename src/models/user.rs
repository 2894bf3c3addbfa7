//! Authenticated user claims

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppError, models::walkin::WalkInOwner};

/// Platform role carried in the access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Counsellor,
    Student,
}

/// JWT claims issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: String,
    pub role: Role,
    /// University the user belongs to (students and counsellors)
    #[serde(default)]
    pub university_id: Option<String>,
    /// Lead record of a student
    #[serde(default)]
    pub lead_id: Option<String>,
    pub exp: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin => Ok(()),
            _ => Err(AppError::Authorization("Admin role required".to_string())),
        }
    }

    /// Counsellors, or admins acting as staff
    pub fn require_staff(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin | Role::Counsellor => Ok(()),
            Role::Student => Err(AppError::Authorization("Counsellor role required".to_string())),
        }
    }

    pub fn require_student(&self) -> Result<(), AppError> {
        match self.role {
            Role::Student => Ok(()),
            _ => Err(AppError::Authorization("Student role required".to_string())),
        }
    }

    /// Walk-in ownership for a student token
    pub fn walkin_owner(&self) -> Result<WalkInOwner, AppError> {
        self.require_student()?;
        let university_id = self.university_id.clone().ok_or_else(|| {
            AppError::Validation("Student is not attached to a university".to_string())
        })?;
        let lead_id = self
            .lead_id
            .clone()
            .ok_or_else(|| AppError::Validation("Student has no lead record".to_string()))?;

        Ok(WalkInOwner {
            university_id,
            lead_id,
            student_id: self.sub.clone(),
        })
    }

    /// University a staff member is restricted to; only admins are unrestricted
    pub fn staff_scope(&self) -> Result<Option<&str>, AppError> {
        match self.role {
            Role::Admin => Ok(None),
            Role::Counsellor => self.university_id.as_deref().map(Some).ok_or_else(|| {
                AppError::Authorization("Counsellor is not attached to a university".to_string())
            }),
            Role::Student => Err(AppError::Authorization("Counsellor role required".to_string())),
        }
    }

    /// University whose walk-ins a staff member lists.
    ///
    /// Counsellors always get their own university. Admins must name one.
    pub fn assigned_university<'a>(
        &'a self,
        requested: Option<&'a str>,
    ) -> Result<&'a str, AppError> {
        match self.staff_scope()? {
            Some(own) => match requested {
                Some(other) if other != own => Err(AppError::Authorization(
                    "Counsellors may only list their own university".to_string(),
                )),
                _ => Ok(own),
            },
            None => requested.ok_or_else(|| {
                AppError::Validation("university_id query parameter is required".to_string())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> UserClaims {
        UserClaims {
            sub: "user-1".into(),
            role,
            university_id: Some("uni-1".into()),
            lead_id: Some("lead-1".into()),
            exp: chrono::Utc::now().timestamp() + 3600,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = claims(Role::Counsellor).create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.role, Role::Counsellor);
        assert_eq!(parsed.university_id.as_deref(), Some("uni-1"));
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_role_checks() {
        assert!(claims(Role::Admin).require_admin().is_ok());
        assert!(claims(Role::Admin).require_staff().is_ok());
        assert!(claims(Role::Counsellor).require_admin().is_err());
        assert!(claims(Role::Student).require_staff().is_err());
        assert_eq!(claims(Role::Admin).staff_scope().unwrap(), None);
        assert_eq!(claims(Role::Counsellor).staff_scope().unwrap(), Some("uni-1"));
        assert!(claims(Role::Student).staff_scope().is_err());
    }

    #[test]
    fn test_counsellor_without_university_is_not_unscoped() {
        let mut counsellor = claims(Role::Counsellor);
        counsellor.university_id = None;

        assert!(counsellor.require_staff().is_ok());
        assert!(matches!(counsellor.staff_scope(), Err(AppError::Authorization(_))));
        assert!(matches!(
            counsellor.assigned_university(Some("uni-2")),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_assigned_university() {
        let counsellor = claims(Role::Counsellor);
        assert_eq!(counsellor.assigned_university(None).unwrap(), "uni-1");
        assert_eq!(counsellor.assigned_university(Some("uni-1")).unwrap(), "uni-1");
        assert!(matches!(
            counsellor.assigned_university(Some("uni-2")),
            Err(AppError::Authorization(_))
        ));

        let admin = claims(Role::Admin);
        assert_eq!(admin.assigned_university(Some("uni-2")).unwrap(), "uni-2");
        assert!(matches!(admin.assigned_university(None), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_walkin_owner_needs_lead() {
        let owner = claims(Role::Student).walkin_owner().unwrap();
        assert_eq!(owner.student_id, "user-1");
        assert_eq!(owner.lead_id, "lead-1");

        let mut no_lead = claims(Role::Student);
        no_lead.lead_id = None;
        assert!(matches!(no_lead.walkin_owner(), Err(AppError::Validation(_))));
        assert!(matches!(
            claims(Role::Counsellor).walkin_owner(),
            Err(AppError::Authorization(_))
        ));
    }
}
