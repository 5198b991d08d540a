//! Authenticated user claims
//!
//! Accounts and roles are managed elsewhere; this service only verifies the
//! bearer token and reads who the caller is and what role they hold.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// User role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Admin,
    Hrd,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
            Role::Hrd => "hrd",
        }
    }

    /// Admins and HR can read reports
    pub fn can_manage_employees(&self) -> bool {
        matches!(self, Role::Admin | Role::Hrd)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    /// Also the employee id for attendance records
    pub user_id: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn new(user_id: i64, login: &str, role: Role, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let ttl = Duration::hours(i64::try_from(ttl_hours).unwrap_or(i64::MAX / 3600));
        Self {
            sub: login.to_string(),
            user_id,
            role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

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

    /// Only employees record attendance
    pub fn require_employee(&self) -> Result<i64, AppError> {
        if self.role == Role::Employee {
            Ok(self.user_id)
        } else {
            Err(AppError::Authorization(
                "Only employees can record attendance".to_string(),
            ))
        }
    }

    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.role.can_manage_employees() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator or HR privileges required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_keeps_identity() {
        let claims = UserClaims::new(42, "jdoe", Role::Employee, 1);
        let token = claims.create_token("secret").unwrap();

        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 42);
        assert_eq!(parsed.role, Role::Employee);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_role_checks() {
        let employee = UserClaims::new(1, "e", Role::Employee, 1);
        let admin = UserClaims::new(2, "a", Role::Admin, 1);
        let hrd = UserClaims::new(3, "h", Role::Hrd, 1);

        assert_eq!(employee.require_employee().unwrap(), 1);
        assert!(employee.require_manager().is_err());
        assert!(admin.require_employee().is_err());
        assert!(admin.require_manager().is_ok());
        assert!(hrd.require_manager().is_ok());
    }
}
