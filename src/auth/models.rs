//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AdminAccount;
use crate::error::{Error, Result};
use crate::students::Student;
use crate::validation;

/// User roles for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - admissions review, student directory, analytics
    Admin,
    /// Student - own records only
    #[default]
    Student,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Student => write!(f, "student"),
        }
    }
}

/// The identity carried inside a token
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&Student> for Identity {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            email: student.email.clone(),
            name: student.name.clone(),
            roll_no: Some(student.roll_no.clone()),
            department: Some(student.department.clone()),
            role: UserRole::Student,
        }
    }
}

impl From<&AdminAccount> for Identity {
    fn from(admin: &AdminAccount) -> Self {
        Self {
            id: admin.identity_id().to_string(),
            email: admin.email.clone(),
            name: admin.name.clone(),
            roll_no: None,
            department: None,
            role: UserRole::Admin,
        }
    }
}

/// Login credentials. `email` also accepts a roll number.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "identifier")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(Error::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Registration body. Every field is required; they are optional here so a
/// missing field gets a readable 400 instead of a deserializer rejection.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub roll_no: Option<String>,
    pub department: Option<String>,
    pub year: Option<u32>,
    pub contact: Option<String>,
    pub semester: Option<u32>,
}

/// A registration body that passed validation
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub roll_no: String,
    pub department: String,
    pub year: u32,
    pub contact: String,
    pub semester: u32,
}

const MIN_PASSWORD_LEN: usize = 6;

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration> {
        fn text(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let missing = || {
            Error::Validation(
                "All fields are required (name, email, password, rollNo, department, year, contact, semester)"
                    .to_string(),
            )
        };

        let registration = Registration {
            name: text(self.name).ok_or_else(missing)?,
            email: text(self.email).ok_or_else(missing)?.to_lowercase(),
            password: self.password.filter(|p| !p.is_empty()).ok_or_else(missing)?,
            roll_no: text(self.roll_no).ok_or_else(missing)?,
            department: text(self.department).ok_or_else(missing)?,
            year: self.year.filter(|y| *y > 0).ok_or_else(missing)?,
            contact: text(self.contact).ok_or_else(missing)?,
            semester: self.semester.filter(|s| *s > 0).ok_or_else(missing)?,
        };

        validation::email("email", &registration.email)?;
        if registration.roll_no.contains('@') {
            return Err(Error::Validation("rollNo must not contain '@'".to_string()));
        }
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        Ok(registration)
    }
}

/// Login/registration response with token
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
    pub message: String,
}

/// User information in responses
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<u32>,
    pub role: UserRole,
}

impl From<&Student> for UserInfo {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
            roll_no: Some(student.roll_no.clone()),
            department: Some(student.department.clone()),
            semester: Some(student.semester),
            role: UserRole::Student,
        }
    }
}

impl From<Identity> for UserInfo {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            roll_no: identity.roll_no,
            department: identity.department,
            semester: None,
            role: identity.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> RegisterRequest {
        RegisterRequest {
            name: Some("Asha Rao".to_string()),
            email: Some("Asha@Campus.edu".to_string()),
            password: Some("secret123".to_string()),
            roll_no: Some("CS21-001".to_string()),
            department: Some("Computer Science".to_string()),
            year: Some(2),
            contact: Some("9876543210".to_string()),
            semester: Some(3),
        }
    }

    #[test]
    fn test_register_validation_normalizes_email() {
        let registration = complete().validate().unwrap();
        assert_eq!(registration.email, "asha@campus.edu");
        assert_eq!(registration.roll_no, "CS21-001");
    }

    #[test]
    fn test_register_rejects_email_shaped_roll_number() {
        let mut req = complete();
        req.roll_no = Some("victim@campus.edu".to_string());
        let err = req.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("rollNo")));
    }

    #[test]
    fn test_register_requires_every_field() {
        let mut req = complete();
        req.semester = None;
        let err = req.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.starts_with("All fields are required")));

        let mut req = complete();
        req.name = Some("   ".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_rejects_bad_email_and_short_password() {
        let mut req = complete();
        req.email = Some("not-an-email".to_string());
        assert!(req.validate().is_err());

        let mut req = complete();
        req.password = Some("abc".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_accepts_identifier_alias() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"identifier":"CS21-001","password":"pw"}"#).unwrap();
        assert_eq!(req.email, "CS21-001");
        assert!(req.validate().is_ok());

        let req: LoginRequest = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_identity_role_defaults_to_student() {
        let identity: Identity = serde_json::from_str(r#"{"id":"u1","email":"a@b.com"}"#).unwrap();
        assert_eq!(identity.role, UserRole::Student);
        assert!(!identity.is_admin());
        assert_eq!(identity.name, "");
    }
}
