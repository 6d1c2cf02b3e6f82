//! Admission applications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::validation;

/// Most document references one application may carry
pub const MAX_DOCUMENTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AdmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionStatus::Pending => write!(f, "Pending"),
            AdmissionStatus::Approved => write!(f, "Approved"),
            AdmissionStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for AdmissionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(AdmissionStatus::Pending),
            "Approved" => Ok(AdmissionStatus::Approved),
            "Rejected" => Ok(AdmissionStatus::Rejected),
            _ => Err(Error::Validation(
                "Invalid status. Must be Pending, Approved, or Rejected".to_string(),
            )),
        }
    }
}

/// A submitted application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub course: String,
    pub category: String,
    pub previous_education: String,
    /// References to supporting documents held elsewhere
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub status: AdmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application form as posted by an applicant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub course: String,
    pub category: Option<String>,
    pub previous_education: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
}

impl ApplicationForm {
    pub fn validate(&self) -> Result<()> {
        validation::min_len("name", &self.name, 2)?;
        validation::email("email", &self.email)?;
        validation::min_len("contact", &self.contact, 10)?;
        validation::min_len("course", &self.course, 2)?;
        if self.documents.len() > MAX_DOCUMENTS {
            return Err(Error::Validation(format!(
                "At most {} documents may be attached",
                MAX_DOCUMENTS
            )));
        }
        Ok(())
    }

    /// Validate the form and turn it into a pending application
    pub fn into_admission(self) -> Result<Admission> {
        self.validate()?;

        let now = Utc::now();
        Ok(Admission {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            contact: self.contact.trim().to_string(),
            course: self.course.trim().to_string(),
            category: self
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "General".to_string()),
            previous_education: self.previous_education.unwrap_or_default(),
            documents: self.documents,
            status: AdmissionStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of a status change request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub status: String,
}

impl StatusChange {
    pub fn parse(&self) -> Result<AdmissionStatus> {
        self.status.parse()
    }
}
