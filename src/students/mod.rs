//! Student records

pub mod analytics;
pub mod records;

pub use records::{
    AttendanceSummary, FeeStatus, FeeSummary, PlacementStatus, PlacementSummary, PlacementUpdate,
    ProfileUpdate,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::models::Registration;
use crate::error::Result;

/// Attendance as tracked by the registrar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Attendance {
    #[serde(default)]
    pub percentage: f64,
}

/// A registered student. Doubles as the credential record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_no: String,
    pub email: String,
    /// bcrypt hash; never sent to clients
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub department: String,
    pub year: u32,
    pub semester: u32,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default, rename = "currentCGPA")]
    pub current_cgpa: f64,
    #[serde(default)]
    pub total_credits: u32,
    #[serde(default)]
    pub attendance: Attendance,
    #[serde(default)]
    pub total_fee: f64,
    #[serde(default)]
    pub paid_amount: f64,
    #[serde(default)]
    pub placement_status: PlacementStatus,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub package: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Create a new student from a validated registration and its password hash
    pub fn new(registration: Registration, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: registration.name,
            roll_no: registration.roll_no,
            email: registration.email,
            password_hash,
            department: registration.department,
            year: registration.year,
            semester: registration.semester,
            phone: Some(registration.contact),
            date_of_birth: None,
            blood_group: None,
            current_cgpa: 0.0,
            total_credits: 0,
            attendance: Attendance::default(),
            total_fee: 0.0,
            paid_amount: 0.0,
            placement_status: PlacementStatus::NotPlaced,
            company: None,
            package: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn fees(&self) -> FeeSummary {
        FeeSummary::for_student(self)
    }
}

/// A change to an existing student record
#[derive(Debug, Clone)]
pub enum StudentUpdate {
    Profile(ProfileUpdate),
    /// Add a fee payment to the amount paid
    Payment(f64),
    Placement(PlacementUpdate),
}

impl StudentUpdate {
    /// Validate and apply the change, bumping `updated_at`
    pub fn apply(&self, student: &mut Student) -> Result<()> {
        match self {
            StudentUpdate::Profile(update) => update.apply(student)?,
            StudentUpdate::Payment(amount) => records::record_payment(student, *amount)?,
            StudentUpdate::Placement(update) => update.apply(student)?,
        }
        student.updated_at = Utc::now();
        Ok(())
    }
}

/// Filters for the student directory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    pub department: Option<String>,
    pub year: Option<u32>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        self.department
            .as_deref()
            .map_or(true, |d| student.department == d)
            && self.year.map_or(true, |y| student.year == y)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A student with placeholder values and the given unique keys
    pub fn student(email: &str, roll_no: &str) -> Student {
        Student::new(
            Registration {
                name: "Test Student".to_string(),
                email: email.to_string(),
                password: String::new(),
                roll_no: roll_no.to_string(),
                department: "Computer Science".to_string(),
                year: 2,
                contact: "9876543210".to_string(),
                semester: 3,
            },
            "$2b$04$placeholderplaceholderplaceholderplaceholderplacehol".to_string(),
        )
    }
}
