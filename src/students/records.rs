//! Profile, fee and placement record updates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Attendance, Student};
use crate::error::{Error, Result};
use crate::validation;

/// Ceiling for any stored money amount
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Fields a student may change on their own profile. Anything else in the
/// request body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub phone: Option<String>,
    pub blood_group: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "currentCGPA")]
    pub current_cgpa: Option<f64>,
    pub total_fee: Option<f64>,
    pub paid_amount: Option<f64>,
    pub attendance: Option<Attendance>,
    pub total_credits: Option<u32>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(cgpa) = self.current_cgpa {
            validation::in_range("currentCGPA", cgpa, 0.0, 10.0)?;
        }
        if let Some(attendance) = self.attendance {
            validation::in_range("attendance.percentage", attendance.percentage, 0.0, 100.0)?;
        }
        if let Some(fee) = self.total_fee {
            validation::in_range("totalFee", fee, 0.0, MAX_AMOUNT)?;
        }
        if let Some(paid) = self.paid_amount {
            validation::in_range("paidAmount", paid, 0.0, MAX_AMOUNT)?;
        }
        Ok(())
    }

    pub fn apply(&self, student: &mut Student) -> Result<()> {
        self.validate()?;

        if let Some(phone) = &self.phone {
            student.phone = Some(phone.clone());
        }
        if let Some(blood_group) = &self.blood_group {
            student.blood_group = Some(blood_group.clone());
        }
        if let Some(dob) = self.date_of_birth {
            student.date_of_birth = Some(dob);
        }
        if let Some(cgpa) = self.current_cgpa {
            student.current_cgpa = cgpa;
        }
        if let Some(fee) = self.total_fee {
            student.total_fee = fee;
        }
        if let Some(paid) = self.paid_amount {
            student.paid_amount = paid;
        }
        if let Some(attendance) = self.attendance {
            student.attendance = attendance;
        }
        if let Some(credits) = self.total_credits {
            student.total_credits = credits;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStatus {
    Paid,
    Pending,
}

/// Fee position derived from a student record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    pub name: String,
    pub roll_no: String,
    pub total_fee: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub status: FeeStatus,
}

impl FeeSummary {
    pub fn for_student(student: &Student) -> Self {
        let pending = student.total_fee - student.paid_amount;
        Self {
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
            total_fee: student.total_fee,
            paid_amount: student.paid_amount,
            pending_amount: pending.max(0.0),
            status: if pending <= 0.0 {
                FeeStatus::Paid
            } else {
                FeeStatus::Pending
            },
        }
    }
}

/// Add a payment to the amount paid so far
pub fn record_payment(student: &mut Student, amount: f64) -> Result<()> {
    let total = student.paid_amount + amount;
    if !amount.is_finite() || amount <= 0.0 || !total.is_finite() || total > MAX_AMOUNT {
        return Err(Error::Validation("Invalid payment amount".to_string()));
    }
    student.paid_amount = total;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlacementStatus {
    #[default]
    #[serde(rename = "Not Placed")]
    NotPlaced,
    Placed,
    #[serde(rename = "Higher Studies")]
    HigherStudies,
}

impl fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementStatus::NotPlaced => write!(f, "Not Placed"),
            PlacementStatus::Placed => write!(f, "Placed"),
            PlacementStatus::HigherStudies => write!(f, "Higher Studies"),
        }
    }
}

impl FromStr for PlacementStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Not Placed" => Ok(PlacementStatus::NotPlaced),
            "Placed" => Ok(PlacementStatus::Placed),
            "Higher Studies" => Ok(PlacementStatus::HigherStudies),
            _ => Err(Error::Validation("Invalid placement status".to_string())),
        }
    }
}

/// Placement change requested by a student
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementUpdate {
    #[serde(default)]
    pub placement_status: String,
    pub company: Option<String>,
    pub package: Option<f64>,
}

impl PlacementUpdate {
    /// Company and package are only recorded for `Placed`; other statuses
    /// leave them as they were.
    pub fn apply(&self, student: &mut Student) -> Result<()> {
        let status: PlacementStatus = self.placement_status.parse()?;
        if status == PlacementStatus::Placed {
            if let Some(package) = self.package {
                validation::in_range("package", package, 0.0, MAX_AMOUNT)?;
            }
            student.company = self.company.clone();
            student.package = self.package;
        }
        student.placement_status = status;
        Ok(())
    }
}

/// Placement view returned to the student
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSummary {
    pub name: String,
    pub roll_no: String,
    pub placement_status: PlacementStatus,
    pub company: Option<String>,
    pub package: Option<f64>,
}

impl From<&Student> for PlacementSummary {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
            placement_status: student.placement_status,
            company: student.company.clone(),
            package: student.package,
        }
    }
}

/// Attendance view returned to the student
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub name: String,
    pub roll_no: String,
    pub attendance: Attendance,
}

impl From<&Student> for AttendanceSummary {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
            attendance: student.attendance,
        }
    }
}
