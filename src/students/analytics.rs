//! Dashboard statistics over student and admission records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PlacementStatus, Student};
use crate::admissions::{Admission, AdmissionStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_students: usize,
    pub total_applications: usize,
    pub students: StudentTotals,
    pub admissions: AdmissionTotals,
    pub departments: Vec<DepartmentStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentTotals {
    pub total: usize,
    pub placed: usize,
    pub not_placed: usize,
    /// Percentage of students placed, two decimals
    pub placement_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdmissionTotals {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub department: String,
    pub count: usize,
    #[serde(rename = "avgCGPA")]
    pub avg_cgpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnalytics {
    pub cgpa_distribution: Vec<Bucket>,
    pub attendance_distribution: Vec<Bucket>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn dashboard(students: &[Student], admissions: &[Admission]) -> Dashboard {
    let placed = students
        .iter()
        .filter(|s| s.placement_status == PlacementStatus::Placed)
        .count();
    let not_placed = students
        .iter()
        .filter(|s| s.placement_status == PlacementStatus::NotPlaced)
        .count();
    let placement_rate = if students.is_empty() {
        0.0
    } else {
        round2(placed as f64 / students.len() as f64 * 100.0)
    };

    let mut admission_totals = AdmissionTotals {
        total: admissions.len(),
        ..Default::default()
    };
    for admission in admissions {
        match admission.status {
            AdmissionStatus::Pending => admission_totals.pending += 1,
            AdmissionStatus::Approved => admission_totals.approved += 1,
            AdmissionStatus::Rejected => admission_totals.rejected += 1,
        }
    }

    Dashboard {
        total_students: students.len(),
        total_applications: admissions.len(),
        students: StudentTotals {
            total: students.len(),
            placed,
            not_placed,
            placement_rate,
        },
        admissions: admission_totals,
        departments: department_stats(students),
    }
}

/// Head count and mean CGPA per department, ordered by department name
pub fn department_stats(students: &[Student]) -> Vec<DepartmentStats> {
    let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for student in students {
        let entry = groups.entry(student.department.as_str()).or_default();
        entry.0 += 1;
        entry.1 += student.current_cgpa;
    }

    groups
        .into_iter()
        .map(|(department, (count, cgpa_sum))| DepartmentStats {
            department: department.to_string(),
            count,
            avg_cgpa: round2(cgpa_sum / count as f64),
        })
        .collect()
}

const CGPA_BANDS: [(f64, &str); 4] = [
    (9.0, "Excellent (9.0+)"),
    (8.0, "Very Good (8.0-8.9)"),
    (7.0, "Good (7.0-7.9)"),
    (6.0, "Average (6.0-6.9)"),
];
const CGPA_FLOOR: &str = "Below Average (<6.0)";

const ATTENDANCE_BANDS: [(f64, &str); 3] = [
    (90.0, "Excellent (90%+)"),
    (80.0, "Good (80-89%)"),
    (70.0, "Average (70-79%)"),
];
const ATTENDANCE_FLOOR: &str = "Poor (<70%)";

fn band(value: f64, bands: &[(f64, &'static str)], floor: &'static str) -> &'static str {
    bands
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, label)| *label)
        .unwrap_or(floor)
}

/// Count values per band; empty bands are left out
fn distribution(
    values: impl Iterator<Item = f64>,
    bands: &[(f64, &'static str)],
    floor: &'static str,
) -> Vec<Bucket> {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(band(value, bands, floor)).or_default() += 1;
    }

    bands
        .iter()
        .map(|(_, label)| *label)
        .chain(std::iter::once(floor))
        .filter_map(|label| {
            counts.get(label).map(|count| Bucket {
                label: label.to_string(),
                count: *count,
            })
        })
        .collect()
}

pub fn student_analytics(students: &[Student]) -> StudentAnalytics {
    StudentAnalytics {
        cgpa_distribution: distribution(
            students.iter().map(|s| s.current_cgpa),
            &CGPA_BANDS,
            CGPA_FLOOR,
        ),
        attendance_distribution: distribution(
            students.iter().map(|s| s.attendance.percentage),
            &ATTENDANCE_BANDS,
            ATTENDANCE_FLOOR,
        ),
    }
}
