//! Record persistence
//!
//! Handlers talk to the [`CredentialStore`] and [`AdmissionStore`] traits.
//! Two backends implement both: an in-process [`MemoryStore`] and a
//! [`PostgresStore`] that keeps each record as a JSONB document next to its
//! unique keys.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::admissions::{Admission, AdmissionStatus};
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::students::{Student, StudentFilter, StudentUpdate};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

pub(crate) const DUPLICATE_EMAIL: &str = "Student with this email already exists";
pub(crate) const DUPLICATE_ROLL_NO: &str = "Student with this roll number already exists";
pub(crate) const STUDENT_NOT_FOUND: &str = "Student not found";
pub(crate) const ADMISSION_NOT_FOUND: &str = "Application not found";

/// Paging parameters as they arrive on a query string
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        let limit = self.limit();
        Pagination {
            page: self.page(),
            limit,
            total,
            pages: total.div_ceil(u64::from(limit)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

/// Student records, which double as login credentials.
///
/// Implementations must reject a second record sharing an email or roll
/// number atomically, even when two inserts race.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look a student up by email, then roll number, then id. An email match
    /// wins over another record's roll number.
    async fn find_by_email_or_id(&self, identifier: &str) -> Result<Option<Student>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>>;

    /// Store a new student; duplicates fail with `DuplicateKey`
    async fn insert(&self, student: Student) -> Result<Student>;

    /// Apply `update` to the stored record and return the result
    async fn update_by_id(&self, id: &str, update: StudentUpdate) -> Result<Student>;

    /// One page of students ordered by roll number, plus the filtered total
    async fn list(&self, filter: &StudentFilter, page: PageQuery) -> Result<(Vec<Student>, u64)>;

    async fn all(&self) -> Result<Vec<Student>>;
}

/// Admission applications
#[async_trait]
pub trait AdmissionStore: Send + Sync {
    async fn insert(&self, admission: Admission) -> Result<Admission>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Admission>>;

    /// One page of applications, newest first, plus the filtered total
    async fn list(
        &self,
        status: Option<AdmissionStatus>,
        page: PageQuery,
    ) -> Result<(Vec<Admission>, u64)>;

    async fn update_status(&self, id: &str, status: AdmissionStatus) -> Result<Admission>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn all(&self) -> Result<Vec<Admission>>;
}

/// Both stores behind one backend
#[derive(Clone)]
pub struct Stores {
    pub students: Arc<dyn CredentialStore>,
    pub admissions: Arc<dyn AdmissionStore>,
    pub backend: &'static str,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            students: store.clone(),
            admissions: store,
            backend: "memory",
        }
    }

    /// Connect to the configured backend
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match config.url() {
            Some(url) => {
                let store = Arc::new(PostgresStore::connect(url).await?);
                Ok(Self {
                    students: store.clone(),
                    admissions: store,
                    backend: "postgres",
                })
            }
            None => {
                tracing::warn!("No database configured; records are kept in memory");
                Ok(Self::memory())
            }
        }
    }
}

pub(crate) fn student_not_found() -> Error {
    Error::NotFound(STUDENT_NOT_FOUND.to_string())
}

pub(crate) fn admission_not_found() -> Error {
    Error::NotFound(ADMISSION_NOT_FOUND.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = PageQuery::default();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_clamps() {
        let page = PageQuery {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 100);

        let page = PageQuery {
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn test_pagination_pages() {
        let page = PageQuery {
            page: Some(1),
            limit: Some(10),
        };
        assert_eq!(page.pagination(0).pages, 0);
        assert_eq!(page.pagination(10).pages, 1);
        assert_eq!(page.pagination(11).pages, 2);
    }
}
