//! In-memory record storage

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    admission_not_found, student_not_found, AdmissionStore, CredentialStore, PageQuery,
    DUPLICATE_EMAIL, DUPLICATE_ROLL_NO,
};
use crate::admissions::{Admission, AdmissionStatus};
use crate::error::{Error, Result};
use crate::students::{Student, StudentFilter, StudentUpdate};

#[derive(Default)]
struct Records {
    students: HashMap<String, Student>,
    admissions: HashMap<String, Admission>,
}

/// Store keeping every record in process memory.
///
/// One lock covers all records so a uniqueness check and the insert that
/// follows it cannot interleave with another insert.
pub struct MemoryStore {
    records: Arc<RwLock<Records>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Records::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

fn page_of<T: Clone>(items: Vec<&T>, page: PageQuery) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let items = items
        .into_iter()
        .skip(offset)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    (items, total)
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email_or_id(&self, identifier: &str) -> Result<Option<Student>> {
        let identifier = identifier.trim();
        let records = self.records.read().await;
        let students = &records.students;
        Ok(students
            .values()
            .find(|s| s.email.eq_ignore_ascii_case(identifier))
            .or_else(|| students.values().find(|s| s.roll_no == identifier))
            .or_else(|| students.get(identifier))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>> {
        Ok(self.records.read().await.students.get(id).cloned())
    }

    async fn insert(&self, student: Student) -> Result<Student> {
        let mut records = self.records.write().await;

        for existing in records.students.values() {
            if existing.email.eq_ignore_ascii_case(&student.email) {
                return Err(Error::DuplicateKey(DUPLICATE_EMAIL.to_string()));
            }
            if existing.roll_no == student.roll_no {
                return Err(Error::DuplicateKey(DUPLICATE_ROLL_NO.to_string()));
            }
        }
        if records.students.contains_key(&student.id) {
            return Err(Error::DuplicateKey(format!(
                "Student id {} already exists",
                student.id
            )));
        }

        records
            .students
            .insert(student.id.clone(), student.clone());
        Ok(student)
    }

    async fn update_by_id(&self, id: &str, update: StudentUpdate) -> Result<Student> {
        let mut records = self.records.write().await;
        let stored = records.students.get_mut(id).ok_or_else(student_not_found)?;

        // Apply to a copy so a rejected update leaves the record untouched
        let mut updated = stored.clone();
        update.apply(&mut updated)?;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn list(&self, filter: &StudentFilter, page: PageQuery) -> Result<(Vec<Student>, u64)> {
        let records = self.records.read().await;
        let mut matching: Vec<&Student> = records
            .students
            .values()
            .filter(|s| filter.matches(s))
            .collect();
        matching.sort_by(|a, b| a.roll_no.cmp(&b.roll_no));
        Ok(page_of(matching, page))
    }

    async fn all(&self) -> Result<Vec<Student>> {
        Ok(self.records.read().await.students.values().cloned().collect())
    }
}

#[async_trait]
impl AdmissionStore for MemoryStore {
    async fn insert(&self, admission: Admission) -> Result<Admission> {
        let mut records = self.records.write().await;
        if records.admissions.contains_key(&admission.id) {
            return Err(Error::DuplicateKey(format!(
                "Application {} already exists",
                admission.id
            )));
        }
        records
            .admissions
            .insert(admission.id.clone(), admission.clone());
        Ok(admission)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Admission>> {
        Ok(self.records.read().await.admissions.get(id).cloned())
    }

    async fn list(
        &self,
        status: Option<AdmissionStatus>,
        page: PageQuery,
    ) -> Result<(Vec<Admission>, u64)> {
        let records = self.records.read().await;
        let mut matching: Vec<&Admission> = records
            .admissions
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(page_of(matching, page))
    }

    async fn update_status(&self, id: &str, status: AdmissionStatus) -> Result<Admission> {
        let mut records = self.records.write().await;
        let admission = records
            .admissions
            .get_mut(id)
            .ok_or_else(admission_not_found)?;
        admission.status = status;
        admission.updated_at = Utc::now();
        Ok(admission.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records
            .write()
            .await
            .admissions
            .remove(id)
            .map(|_| ())
            .ok_or_else(admission_not_found)
    }

    async fn all(&self) -> Result<Vec<Admission>> {
        Ok(self
            .records
            .read()
            .await
            .admissions
            .values()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admissions::ApplicationForm;
    use crate::students::fixtures::student;
    use crate::students::ProfileUpdate;

    fn application(name: &str) -> Admission {
        ApplicationForm {
            name: name.to_string(),
            email: "applicant@example.com".to_string(),
            contact: "9000000000".to_string(),
            course: "MBA".to_string(),
            ..Default::default()
        }
        .into_admission()
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        let s = CredentialStore::insert(&store, student("a@b.com", "R1"))
            .await
            .unwrap();

        let by_email = store.find_by_email_or_id("A@B.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, s.id);
        let by_roll = store.find_by_email_or_id("R1").await.unwrap().unwrap();
        assert_eq!(by_roll.id, s.id);
        let by_id = store.find_by_email_or_id(&s.id).await.unwrap().unwrap();
        assert_eq!(by_id.roll_no, "R1");
        assert!(store.find_by_email_or_id("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_match_wins_over_roll_number() {
        for _ in 0..8 {
            let store = MemoryStore::new();
            let owner = CredentialStore::insert(&store, student("owner@b.com", "R1"))
                .await
                .unwrap();
            CredentialStore::insert(&store, student("other@b.com", "owner@b.com"))
                .await
                .unwrap();

            let found = store.find_by_email_or_id("owner@b.com").await.unwrap().unwrap();
            assert_eq!(found.id, owner.id);
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_and_roll_no() {
        let store = MemoryStore::new();
        CredentialStore::insert(&store, student("a@b.com", "R1"))
            .await
            .unwrap();

        let err = CredentialStore::insert(&store, student("a@b.com", "R2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(msg) if msg == DUPLICATE_EMAIL));

        let err = CredentialStore::insert(&store, student("c@d.com", "R1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(msg) if msg == DUPLICATE_ROLL_NO));

        assert_eq!(CredentialStore::all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_inserts() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                CredentialStore::insert(&store, student("same@b.com", &format!("R{}", i))).await
            }));
        }

        let mut ok = 0;
        let mut duplicate = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(Error::DuplicateKey(_)) => duplicate += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(duplicate, 15);
    }

    #[tokio::test]
    async fn test_update_missing_student() {
        let store = MemoryStore::new();
        let err = store
            .update_by_id("missing", StudentUpdate::Payment(5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_record() {
        let store = MemoryStore::new();
        let s = CredentialStore::insert(&store, student("a@b.com", "R1"))
            .await
            .unwrap();

        let update = StudentUpdate::Profile(ProfileUpdate {
            phone: Some("000".to_string()),
            current_cgpa: Some(42.0),
            ..Default::default()
        });
        assert!(store.update_by_id(&s.id, update).await.is_err());

        let stored = CredentialStore::find_by_id(&store, &s.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.phone.as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn test_list_sorted_and_paged() {
        let store = MemoryStore::new();
        for (i, roll) in ["R3", "R1", "R2"].iter().enumerate() {
            let mut s = student(&format!("s{}@b.com", i), roll);
            if *roll == "R2" {
                s.department = "Mechanical".to_string();
            }
            CredentialStore::insert(&store, s).await.unwrap();
        }

        let page = PageQuery {
            page: Some(1),
            limit: Some(2),
        };
        let (students, total) = CredentialStore::list(&store, &StudentFilter::default(), page)
            .await
            .unwrap();
        assert_eq!(total, 3);
        let rolls: Vec<_> = students.iter().map(|s| s.roll_no.as_str()).collect();
        assert_eq!(rolls, vec!["R1", "R2"]);

        let filter = StudentFilter {
            department: Some("Computer Science".to_string()),
            year: None,
        };
        let (students, total) = CredentialStore::list(&store, &filter, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(students.iter().all(|s| s.department == "Computer Science"));
    }

    #[tokio::test]
    async fn test_admission_lifecycle() {
        let store = MemoryStore::new();
        let first = AdmissionStore::insert(&store, application("First"))
            .await
            .unwrap();
        let mut second = application("Second");
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        let second = AdmissionStore::insert(&store, second).await.unwrap();

        let (listed, total) = AdmissionStore::list(&store, None, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(listed[0].id, second.id);

        let approved = store
            .update_status(&first.id, AdmissionStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, AdmissionStatus::Approved);

        let (pending, total) =
            AdmissionStore::list(&store, Some(AdmissionStatus::Pending), PageQuery::default())
                .await
                .unwrap();
        assert_eq!(total, 1);
        assert_eq!(pending[0].id, second.id);

        store.delete(&first.id).await.unwrap();
        assert!(AdmissionStore::find_by_id(&store, &first.id)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            store.delete(&first.id).await,
            Err(Error::NotFound(_))
        ));
    }
}
