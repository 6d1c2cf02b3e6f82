//! PostgreSQL record storage

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio_postgres::{error::SqlState, Client, NoTls, Row};

use super::{
    admission_not_found, student_not_found, AdmissionStore, CredentialStore, PageQuery,
    DUPLICATE_EMAIL, DUPLICATE_ROLL_NO,
};
use crate::admissions::{Admission, AdmissionStatus};
use crate::error::{Error, Result};
use crate::students::{Student, StudentFilter, StudentUpdate};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL,
    roll_no TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    department TEXT NOT NULL,
    year INTEGER NOT NULL,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT students_email_key UNIQUE (email),
    CONSTRAINT students_roll_no_key UNIQUE (roll_no)
);

CREATE TABLE IF NOT EXISTS admissions (
    id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
"#;

const STUDENT_FILTER: &str =
    "($1::TEXT IS NULL OR department = $1) AND ($2::INTEGER IS NULL OR year = $2)";

/// Store backed by PostgreSQL.
///
/// Records live in a JSONB `data` column; the unique keys and filter fields
/// are mirrored into plain columns so the database enforces uniqueness.
pub struct PostgresStore {
    client: Mutex<Client>,
}

impl PostgresStore {
    /// Connect and make sure the tables exist
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        client.batch_execute(SCHEMA).await?;
        tracing::info!("Connected to PostgreSQL record store");

        Ok(Self {
            client: Mutex::new(client),
        })
    }
}

fn student_from_row(row: &Row) -> Result<Student> {
    let data: serde_json::Value = row.try_get("data")?;
    let mut student: Student = serde_json::from_value(data)?;
    student.password_hash = row.try_get("password_hash")?;
    Ok(student)
}

fn admission_from_row(row: &Row) -> Result<Admission> {
    let data: serde_json::Value = row.try_get("data")?;
    Ok(serde_json::from_value(data)?)
}

fn year_param(year: u32) -> Result<i32> {
    i32::try_from(year).map_err(|_| Error::Validation(format!("Invalid year: {}", year)))
}

fn page_params(page: PageQuery) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (i64::from(page.limit()), offset)
}

/// Turn unique-constraint violations into `DuplicateKey`
fn map_unique_violation(err: tokio_postgres::Error) -> Error {
    if let Some(db) = err.as_db_error() {
        if *db.code() == SqlState::UNIQUE_VIOLATION {
            let message = match db.constraint() {
                Some("students_email_key") => DUPLICATE_EMAIL.to_string(),
                Some("students_roll_no_key") => DUPLICATE_ROLL_NO.to_string(),
                other => format!(
                    "Record already exists ({})",
                    other.unwrap_or("unique constraint")
                ),
            };
            return Error::DuplicateKey(message);
        }
    }
    Error::Database(err)
}

#[async_trait]
impl CredentialStore for PostgresStore {
    async fn find_by_email_or_id(&self, identifier: &str) -> Result<Option<Student>> {
        let identifier = identifier.trim();
        let client = self.client.lock().await;
        let row = client
            .query_opt(
                "SELECT data, password_hash FROM students \
                 WHERE email = lower($1) OR roll_no = $1 OR id = $1 \
                 ORDER BY (email = lower($1)) DESC, (roll_no = $1) DESC LIMIT 1",
                &[&identifier],
            )
            .await?;
        row.as_ref().map(student_from_row).transpose()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>> {
        let client = self.client.lock().await;
        let row = client
            .query_opt(
                "SELECT data, password_hash FROM students WHERE id = $1",
                &[&id],
            )
            .await?;
        row.as_ref().map(student_from_row).transpose()
    }

    async fn insert(&self, student: Student) -> Result<Student> {
        let data = serde_json::to_value(&student)?;
        let year = year_param(student.year)?;
        let email = student.email.to_lowercase();

        let client = self.client.lock().await;
        client
            .execute(
                "INSERT INTO students (id, email, roll_no, password_hash, department, year, data, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &student.id,
                    &email,
                    &student.roll_no,
                    &student.password_hash,
                    &student.department,
                    &year,
                    &data,
                    &student.created_at,
                ],
            )
            .await
            .map_err(map_unique_violation)?;

        tracing::debug!("Inserted student {}", student.id);
        Ok(student)
    }

    async fn update_by_id(&self, id: &str, update: StudentUpdate) -> Result<Student> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await?;

        let row = tx
            .query_opt(
                "SELECT data, password_hash FROM students WHERE id = $1 FOR UPDATE",
                &[&id],
            )
            .await?;
        let mut student = row
            .as_ref()
            .map(student_from_row)
            .transpose()?
            .ok_or_else(student_not_found)?;

        update.apply(&mut student)?;

        let data = serde_json::to_value(&student)?;
        tx.execute(
            "UPDATE students SET data = $2 WHERE id = $1",
            &[&id, &data],
        )
        .await?;
        tx.commit().await?;

        Ok(student)
    }

    async fn list(&self, filter: &StudentFilter, page: PageQuery) -> Result<(Vec<Student>, u64)> {
        let year = filter.year.map(year_param).transpose()?;
        let (limit, offset) = page_params(page);
        let count_sql = format!("SELECT COUNT(*) FROM students WHERE {}", STUDENT_FILTER);
        let page_sql = format!(
            "SELECT data, password_hash FROM students WHERE {} \
             ORDER BY roll_no LIMIT $3 OFFSET $4",
            STUDENT_FILTER
        );

        let client = self.client.lock().await;
        let total: i64 = client
            .query_one(count_sql.as_str(), &[&filter.department, &year])
            .await?
            .try_get(0)?;
        let rows = client
            .query(
                page_sql.as_str(),
                &[&filter.department, &year, &limit, &offset],
            )
            .await?;

        let students = rows.iter().map(student_from_row).collect::<Result<Vec<_>>>()?;
        Ok((students, u64::try_from(total).unwrap_or_default()))
    }

    async fn all(&self) -> Result<Vec<Student>> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT data, password_hash FROM students ORDER BY roll_no",
                &[],
            )
            .await?;
        rows.iter().map(student_from_row).collect()
    }
}

#[async_trait]
impl AdmissionStore for PostgresStore {
    async fn insert(&self, admission: Admission) -> Result<Admission> {
        let data = serde_json::to_value(&admission)?;
        let status = admission.status.to_string();

        let client = self.client.lock().await;
        client
            .execute(
                "INSERT INTO admissions (id, status, data, created_at) VALUES ($1, $2, $3, $4)",
                &[&admission.id, &status, &data, &admission.created_at],
            )
            .await
            .map_err(map_unique_violation)?;
        Ok(admission)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Admission>> {
        let client = self.client.lock().await;
        let row = client
            .query_opt("SELECT data FROM admissions WHERE id = $1", &[&id])
            .await?;
        row.as_ref().map(admission_from_row).transpose()
    }

    async fn list(
        &self,
        status: Option<AdmissionStatus>,
        page: PageQuery,
    ) -> Result<(Vec<Admission>, u64)> {
        let status = status.map(|s| s.to_string());
        let (limit, offset) = page_params(page);

        let client = self.client.lock().await;
        let total: i64 = client
            .query_one(
                "SELECT COUNT(*) FROM admissions WHERE ($1::TEXT IS NULL OR status = $1)",
                &[&status],
            )
            .await?
            .try_get(0)?;
        let rows = client
            .query(
                "SELECT data FROM admissions WHERE ($1::TEXT IS NULL OR status = $1) \
                 ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
                &[&status, &limit, &offset],
            )
            .await?;

        let admissions = rows
            .iter()
            .map(admission_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok((admissions, u64::try_from(total).unwrap_or_default()))
    }

    async fn update_status(&self, id: &str, status: AdmissionStatus) -> Result<Admission> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await?;

        let row = tx
            .query_opt("SELECT data FROM admissions WHERE id = $1 FOR UPDATE", &[&id])
            .await?;
        let mut admission = row
            .as_ref()
            .map(admission_from_row)
            .transpose()?
            .ok_or_else(admission_not_found)?;

        admission.status = status;
        admission.updated_at = Utc::now();
        let data = serde_json::to_value(&admission)?;
        let status = status.to_string();
        tx.execute(
            "UPDATE admissions SET status = $2, data = $3 WHERE id = $1",
            &[&id, &status, &data],
        )
        .await?;
        tx.commit().await?;

        Ok(admission)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let client = self.client.lock().await;
        let deleted = client
            .execute("DELETE FROM admissions WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(admission_not_found());
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Admission>> {
        let client = self.client.lock().await;
        let rows = client
            .query("SELECT data FROM admissions ORDER BY created_at DESC", &[])
            .await?;
        rows.iter().map(admission_from_row).collect()
    }
}
