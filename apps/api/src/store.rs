//! Relational persistence for resumes and their extracted entities.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{NewResume, NewStructuredResume, ResumeRow};

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Single atomic insert; returns the stored row with its assigned id.
    async fn insert_resume(&self, resume: NewResume) -> Result<ResumeRow, sqlx::Error>;

    async fn insert_structured(&self, entities: NewStructuredResume) -> Result<i64, sqlx::Error>;

    async fn find_resume(&self, id: i64) -> Result<Option<ResumeRow>, sqlx::Error>;

    /// Newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ResumeRow>, sqlx::Error>;

    /// Returns false when no row matched.
    async fn delete_resume(&self, id: i64) -> Result<bool, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgResumeStore {
    db: PgPool,
}

impl PgResumeStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert_resume(&self, resume: NewResume) -> Result<ResumeRow, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO resumes
                (filename, file_type, source_format, object_name, size_bytes,
                 uploaded_at, content, user_id, job_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&resume.filename)
        .bind(&resume.file_type)
        .bind(&resume.source_format)
        .bind(&resume.object_name)
        .bind(resume.size_bytes)
        .bind(resume.uploaded_at)
        .bind(&resume.content)
        .bind(resume.user_id)
        .bind(&resume.job_description)
        .fetch_one(&self.db)
        .await
    }

    async fn insert_structured(&self, entities: NewStructuredResume) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO structured_resumes
                (resume_id, user_id, name, email, phone,
                 skills, education, work_experience, projects)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(entities.resume_id)
        .bind(entities.user_id)
        .bind(&entities.name)
        .bind(&entities.email)
        .bind(&entities.phone)
        .bind(&entities.skills)
        .bind(&entities.education)
        .bind(&entities.work_experience)
        .bind(&entities.projects)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn find_resume(&self, id: i64) -> Result<Option<ResumeRow>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ResumeRow>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM resumes WHERE user_id = $1 ORDER BY uploaded_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(&self.db)
            .await
    }

    async fn delete_resume(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
