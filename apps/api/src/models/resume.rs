use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::analysis::{EntityField, MatchAssessment, StructuredEntities};

/// A persisted resume. Immutable after insert except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub filename: String,
    pub file_type: String,     // format of the stored artifact
    pub source_format: String, // format of the upload
    pub object_name: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
    pub content: String,
    pub user_id: i64,
    pub job_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewResume {
    pub filename: String,
    pub file_type: String,
    pub source_format: String,
    pub object_name: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
    pub content: String,
    pub user_id: i64,
    pub job_description: Option<String>,
}

/// Entity columns for one resume; list-shaped entities are stored as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStructuredResume {
    pub resume_id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub work_experience: Option<String>,
    pub projects: Option<String>,
}

impl NewStructuredResume {
    pub fn from_entities(resume_id: i64, user_id: i64, entities: StructuredEntities) -> Self {
        let column = |field: Option<EntityField>| field.as_ref().map(EntityField::to_column);
        Self {
            resume_id,
            user_id,
            name: entities.name,
            email: entities.email,
            phone: entities.phone,
            skills: column(entities.skills),
            education: column(entities.education),
            work_experience: column(entities.work_experience),
            projects: column(entities.projects),
        }
    }
}

/// Public shape of a resume returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub id: i64,
    pub filename: String,
    pub file_type: String,
    pub url: Option<String>,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_evaluation: Option<MatchAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
}

impl ResumeResponse {
    pub fn from_row(row: ResumeRow, url: Option<String>, match_evaluation: Option<MatchAssessment>) -> Self {
        Self {
            id: row.id,
            filename: row.filename,
            file_type: row.file_type,
            url,
            size: row.size_bytes,
            uploaded_at: row.uploaded_at,
            content: row.content,
            match_evaluation,
            job_description: row.job_description,
        }
    }
}
