use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::clients::ResumeDocument;
use crate::errors::AppError;
use crate::ingestion::{DocumentUpload, DownloadLink, IngestRequest};
use crate::models::ResumeResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// POST /api/resumes/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ResumeResponse>, AppError> {
    let credential = bearer_credential(&headers)?;
    let mut form = read_form(multipart).await?;

    let document = form
        .take_file("file")
        .ok_or_else(|| AppError::Validation("multipart part 'file' is required".to_string()))?;

    let response = state
        .coordinator
        .ingest(IngestRequest {
            document,
            job_description: form.job_description,
            credential,
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/resumes/compare-resumes
pub async fn handle_compare(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = read_form(multipart).await?;
    let (Some(first), Some(second)) = (form.take_file("file1"), form.take_file("file2")) else {
        return Err(AppError::Validation(
            "multipart parts 'file1' and 'file2' are required".to_string(),
        ));
    };

    let comparison = state
        .coordinator
        .compare_two_documents(first, second, form.job_description)
        .await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], comparison).into_response())
}

/// GET /api/resumes/user
pub async fn handle_list_user_resumes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ResumeResponse>>, AppError> {
    let credential = bearer_credential(&headers)?;
    Ok(Json(state.library.list_user_resumes(&credential).await?))
}

/// GET /api/resumes/:id/download
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DownloadLink>, AppError> {
    Ok(Json(state.library.download_link(id).await?))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.library.delete_resume(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/resumes/search?q=
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ResumeDocument>>, AppError> {
    Ok(Json(state.library.search(&params.q).await?))
}

fn bearer_credential(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Unauthorized)
}

#[derive(Default)]
struct UploadForm {
    files: Vec<(String, DocumentUpload)>,
    job_description: Option<String>,
}

impl UploadForm {
    fn take_file(&mut self, part: &str) -> Option<DocumentUpload> {
        let index = self.files.iter().position(|(name, _)| name == part)?;
        Some(self.files.remove(index).1)
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobDescription" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid jobDescription: {e}")))?;
                form.job_description = Some(text);
            }
            "file" | "file1" | "file2" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid file part '{name}': {e}")))?;
                form.files.push((name, DocumentUpload { filename, content }));
            }
            _ => {}
        }
    }

    Ok(form)
}
