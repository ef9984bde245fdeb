//! Read/delete operations over already-ingested resumes.

use std::time::Duration;

use anyhow::anyhow;
use serde::Serialize;
use tracing::{info, warn};

use crate::clients::ResumeDocument;
use crate::errors::AppError;
use crate::ingestion::Collaborators;
use crate::models::{ResumeResponse, ResumeRow};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub download_url: String,
    pub filename: String,
}

pub struct ResumeLibrary {
    services: Collaborators,
    link_ttl: Duration,
}

impl ResumeLibrary {
    pub fn new(services: Collaborators, link_ttl: Duration) -> Self {
        Self { services, link_ttl }
    }

    /// The caller's resumes, newest first, each with a fresh access link.
    pub async fn list_user_resumes(&self, credential: &str) -> Result<Vec<ResumeResponse>, AppError> {
        let user_id = self
            .services
            .identity
            .resolve_user_id(credential)
            .await
            .map_err(|e| AppError::IdentityResolutionFailed(e.to_string()))?;

        let rows = self.services.store.list_for_user(user_id).await?;
        let mut resumes = Vec::with_capacity(rows.len());
        for row in rows {
            let url = self.link_for(&row).await;
            resumes.push(ResumeResponse::from_row(row, url, None));
        }
        Ok(resumes)
    }

    pub async fn download_link(&self, id: i64) -> Result<DownloadLink, AppError> {
        let row = self.find(id).await?;
        let download_url = self
            .services
            .objects
            .access_link(&row.object_name, self.link_ttl)
            .await
            .map_err(AppError::Internal)?;
        Ok(DownloadLink {
            download_url,
            filename: row.filename,
        })
    }

    /// Removes the stored object, the record and the search entry. Object and index cleanup are
    /// best effort; the record delete is authoritative.
    pub async fn delete_resume(&self, id: i64) -> Result<(), AppError> {
        let row = self.find(id).await?;

        if let Err(e) = self.services.objects.delete(&row.object_name).await {
            warn!("Failed to delete object {} for resume {id}: {e:#}", row.object_name);
        }
        if !self.services.store.delete_resume(id).await? {
            return Err(AppError::NotFound(format!("Resume {id} not found")));
        }
        if let Err(e) = self.services.search.delete_by_id(&id.to_string()).await {
            warn!("Failed to remove resume {id} from the search index: {e:#}");
        }

        info!("Deleted resume {id}");
        Ok(())
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<ResumeDocument>, AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        self.services
            .search
            .query(keyword)
            .await
            .map_err(|e| AppError::Internal(anyhow!("search failed: {e:#}")))
    }

    async fn find(&self, id: i64) -> Result<ResumeRow, AppError> {
        self.services
            .store
            .find_resume(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
    }

    async fn link_for(&self, row: &ResumeRow) -> Option<String> {
        match self
            .services
            .objects
            .access_link(&row.object_name, self.link_ttl)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Access link for resume {} failed: {e:#}", row.id);
                None
            }
        }
    }
}
