//! Ingestion pipeline: one uploaded resume in, one persisted record plus derived artifacts out.
//!
//! Stages run strictly in order on the request task:
//!   validate → extract → resolve identity → evaluate → optimize → render → persist
//!   → analytics (detached) → structured entities → upload + index (detached) → respond
//!
//! Only validation, extraction, identity and the persist write are fatal. The record insert is the
//! durability boundary: everything after it degrades and logs instead of failing the call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{
    parse_match_assessment, parse_structured_entities, MatchAssessment, MatchEvaluator,
    ResumeOptimizer, StructuredDataExtractor,
};
use crate::clients::{
    AnalyticsEvent, AnalyticsSink, IdentityResolver, ObjectStore, ResumeDocument, SearchIndex,
};
use crate::errors::AppError;
use crate::extraction::{extract_text, DocumentFormat};
use crate::ingestion::side_effects::{BackgroundTasks, SideEffectError};
use crate::llm_client::{strip_json_fences, Completer};
use crate::models::{NewResume, NewStructuredResume, ResumeResponse, ResumeRow};
use crate::render::{render_pdf, render_plain_text};
use crate::store::ResumeStore;

/// Format of every stored artifact.
const ARTIFACT_FORMAT: DocumentFormat = DocumentFormat::Pdf;

/// The external services the pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityResolver>,
    pub store: Arc<dyn ResumeStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub search: Arc<dyn SearchIndex>,
    pub analytics: Arc<dyn AnalyticsSink>,
}

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub content: Bytes,
}

#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub document: DocumentUpload,
    pub job_description: Option<String>,
    pub credential: String,
}

pub struct IngestionCoordinator {
    evaluator: MatchEvaluator,
    optimizer: ResumeOptimizer,
    structured: StructuredDataExtractor,
    services: Collaborators,
    tasks: BackgroundTasks,
    link_ttl: Duration,
}

impl IngestionCoordinator {
    pub fn new(
        completer: Arc<dyn Completer>,
        services: Collaborators,
        tasks: BackgroundTasks,
        link_ttl: Duration,
    ) -> Self {
        Self {
            evaluator: MatchEvaluator::new(completer.clone()),
            optimizer: ResumeOptimizer::new(completer.clone()),
            structured: StructuredDataExtractor::new(completer),
            services,
            tasks,
            link_ttl,
        }
    }

    pub async fn ingest(&self, request: IngestRequest) -> Result<ResumeResponse, AppError> {
        let IngestRequest {
            document,
            job_description,
            credential,
        } = request;
        let mut timer = StageTimer::new(&document.filename);

        let format = DocumentFormat::from_filename(&document.filename)?;
        timer.lap("validate");

        let text = extract_text(document.content.clone(), format).await?;
        if text.trim().is_empty() {
            return Err(AppError::EmptyDocument);
        }
        timer.lap("extract");

        let user_id = self
            .services
            .identity
            .resolve_user_id(&credential)
            .await
            .map_err(|e| AppError::IdentityResolutionFailed(e.to_string()))?;
        timer.lap("identity");

        let job_description = job_description.filter(|jd| !jd.trim().is_empty());
        let assessment = match &job_description {
            Some(jd) => self.evaluate(&text, jd).await,
            None => None,
        };
        timer.lap("evaluate");

        let markup = match &assessment {
            Some(a) if !a.weaknesses.is_empty() => {
                self.optimizer.expand_for_weaknesses(&text, &a.weaknesses).await
            }
            _ => self.optimizer.optimize(&text).await,
        };
        timer.lap("optimize");

        let artifact = render_artifact(markup, text.clone()).await?;
        timer.lap("render");

        let object_name = artifact_object_name(&document.filename);
        let row = self
            .services
            .store
            .insert_resume(NewResume {
                filename: document.filename.clone(),
                file_type: ARTIFACT_FORMAT.as_str().to_string(),
                source_format: format.as_str().to_string(),
                object_name: object_name.clone(),
                size_bytes: artifact.len() as i64,
                uploaded_at: Utc::now(),
                content: text,
                user_id,
                job_description,
            })
            .await
            .map_err(|e| AppError::StorageWriteFailed(e.to_string()))?;
        timer.lap("persist");

        if let Some(assessment) = &assessment {
            self.dispatch_analytics(&row, assessment);
        }

        self.persist_structured(&row).await;
        timer.lap("structured");

        self.dispatch_upload(&object_name, artifact);
        self.dispatch_index(&row, &object_name);

        let url = match self
            .services
            .objects
            .access_link(&object_name, self.link_ttl)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Resume {} stored but access link failed: {e:#}", row.id);
                None
            }
        };
        timer.lap("respond");
        info!(
            "Ingested resume {} for user {} in {}ms",
            row.id,
            user_id,
            timer.total_ms()
        );

        Ok(ResumeResponse::from_row(row, url, assessment))
    }

    /// Extracts both documents and returns the model's comparison JSON.
    pub async fn compare_two_documents(
        &self,
        first: DocumentUpload,
        second: DocumentUpload,
        job_description: Option<String>,
    ) -> Result<String, AppError> {
        let first_format = DocumentFormat::from_filename(&first.filename)?;
        let second_format = DocumentFormat::from_filename(&second.filename)?;

        let first_text = extract_text(first.content, first_format).await?;
        let second_text = extract_text(second.content, second_format).await?;
        if first_text.is_empty() || second_text.is_empty() {
            return Err(AppError::EmptyDocument);
        }

        let started = Instant::now();
        let comparison = self
            .evaluator
            .compare_two_resumes(&first_text, &second_text, job_description.as_deref())
            .await;
        info!(
            "Compared '{}' with '{}' in {}ms",
            first.filename,
            second.filename,
            started.elapsed().as_millis()
        );

        let comparison = strip_json_fences(&comparison);
        if comparison.is_empty() {
            return Err(AppError::Internal(anyhow!("comparison produced no result")));
        }
        Ok(comparison.to_string())
    }

    async fn evaluate(&self, text: &str, job_description: &str) -> Option<MatchAssessment> {
        let raw = self.evaluator.evaluate_match(text, job_description).await;
        match parse_match_assessment(&raw) {
            Ok(assessment) => Some(assessment),
            Err(e) => {
                warn!("Match assessment unusable, continuing without it: {e}");
                None
            }
        }
    }

    /// Best effort. Every chunk is sent, only the first chunk's entities are kept.
    async fn persist_structured(&self, row: &ResumeRow) {
        let results = self.structured.extract_chunks(&row.content).await;
        let Some(first) = results.first() else {
            warn!("No structured entities extracted for resume {}", row.id);
            return;
        };
        if results.len() > 1 {
            info!(
                "Resume {} produced {} entity chunks, keeping the first",
                row.id,
                results.len()
            );
        }

        let entities = match parse_structured_entities(first) {
            Ok(entities) => entities,
            Err(e) => {
                warn!("Structured entities for resume {} unusable: {e}", row.id);
                return;
            }
        };

        let structured = NewStructuredResume::from_entities(row.id, row.user_id, entities);
        if let Err(e) = self.services.store.insert_structured(structured).await {
            warn!("Failed to save structured entities for resume {}: {e}", row.id);
        }
    }

    fn dispatch_analytics(&self, row: &ResumeRow, assessment: &MatchAssessment) {
        let event = AnalyticsEvent::from_assessment(
            row.user_id,
            row.id,
            &row.filename,
            row.job_description.as_deref().unwrap_or_default(),
            row.uploaded_at,
            assessment,
        );
        let analytics = self.services.analytics.clone();
        let resume_id = row.id;

        self.tasks.spawn("analytics", async move {
            analytics
                .emit(&event)
                .await
                .map_err(|e| SideEffectError::AnalyticsEmitFailed {
                    resume_id,
                    reason: format!("{e:#}"),
                })
        });
    }

    fn dispatch_upload(&self, object_name: &str, artifact: Vec<u8>) {
        let objects = self.services.objects.clone();
        let object_id = object_name.to_string();

        self.tasks.spawn("upload", async move {
            objects
                .put(&object_id, artifact, ARTIFACT_FORMAT.content_type())
                .await
                .map_err(|e| SideEffectError::StorageWriteFailed {
                    object_id: object_id.clone(),
                    reason: format!("{e:#}"),
                })
        });
    }

    fn dispatch_index(&self, row: &ResumeRow, object_name: &str) {
        let search = self.services.search.clone();
        let document = ResumeDocument {
            id: row.id.to_string(),
            filename: row.filename.clone(),
            file_type: row.file_type.clone(),
            content: row.content.clone(),
            url: self.services.objects.object_url(object_name),
            uploaded_at: row.uploaded_at.timestamp_millis(),
        };
        let resume_id = row.id;

        self.tasks.spawn("index", async move {
            search
                .upsert(&document)
                .await
                .map_err(|e| SideEffectError::IndexWriteFailed {
                    resume_id,
                    reason: format!("{e:#}"),
                })
        });
    }
}

/// Renders the optimized markup, falling back to the extracted text when the markup is unusable.
async fn render_artifact(markup: String, text: String) -> Result<Vec<u8>, AppError> {
    tokio::task::spawn_blocking(move || match render_pdf(&markup) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            warn!("Optimized markup not renderable ({e}), rendering extracted text instead");
            render_plain_text(&text)
        }
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("render task aborted: {e}")))?
    .map_err(|e| AppError::Internal(anyhow!(e)))
}

/// `optimized-<uuid>-<basename>.pdf`, with the basename reduced to `[A-Za-z0-9_-]`.
pub fn artifact_object_name(filename: &str) -> String {
    let file = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = file.split('.').next().unwrap_or_default();
    let mut basename: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if basename.is_empty() {
        basename.push_str("resume");
    }
    format!("optimized-{}-{}.pdf", Uuid::new_v4(), basename)
}

struct StageTimer<'a> {
    filename: &'a str,
    started: Instant,
    stage_started: Instant,
}

impl<'a> StageTimer<'a> {
    fn new(filename: &'a str) -> Self {
        let now = Instant::now();
        Self {
            filename,
            started: now,
            stage_started: now,
        }
    }

    fn lap(&mut self, stage: &str) {
        info!(
            "[{}] {} done in {}ms",
            self.filename,
            stage,
            self.stage_started.elapsed().as_millis()
        );
        self.stage_started = Instant::now();
    }

    fn total_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}
