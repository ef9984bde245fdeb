//! In-memory stand-ins for every collaborator, shared by unit tests across modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::clients::{
    AnalyticsEvent, AnalyticsSink, IdentityError, IdentityResolver, ObjectStore, ResumeDocument,
    SearchIndex,
};
use crate::ingestion::{
    BackgroundTasks, Collaborators, IngestionCoordinator, ResumeLibrary, SideEffectError,
};
use crate::llm_client::Completer;
use crate::models::{NewResume, NewStructuredResume, ResumeRow};
use crate::state::AppState;
use crate::store::ResumeStore;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_role: String,
    pub user_prompt: String,
    pub temperature: f32,
}

/// Completer that answers from substring rules over `system_role + user_prompt`, first match
/// wins, and records every call.
pub struct ScriptedCompleter {
    fallback: String,
    rules: Vec<(String, String)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedCompleter {
    pub fn new(fallback: &str) -> Self {
        Self {
            fallback: fallback.to_string(),
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rule(mut self, needle: &str, response: &str) -> Self {
        self.rules.push((needle.to_string(), response.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(&self, system_role: &str, user_prompt: &str, temperature: f32) -> String {
        self.calls.lock().unwrap().push(RecordedCall {
            system_role: system_role.to_string(),
            user_prompt: user_prompt.to_string(),
            temperature,
        });

        let haystack = format!("{system_role}\n{user_prompt}");
        self.rules
            .iter()
            .find(|(needle, _)| haystack.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

pub struct StaticIdentity {
    user_id: Option<i64>,
    calls: AtomicUsize,
}

impl StaticIdentity {
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            user_id: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn resolve_user_id(&self, _credential: &str) -> Result<i64, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.user_id.ok_or(IdentityError::Rejected(401))
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    pub next_id: AtomicI64,
    pub resumes: Mutex<Vec<ResumeRow>>,
    pub structured: Mutex<Vec<NewStructuredResume>>,
    pub fail_inserts: bool,
    pub fail_structured: bool,
}

fn stored_row(resume: NewResume, id: i64) -> ResumeRow {
    ResumeRow {
        id,
        filename: resume.filename,
        file_type: resume.file_type,
        source_format: resume.source_format,
        object_name: resume.object_name,
        size_bytes: resume.size_bytes,
        uploaded_at: resume.uploaded_at,
        content: resume.content,
        user_id: resume.user_id,
        job_description: resume.job_description,
    }
}

#[async_trait]
impl ResumeStore for InMemoryStore {
    async fn insert_resume(&self, resume: NewResume) -> Result<ResumeRow, sqlx::Error> {
        if self.fail_inserts {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let row = stored_row(resume, self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.resumes.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_structured(&self, entities: NewStructuredResume) -> Result<i64, sqlx::Error> {
        if self.fail_structured {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let mut structured = self.structured.lock().unwrap();
        structured.push(entities);
        Ok(structured.len() as i64)
    }

    async fn find_resume(&self, id: i64) -> Result<Option<ResumeRow>, sqlx::Error> {
        Ok(self.resumes.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ResumeRow>, sqlx::Error> {
        let mut rows: Vec<ResumeRow> = self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn delete_resume(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut resumes = self.resumes.lock().unwrap();
        let before = resumes.len();
        resumes.retain(|r| r.id != id);
        Ok(resumes.len() != before)
    }
}

#[derive(Default)]
pub struct RecordingObjectStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_puts: bool,
    pub fail_links: bool,
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    async fn put(&self, object_id: &str, bytes: Vec<u8>, _content_type: &str) -> anyhow::Result<()> {
        if self.fail_puts {
            anyhow::bail!("simulated storage outage");
        }
        self.objects
            .lock()
            .unwrap()
            .insert(object_id.to_string(), bytes);
        Ok(())
    }

    async fn access_link(&self, object_id: &str, ttl: Duration) -> anyhow::Result<String> {
        if self.fail_links {
            anyhow::bail!("simulated presign failure");
        }
        Ok(format!(
            "https://objects.test/resumes/{object_id}?expires={}",
            ttl.as_secs()
        ))
    }

    async fn delete(&self, object_id: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(object_id);
        Ok(())
    }

    fn object_url(&self, object_id: &str) -> String {
        format!("https://objects.test/resumes/{object_id}")
    }
}

#[derive(Default)]
pub struct RecordingSearchIndex {
    pub documents: Mutex<Vec<ResumeDocument>>,
    pub fail_upserts: bool,
}

#[async_trait]
impl SearchIndex for RecordingSearchIndex {
    async fn upsert(&self, document: &ResumeDocument) -> anyhow::Result<()> {
        if self.fail_upserts {
            anyhow::bail!("simulated index outage");
        }
        let mut documents = self.documents.lock().unwrap();
        documents.retain(|d| d.id != document.id);
        documents.push(document.clone());
        Ok(())
    }

    async fn query(&self, keyword: &str) -> anyhow::Result<Vec<ResumeDocument>> {
        let terms: Vec<String> = keyword.split_whitespace().map(str::to_lowercase).collect();
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| {
                let content = d.content.to_lowercase();
                terms.iter().all(|t| content.contains(t.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()> {
        self.documents.lock().unwrap().retain(|d| d.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAnalytics {
    pub events: Mutex<Vec<AnalyticsEvent>>,
    pub fail_emits: bool,
}

#[async_trait]
impl AnalyticsSink for RecordingAnalytics {
    async fn emit(&self, event: &AnalyticsEvent) -> anyhow::Result<()> {
        if self.fail_emits {
            anyhow::bail!("simulated analytics outage");
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// A coordinator wired entirely to in-memory collaborators.
pub struct Harness {
    pub completer: Arc<ScriptedCompleter>,
    pub identity: Arc<StaticIdentity>,
    pub store: Arc<InMemoryStore>,
    pub objects: Arc<RecordingObjectStore>,
    pub search: Arc<RecordingSearchIndex>,
    pub analytics: Arc<RecordingAnalytics>,
    pub tasks: BackgroundTasks,
    pub failures: UnboundedReceiver<SideEffectError>,
}

impl Harness {
    pub fn new(completer: ScriptedCompleter) -> Self {
        Self::with(completer, InMemoryStore::default(), RecordingObjectStore::default())
    }

    pub fn with(
        completer: ScriptedCompleter,
        store: InMemoryStore,
        objects: RecordingObjectStore,
    ) -> Self {
        let (tasks, failures) = BackgroundTasks::new();
        Self {
            completer: Arc::new(completer),
            identity: Arc::new(StaticIdentity::user(3)),
            store: Arc::new(store),
            objects: Arc::new(objects),
            search: Arc::new(RecordingSearchIndex::default()),
            analytics: Arc::new(RecordingAnalytics::default()),
            tasks,
            failures,
        }
    }

    pub fn with_search(mut self, search: RecordingSearchIndex) -> Self {
        self.search = Arc::new(search);
        self
    }

    pub fn with_analytics(mut self, analytics: RecordingAnalytics) -> Self {
        self.analytics = Arc::new(analytics);
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            identity: self.identity.clone(),
            store: self.store.clone(),
            objects: self.objects.clone(),
            search: self.search.clone(),
            analytics: self.analytics.clone(),
        }
    }

    pub fn coordinator(&self) -> IngestionCoordinator {
        IngestionCoordinator::new(
            self.completer.clone(),
            self.collaborators(),
            self.tasks.clone(),
            Duration::from_secs(600),
        )
    }

    pub fn library(&self) -> ResumeLibrary {
        ResumeLibrary::new(self.collaborators(), Duration::from_secs(600))
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            coordinator: Arc::new(self.coordinator()),
            library: Arc::new(self.library()),
        }
    }
}

/// Polls `condition` until it holds or a second passes.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// A small well-formed resume PDF.
pub fn sample_pdf() -> Vec<u8> {
    crate::render::render_pdf(
        "<h1>Jane Doe</h1><h2>Experience</h2><p>Backend engineer building Go services</p>",
    )
    .unwrap()
}

/// A small well-formed resume DOCX.
pub fn sample_docx(lines: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let docx = lines.iter().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)))
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}
