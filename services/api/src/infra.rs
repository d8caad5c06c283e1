use loan_risk::error::AppError;
use loan_risk::risk::{
    AssessmentId, AssessmentRecord, AssessmentRepository, NarrativeRequest, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Oldest assessments are evicted past this many records.
pub(crate) const HISTORY_CAPACITY: usize = 1_000;

/// Process-local assessment history, newest first; cleared on restart.
#[derive(Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<VecDeque<AssessmentRecord>>>,
    capacity: usize,
}

impl Default for InMemoryAssessmentRepository {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl InMemoryAssessmentRepository {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<AssessmentRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push_front(record.clone());
        guard.truncate(self.capacity);
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.iter().take(limit).cloned().collect())
    }
}

/// Reads a JSON profile (optionally with narrative fields) from disk.
pub(crate) fn load_request(path: &Path) -> Result<NarrativeRequest, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let request = serde_json::from_str(&raw)?;
    Ok(request)
}
