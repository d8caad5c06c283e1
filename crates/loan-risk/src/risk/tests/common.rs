use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::risk::narrative::{NarrativeError, NarrativeGenerator, NarrativeRequest};
use crate::risk::profile::{
    AgeGroup, CustomerProfile, EmploymentStatus, ExpenseCategory, IncomeBracket, MonthlyExpenses,
};
use crate::risk::repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError,
};
use crate::risk::scoring::RiskScorer;
use crate::risk::service::AssessmentService;

/// Expenses totalling 1800: rent 1000, utilities 200, insurance 100, subscriptions 50,
/// food 400, misc 50.
pub(super) fn neutral_expenses() -> MonthlyExpenses {
    MonthlyExpenses::new()
        .with(ExpenseCategory::Rent, 1000.0)
        .with(ExpenseCategory::Utilities, 200.0)
        .with(ExpenseCategory::Insurance, 100.0)
        .with(ExpenseCategory::LoanPayments, 0.0)
        .with(ExpenseCategory::Subscriptions, 50.0)
        .with(ExpenseCategory::FoodCosts, 400.0)
        .with(ExpenseCategory::MiscCosts, 50.0)
}

/// A profile where no rule fires.
pub(super) fn neutral_profile() -> CustomerProfile {
    CustomerProfile {
        age_group: AgeGroup::Age26To35,
        employment_status: EmploymentStatus::Employed,
        income_bracket: IncomeBracket::From50kTo75k,
        savings_amount: 10_000.0,
        monthly_expenses: neutral_expenses(),
        desired_loan_amount: 20_000.0,
    }
}

pub(super) fn high_risk_profile() -> CustomerProfile {
    CustomerProfile {
        employment_status: EmploymentStatus::Unemployed,
        income_bracket: IncomeBracket::Under25k,
        savings_amount: 1_000.0,
        desired_loan_amount: 60_000.0,
        ..neutral_profile()
    }
}

pub(super) fn narrative_request() -> NarrativeRequest {
    NarrativeRequest {
        name: Some("Jordan Avery".to_string()),
        marital_status: Some("Married".to_string()),
        dependents: 2,
        desired_loan_apr: 6.5,
        desired_loan_period: 36,
        profile: neutral_profile(),
    }
}

pub(super) fn scorer() -> RiskScorer {
    RiskScorer::new()
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records.truncate(limit);
        Ok(records)
    }
}

pub(super) struct ConflictRepository;

impl AssessmentRepository for ConflictRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(None)
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Returns a canned narrative and remembers each request it saw.
#[derive(Default, Clone)]
pub(super) struct ScriptedNarrative {
    pub(super) reply: String,
    pub(super) seen: Arc<Mutex<Vec<NarrativeRequest>>>,
}

impl ScriptedNarrative {
    pub(super) fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Arc::default(),
        }
    }

    pub(super) fn requests(&self) -> Vec<NarrativeRequest> {
        self.seen.lock().expect("narrative mutex poisoned").clone()
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedNarrative {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError> {
        self.seen
            .lock()
            .expect("narrative mutex poisoned")
            .push(request.clone());
        Ok(self.reply.clone())
    }
}

pub(super) struct FailingNarrative;

#[async_trait]
impl NarrativeGenerator for FailingNarrative {
    async fn generate(&self, _request: &NarrativeRequest) -> Result<String, NarrativeError> {
        Err(NarrativeError::RateLimited)
    }
}

pub(super) fn build_service(
    narrative: ScriptedNarrative,
) -> (
    AssessmentService<MemoryRepository, ScriptedNarrative>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentService::new(repository.clone(), Arc::new(narrative));
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
