use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::CustomerProfile;
use super::scoring::{RiskBand, RiskResult};

/// Identifier wrapper for stored assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// A scored profile kept in the assessment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    pub profile: CustomerProfile,
    pub result: RiskResult,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn summary_view(&self) -> AssessmentSummaryView {
        AssessmentSummaryView {
            id: self.id.clone(),
            applicant_name: self.applicant_name.clone(),
            score: self.result.score,
            band: self.result.band,
            created_at: self.created_at,
        }
    }
}

/// Compact history row for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummaryView {
    pub id: AssessmentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    pub score: f64,
    pub band: RiskBand,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    /// Newest first, at most `limit` records.
    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
