use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::narrative::{NarrativeError, NarrativeGenerator, NarrativeRequest};
use super::profile::{deserialize_text, CustomerProfile};
use super::repository::{AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError};
use super::scoring::{RiskResult, RiskScorer};

/// Placeholder shown in place of the narrative when the model cannot be reached.
pub const ANALYSIS_UNAVAILABLE: &str = "Risk analysis is currently unavailable.";

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Service composing the scorer, the narrative generator, and the assessment history.
pub struct AssessmentService<R, G> {
    scorer: RiskScorer,
    repository: Arc<R>,
    narrator: Arc<G>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

/// Intake payload for a recorded assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    #[serde(rename = "name", default, deserialize_with = "deserialize_text")]
    pub applicant_name: Option<String>,
    #[serde(flatten)]
    pub profile: CustomerProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Generated,
    Unavailable,
}

/// Heuristic result plus narrative; the narrative never blocks the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub result: RiskResult,
    pub analysis: String,
    pub analysis_status: AnalysisStatus,
}

impl<R, G> AssessmentService<R, G>
where
    R: AssessmentRepository + 'static,
    G: NarrativeGenerator + 'static,
{
    pub fn new(repository: Arc<R>, narrator: Arc<G>) -> Self {
        Self {
            scorer: RiskScorer::new(),
            repository,
            narrator,
        }
    }

    pub fn score(&self, profile: &CustomerProfile) -> RiskResult {
        self.scorer.score(profile)
    }

    /// Score a submission and append it to the history.
    pub fn assess(
        &self,
        submission: AssessmentSubmission,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let AssessmentSubmission {
            applicant_name,
            profile,
        } = submission;

        let result = self.scorer.score(&profile);
        let record = AssessmentRecord {
            id: next_assessment_id(),
            applicant_name: applicant_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            profile,
            result,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            assessment_id = %stored.id.0,
            score = stored.result.score,
            "assessment recorded"
        );
        Ok(stored)
    }

    /// Ask the narrative generator for commentary. Blank text counts as a failure.
    pub async fn narrate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError> {
        let text = self.narrator.generate(request).await?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(NarrativeError::InvalidResponse(
                "narrative was empty".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    pub async fn analyze(&self, request: &NarrativeRequest) -> AnalysisOutcome {
        let result = self.scorer.score(&request.profile);

        match self.narrate(request).await {
            Ok(analysis) => AnalysisOutcome {
                result,
                analysis,
                analysis_status: AnalysisStatus::Generated,
            },
            Err(err) => {
                warn!(error = %err, "risk narrative unavailable");
                AnalysisOutcome {
                    result,
                    analysis: ANALYSIS_UNAVAILABLE.to_string(),
                    analysis_status: AnalysisStatus::Unavailable,
                }
            }
        }
    }

    pub fn get(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.recent(limit)?)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
