//! Loan risk scoring, narrative analysis, and assessment history.

pub mod narrative;
pub mod profile;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use narrative::{
    NarrativeBackend, NarrativeError, NarrativeGenerator, NarrativeRequest,
    OpenAiNarrativeClient, UnavailableNarrative,
};
pub use profile::{
    AgeGroup, CustomerProfile, EmploymentStatus, ExpenseCategory, IncomeBracket, MonthlyExpenses,
};
pub use repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, AssessmentSummaryView, RepositoryError,
};
pub use router::risk_router;
pub use scoring::{
    RiskBand, RiskBreakdown, RiskFactor, RiskResult, RiskScorer, ScoreAdjustment, BASE_SCORE,
};
pub use service::{
    AnalysisOutcome, AnalysisStatus, AssessmentService, AssessmentServiceError,
    AssessmentSubmission, ANALYSIS_UNAVAILABLE, DEFAULT_HISTORY_LIMIT,
};
