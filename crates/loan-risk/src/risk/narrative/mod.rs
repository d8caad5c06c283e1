//! Free-text risk commentary produced by an external chat-completion model.
//!
//! The scorer never depends on this module. Callers treat every [`NarrativeError`]
//! as "analysis unavailable" and keep showing the heuristic result.

mod openai;
mod prompt;

pub use openai::OpenAiNarrativeClient;
pub use prompt::{build_messages, ChatMessage, SYSTEM_PROMPT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::profile::{
    deserialize_amount, deserialize_count, deserialize_text, CustomerProfile,
};
use crate::config::NarrativeConfig;

/// Profile plus the presentation-only fields the narrative prompt mentions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrativeRequest {
    #[serde(deserialize_with = "deserialize_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub marital_status: Option<String>,
    #[serde(deserialize_with = "deserialize_count")]
    pub dependents: u32,
    #[serde(rename = "desiredLoanAPR", deserialize_with = "deserialize_amount")]
    pub desired_loan_apr: f64,
    /// Loan term in months.
    #[serde(deserialize_with = "deserialize_count")]
    pub desired_loan_period: u32,
    #[serde(flatten)]
    pub profile: CustomerProfile,
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative generation is not configured")]
    NotConfigured,
    #[error("narrative transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("narrative provider rejected the API key")]
    InvalidApiKey,
    #[error("narrative provider rate limit exceeded")]
    RateLimited,
    #[error("narrative provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("narrative provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Stand-in used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableNarrative;

#[async_trait]
impl NarrativeGenerator for UnavailableNarrative {
    async fn generate(&self, _request: &NarrativeRequest) -> Result<String, NarrativeError> {
        Err(NarrativeError::NotConfigured)
    }
}

/// Generator chosen at startup from configuration.
#[derive(Debug, Clone)]
pub enum NarrativeBackend {
    OpenAi(OpenAiNarrativeClient),
    Unavailable(UnavailableNarrative),
}

impl NarrativeBackend {
    /// Falls back to [`UnavailableNarrative`] when no key is set or the client cannot be built.
    pub fn from_config(config: &NarrativeConfig) -> Self {
        if !config.is_configured() {
            info!("OPENAI_API_KEY not set; risk narratives disabled");
            return Self::Unavailable(UnavailableNarrative);
        }

        match OpenAiNarrativeClient::new(config.clone()) {
            Ok(client) => {
                info!(model = %config.model, base_url = %config.base_url, "risk narratives enabled");
                Self::OpenAi(client)
            }
            Err(err) => {
                warn!(error = %err, "failed to build narrative client; narratives disabled");
                Self::Unavailable(UnavailableNarrative)
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::OpenAi(_))
    }
}

#[async_trait]
impl NarrativeGenerator for NarrativeBackend {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError> {
        match self {
            Self::OpenAi(client) => client.generate(request).await,
            Self::Unavailable(fallback) => fallback.generate(request).await,
        }
    }
}
