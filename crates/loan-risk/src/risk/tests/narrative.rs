use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::common::*;
use crate::config::NarrativeConfig;
use crate::risk::narrative::{
    build_messages, NarrativeBackend, NarrativeError, NarrativeGenerator, NarrativeRequest,
    OpenAiNarrativeClient, UnavailableNarrative, SYSTEM_PROMPT,
};

#[test]
fn prompt_lists_every_profile_field() {
    let messages = build_messages(&narrative_request());

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[0].content, SYSTEM_PROMPT);
    assert_eq!(messages[1].role, "user");

    let body = &messages[1].content;
    for expected in [
        "Name: Jordan Avery",
        "Age Group: 26-35",
        "Marital Status: Married",
        "Dependents: 2",
        "Employment Status: Employed",
        "Income Bracket: $50,000-$75,000",
        "Savings Amount: 10000",
        "Rent/Mortgage: 1000",
        "Utilities: 200",
        "Insurance: 100",
        "Loan Payments: 0",
        "Subscriptions: 50",
        "Food Costs: 400",
        "Miscellaneous Costs: 50",
        "Amount: 20000",
        "APR: 6.50%",
        "Period: 36 months",
    ] {
        assert!(body.contains(expected), "prompt missing {expected:?}:\n{body}");
    }
}

#[test]
fn prompt_marks_missing_fields() {
    let messages = build_messages(&NarrativeRequest::default());
    let body = &messages[1].content;

    assert!(body.contains("Name: Not provided"));
    assert!(body.contains("Age Group: Not provided"));
    assert!(body.contains("Income Bracket: Not provided"));
    assert!(body.contains("Rent/Mortgage: 0"));
}

#[test]
fn prompt_keeps_one_field_per_line() {
    let messages = build_messages(&narrative_request());
    let body = &messages[1].content;

    assert!(body.contains("their data.\n\nCustomer Information:\nName: Jordan Avery\n"));
    assert!(body.contains(
        "Savings Amount: 10000\nMonthly Expenses:\n  Rent/Mortgage: 1000\n  Utilities: 200\n"
    ));
    assert!(body.contains("  Miscellaneous Costs: 50\nDesired Loan Details:\n  Amount: 20000\n"));
    assert!(body.ends_with("  APR: 6.50%\n  Period: 36 months"));
}

#[tokio::test]
async fn unavailable_generator_reports_not_configured() {
    let err = UnavailableNarrative
        .generate(&narrative_request())
        .await
        .expect_err("no narrative without configuration");
    assert!(matches!(err, NarrativeError::NotConfigured));
}

#[test]
fn client_requires_an_api_key() {
    let err = OpenAiNarrativeClient::new(NarrativeConfig::default()).expect_err("key required");
    assert!(matches!(err, NarrativeError::NotConfigured));
}

#[derive(Clone)]
struct StubProvider {
    status: StatusCode,
    reply: Value,
    captured: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(stub): State<StubProvider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    stub.captured
        .lock()
        .expect("stub mutex poisoned")
        .push((auth, body));
    (stub.status, Json(stub.reply.clone()))
}

async fn spawn_provider(stub: StubProvider) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub provider");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub provider runs");
    });
    format!("http://{addr}/v1")
}

fn client_for(base_url: String) -> OpenAiNarrativeClient {
    OpenAiNarrativeClient::new(NarrativeConfig {
        api_key: Some("sk-test".to_string()),
        base_url,
        timeout: Duration::from_secs(5),
        ..NarrativeConfig::default()
    })
    .expect("client builds")
}

fn stub(status: StatusCode, reply: Value) -> StubProvider {
    StubProvider {
        status,
        reply,
        captured: Arc::default(),
    }
}

#[tokio::test]
async fn client_posts_chat_completion_and_trims_reply() {
    let provider = stub(
        StatusCode::OK,
        json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Moderate risk overall.\n" } }]
        }),
    );
    let captured = provider.captured.clone();
    let client = client_for(spawn_provider(provider).await);

    let analysis = client
        .generate(&narrative_request())
        .await
        .expect("narrative returned");

    assert_eq!(analysis, "Moderate risk overall.");
    let calls = captured.lock().expect("stub mutex poisoned").clone();
    assert_eq!(calls.len(), 1);
    let (auth, body) = &calls[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["max_tokens"], 500);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][1]["content"]
        .as_str()
        .expect("user content")
        .contains("Jordan Avery"));
}

#[tokio::test]
async fn client_maps_provider_failures() {
    let unauthorized = client_for(
        spawn_provider(stub(StatusCode::UNAUTHORIZED, json!({ "error": "bad key" }))).await,
    );
    assert!(matches!(
        unauthorized.generate(&narrative_request()).await,
        Err(NarrativeError::InvalidApiKey)
    ));

    let limited = client_for(
        spawn_provider(stub(StatusCode::TOO_MANY_REQUESTS, json!({ "error": "slow down" })))
            .await,
    );
    assert!(matches!(
        limited.generate(&narrative_request()).await,
        Err(NarrativeError::RateLimited)
    ));

    let broken = client_for(
        spawn_provider(stub(StatusCode::BAD_GATEWAY, json!({ "error": "upstream" }))).await,
    );
    match broken.generate(&narrative_request()).await {
        Err(NarrativeError::Api { status, body }) => {
            assert_eq!(status, 502);
            assert!(body.contains("upstream"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn client_rejects_empty_choices() {
    let empty = client_for(spawn_provider(stub(StatusCode::OK, json!({ "choices": [] }))).await);
    assert!(matches!(
        empty.generate(&narrative_request()).await,
        Err(NarrativeError::InvalidResponse(_))
    ));

    let blank = client_for(
        spawn_provider(stub(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "content": "   " } }] }),
        ))
        .await,
    );
    assert!(matches!(
        blank.generate(&narrative_request()).await,
        Err(NarrativeError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn client_reports_transport_errors() {
    // Bind then drop a listener so the port is very likely closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);

    let client = client_for(format!("http://{addr}/v1"));
    assert!(matches!(
        client.generate(&narrative_request()).await,
        Err(NarrativeError::Transport(_))
    ));
}

#[tokio::test]
async fn backend_without_key_is_disabled() {
    let backend = NarrativeBackend::from_config(&NarrativeConfig::default());

    assert!(!backend.is_enabled());
    assert!(matches!(
        backend.generate(&narrative_request()).await,
        Err(NarrativeError::NotConfigured)
    ));
}

#[test]
fn backend_with_key_uses_the_provider() {
    let backend = NarrativeBackend::from_config(&NarrativeConfig {
        api_key: Some("sk-test".to_string()),
        ..NarrativeConfig::default()
    });
    assert!(backend.is_enabled());
}
