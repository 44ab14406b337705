use std::sync::Arc;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iris_diary::config::DiaryConfig;
use iris_diary::diary::{
    DiaryOrchestrator, InMemoryEntryStore, ProviderGenerationService, StaticContextAggregator,
};
use iris_diary::llm::OpenAiCompatibleProvider;

use crate::diary_harness::eventful_snapshot;

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

fn diary_against(server: &MockServer) -> DiaryOrchestrator {
    let provider = OpenAiCompatibleProvider::keyless("local", &server.uri(), None);
    let generator = ProviderGenerationService::new(Arc::new(provider), "diary-model", 0.6);
    DiaryOrchestrator::new(
        DiaryConfig::default(),
        Arc::new(StaticContextAggregator::new(eventful_snapshot())),
        Arc::new(generator),
        Arc::new(InMemoryEntryStore::new()),
    )
}

#[tokio::test]
async fn model_reply_becomes_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "diary-model",
            "max_tokens": 400
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Here you go:\n{\"title\": \"Taxes, again\", \"body\": \"The login fix landed, taxes did not.\", \"tags\": [\"Chores\", \"progress\"]}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let entry = diary_against(&server).force_entry("main", None).await.unwrap();

    assert_eq!(entry.title, "Taxes, again");
    assert_eq!(entry.body, "The login fix landed, taxes did not.");
    assert!(entry.tags.contains("chores"));
    assert!(!entry.is_fallback());
    assert_eq!(entry.metadata["generation_backend"], "local:diary-model");
}

#[tokio::test]
async fn prose_reply_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("Dear diary, today was long.")),
        )
        .mount(&server)
        .await;

    let entry = diary_against(&server).force_entry("main", None).await.unwrap();
    assert!(entry.is_fallback());
    assert_eq!(entry.metadata["generation_error"]["kind"], "malformed");
}

#[tokio::test]
async fn server_error_falls_back_as_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let entry = diary_against(&server)
        .attempt_entry("main")
        .await
        .unwrap()
        .unwrap();
    assert!(entry.is_fallback());
    assert_eq!(entry.metadata["generation_error"]["kind"], "upstream");
    let message = entry.metadata["generation_error"]["message"].as_str().unwrap();
    assert!(message.contains("503"));
}
