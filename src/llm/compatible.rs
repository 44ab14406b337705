//! OpenAI-compatible `/chat/completions` provider.
//! OpenAI, OpenRouter, Groq, Ollama and most hosted gateways speak this shape.

use super::http_client::build_provider_client;
use super::scrub::sanitize_api_error;
use super::traits::Provider;
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub struct OpenAiCompatibleProvider {
    pub(crate) name: String,
    pub(crate) api_key: Option<String>,
    /// Local servers such as Ollama accept unauthenticated requests.
    requires_key: bool,
    /// Pre-computed `Authorization` header value.
    cached_auth: Option<String>,
    /// Pre-computed chat completions URL.
    cached_chat_url: String,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cached_chat_url = if base_url.ends_with("chat/completions") {
            base_url.clone()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            name: name.to_string(),
            cached_auth: api_key.map(|key| format!("Bearer {key}")),
            api_key: api_key.map(ToString::to_string),
            requires_key: true,
            cached_chat_url,
            client: build_provider_client(),
        }
    }

    /// Provider that sends requests without credentials when no key is set.
    pub fn keyless(name: &str, base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            requires_key: false,
            ..Self::new(name, base_url, api_key)
        }
    }

    fn chat_completions_url(&self) -> &str {
        &self.cached_chat_url
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    async fn chat_internal(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> anyhow::Result<String> {
        if self.requires_key && self.api_key.is_none() {
            anyhow::bail!(
                "{} API key not set. Set api_key in config.toml or IRIS_DIARY_API_KEY.",
                self.name
            );
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(Message {
                role: "system",
                content: system,
            });
        }
        messages.push(Message {
            role: "user",
            content: message,
        });

        let request = ChatRequest {
            model,
            messages,
            temperature,
            max_tokens,
        };

        let mut builder = self.client.post(self.chat_completions_url()).json(&request);
        if let Some(auth) = &self.cached_auth {
            builder = builder.header("Authorization", auth);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("{} chat completions request failed", self.name))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
            anyhow::bail!("{} API error ({status}): {}", self.name, sanitize_api_error(&body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .with_context(|| format!("{} chat completions JSON decode failed", self.name))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("No response from {}", self.name))
    }
}

impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(self.chat_internal(system_prompt, message, model, temperature, max_tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn strips_trailing_slash_and_appends_path() {
        let p = OpenAiCompatibleProvider::new("test", "https://api.example.com/v1/", None);
        assert_eq!(
            p.chat_completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn full_endpoint_is_used_as_is() {
        let p = OpenAiCompatibleProvider::new(
            "custom",
            "https://llm.example.com/v2/chat/completions",
            None,
        );
        assert_eq!(
            p.chat_completions_url(),
            "https://llm.example.com/v2/chat/completions"
        );
    }

    #[tokio::test]
    async fn chat_fails_without_key() {
        let p = OpenAiCompatibleProvider::new("OpenAI", "https://api.openai.com/v1", None);
        let err = p
            .chat_with_system(None, "hello", "gpt-4o-mini", 0.7, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("OpenAI API key not set"));
    }

    #[test]
    fn request_omits_absent_max_tokens() {
        let req = ChatRequest {
            model: "m",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            temperature: 0.7,
            max_tokens: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("max_tokens"));
    }

    #[tokio::test]
    async fn sends_system_prompt_and_max_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "diary-model",
                "max_tokens": 400,
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "write" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "{\"title\":\"t\",\"body\":\"b\"}" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new("Mock", &server.uri(), Some("test-key"));
        let reply = provider
            .chat_with_system(Some("be brief"), "write", "diary-model", 0.7, Some(400))
            .await
            .unwrap();
        assert!(reply.contains("\"title\""));
    }

    #[tokio::test]
    async fn keyless_provider_sends_no_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::keyless("Ollama", &server.uri(), None);
        let reply = provider.chat("hi", "llama3", 0.2).await.unwrap();
        assert_eq!(reply, "ok");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn error_bodies_are_redacted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                "{\"error\":\"invalid credentials api_key=raw-secret-123\"}",
            ))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new("Mock", &server.uri(), Some("key"));
        let err = provider
            .chat_with_system(None, "hello", "m", 0.1, None)
            .await
            .unwrap_err()
            .to_string();

        assert!(err.contains("401"));
        assert!(!err.contains("raw-secret-123"));
        assert!(err.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new("Mock", &server.uri(), Some("key"));
        let err = provider
            .chat_with_system(None, "hello", "m", 0.1, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No response from Mock"));
    }
}
