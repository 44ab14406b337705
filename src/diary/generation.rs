//! Generation boundary: turns a system instruction and user prompt into a
//! structured `{title, body, tags}` result.

use super::types::GeneratedEntry;
use crate::error::GenerationError;
use crate::llm::Provider;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub trait GenerationService: Send + Sync {
    /// Backend identifier recorded in entry metadata.
    fn backend(&self) -> &str;

    fn generate<'a>(
        &'a self,
        system_instruction: &'a str,
        user_prompt: &'a str,
        max_tokens: u32,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedEntry, GenerationError>> + Send + 'a>>;
}

/// Generation through a chat-completion [`Provider`].
pub struct ProviderGenerationService {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
    backend: String,
}

impl ProviderGenerationService {
    pub fn new(provider: Arc<dyn Provider>, model: &str, temperature: f64) -> Self {
        let backend = format!("{}:{model}", provider.name());
        Self {
            provider,
            model: model.to_string(),
            temperature,
            backend,
        }
    }
}

impl GenerationService for ProviderGenerationService {
    fn backend(&self) -> &str {
        &self.backend
    }

    fn generate<'a>(
        &'a self,
        system_instruction: &'a str,
        user_prompt: &'a str,
        max_tokens: u32,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedEntry, GenerationError>> + Send + 'a>> {
        Box::pin(async move {
            let reply = self
                .provider
                .chat_with_system(
                    Some(system_instruction),
                    user_prompt,
                    &self.model,
                    self.temperature,
                    Some(max_tokens),
                )
                .await
                .map_err(|error| GenerationError::Upstream {
                    provider: self.provider.name().to_string(),
                    message: format!("{error:#}"),
                })?;

            decode_generated_entry(&reply)
        })
    }
}

/// Decode a model reply into the structured entry shape.
///
/// The whole reply is tried first, then the outermost `{...}` slice (models
/// like to wrap JSON in prose or code fences). A blank body is malformed.
pub fn decode_generated_entry(reply: &str) -> Result<GeneratedEntry, GenerationError> {
    let trimmed = reply.trim();
    let parsed = serde_json::from_str::<GeneratedEntry>(trimmed).or_else(|whole_err| {
        match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str::<GeneratedEntry>(&trimmed[start..=end])
            }
            _ => Err(whole_err),
        }
    });

    let entry = parsed.map_err(|error| GenerationError::Malformed(error.to_string()))?;
    if entry.body.trim().is_empty() {
        return Err(GenerationError::Malformed("empty body".into()));
    }
    Ok(entry)
}
