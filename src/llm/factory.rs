use super::compatible::OpenAiCompatibleProvider;
use super::traits::Provider;

/// Resolve an API key from config, then provider-specific env vars, then the
/// generic `IRIS_DIARY_API_KEY` / `API_KEY`.
pub fn resolve_api_key(name: &str, explicit_api_key: Option<&str>) -> Option<String> {
    if let Some(key) = explicit_api_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    let provider_env: &[&str] = match name {
        "openai" => &["OPENAI_API_KEY"],
        "openrouter" => &["OPENROUTER_API_KEY"],
        "groq" => &["GROQ_API_KEY"],
        "mistral" => &["MISTRAL_API_KEY"],
        "deepseek" => &["DEEPSEEK_API_KEY"],
        "together" | "together-ai" => &["TOGETHER_API_KEY"],
        _ => &[],
    };

    provider_env
        .iter()
        .chain(["IRIS_DIARY_API_KEY", "API_KEY"].iter())
        .find_map(|var| {
            std::env::var(var)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
}

/// Maps well-known provider names to `(display_name, base_url)`.
pub fn compatible_provider_endpoint(name: &str) -> Option<(&'static str, &'static str)> {
    let endpoint = match name {
        "openai" => ("OpenAI", "https://api.openai.com/v1"),
        "openrouter" => ("OpenRouter", "https://openrouter.ai/api/v1"),
        "groq" => ("Groq", "https://api.groq.com/openai/v1"),
        "mistral" => ("Mistral", "https://api.mistral.ai/v1"),
        "deepseek" => ("DeepSeek", "https://api.deepseek.com/v1"),
        "together" | "together-ai" => ("Together AI", "https://api.together.xyz/v1"),
        "ollama" => ("Ollama", "http://localhost:11434/v1"),
        _ => return None,
    };
    Some(endpoint)
}

/// Create a boxed [`Provider`] by name.
///
/// Supported: every name in [`compatible_provider_endpoint`] and
/// `"custom:<base_url>"` for any OpenAI-compatible endpoint.
pub fn create_provider(name: &str, api_key: Option<&str>) -> anyhow::Result<Box<dyn Provider>> {
    let resolved_key = resolve_api_key(name, api_key);
    let api_key = resolved_key.as_deref();

    if let Some((display_name, base_url)) = compatible_provider_endpoint(name) {
        let provider = if name == "ollama" {
            OpenAiCompatibleProvider::keyless(display_name, base_url, api_key)
        } else {
            OpenAiCompatibleProvider::new(display_name, base_url, api_key)
        };
        return Ok(Box::new(provider));
    }

    if let Some(base_url) = name.strip_prefix("custom:") {
        anyhow::ensure!(
            !base_url.is_empty(),
            "Custom provider requires a URL. Format: custom:https://your-api.com"
        );
        return Ok(Box::new(OpenAiCompatibleProvider::keyless(
            "Custom", base_url, api_key,
        )));
    }

    anyhow::bail!(
        "Unknown provider: {name}. \
         Tip: Use \"custom:https://your-api.com\" for OpenAI-compatible endpoints."
    )
}
