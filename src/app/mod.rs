pub mod dispatch;
pub mod status;

use crate::config::Config;
use crate::diary::{
    DiaryOrchestrator, ProviderGenerationService, WorkspaceContextAggregator, create_store,
};
use crate::llm::{Provider, create_provider, resolve_api_key};
use crate::runtime::observability::{Observer, create_observer};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Wire the configured provider, context source, store and observer into an
/// orchestrator.
pub async fn build_orchestrator(config: &Config) -> Result<Arc<DiaryOrchestrator>> {
    let provider_name = config.provider_name();
    let api_key = resolve_api_key(provider_name, config.api_key.as_deref());
    let provider: Arc<dyn Provider> = Arc::from(
        create_provider(provider_name, api_key.as_deref())
            .with_context(|| format!("Failed to create provider '{provider_name}'"))?,
    );
    let generator = ProviderGenerationService::new(
        provider,
        config.model_name(),
        config.default_temperature,
    );

    let store = create_store(&config.store, &config.workspace_dir).await?;
    let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));
    let aggregator = WorkspaceContextAggregator::new(&config.workspace_dir);

    tracing::debug!(
        provider = provider_name,
        model = config.model_name(),
        store = store.name(),
        observer = observer.name(),
        "diary orchestrator assembled"
    );

    Ok(Arc::new(
        DiaryOrchestrator::new(
            config.diary.clone(),
            Arc::new(aggregator),
            Arc::new(generator),
            store,
        )
        .with_observer(observer),
    ))
}
