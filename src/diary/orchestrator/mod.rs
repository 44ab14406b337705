//! Ties context, admission, prompt selection, generation and persistence
//! together for one session at a time.
//!
//! Every attempt and forced write for a session runs under that session's
//! journal lock, so the governor always sees the head timestamp left by the
//! previous call.

mod prompt;
mod summary;

use crate::config::DiaryConfig;
use crate::diary::context::{ContextAggregator, ContextSnapshot};
use crate::diary::generation::GenerationService;
use crate::diary::governor::{AdmissionGovernor, GovernorStatus, RecentEntry};
use crate::diary::selector::{PromptSelector, SelectorFeatures};
use crate::diary::store::EntryStore;
use crate::diary::types::{
    AdmissionDecision, Entry, EntryMode, FALLBACK_TAG, GeneratedEntry, PromptTemplate, SYSTEM_TAG,
};
use crate::error::{GenerationError, Result};
use crate::runtime::diagnostics::health;
use crate::runtime::observability::{DiaryEvent, DiaryMetric, NoopObserver, Observer};
use crate::utils::text::{truncate_with_ellipsis, truncate_words};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

const MAX_TAGS: usize = 8;
const MAX_TITLE_CHARS: usize = 120;
const STORE_COMPONENT: &str = "diary_store";

/// In-process history of one session, newest first.
#[derive(Default)]
struct SessionJournal {
    history: VecDeque<Entry>,
    hydrated: bool,
}

impl SessionJournal {
    fn last_mode(&self) -> Option<EntryMode> {
        self.history.front().map(|entry| entry.mode)
    }

    fn last_entry_at(&self) -> Option<chrono::DateTime<Utc>> {
        self.history.front().map(|entry| entry.timestamp)
    }

    fn recent(&self) -> Vec<RecentEntry<'_>> {
        self.history.iter().map(RecentEntry::from).collect()
    }
}

type SessionHandle = Arc<tokio::sync::Mutex<SessionJournal>>;

pub struct DiaryOrchestrator {
    config: DiaryConfig,
    governor: AdmissionGovernor,
    selector: PromptSelector,
    aggregator: Arc<dyn ContextAggregator>,
    generator: Arc<dyn GenerationService>,
    store: Arc<dyn EntryStore>,
    observer: Arc<dyn Observer>,
    generation_timeout: Duration,
    /// Health registry key for store reads and writes.
    store_component: &'static str,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl DiaryOrchestrator {
    pub fn new(
        config: DiaryConfig,
        aggregator: Arc<dyn ContextAggregator>,
        generator: Arc<dyn GenerationService>,
        store: Arc<dyn EntryStore>,
    ) -> Self {
        let generation_timeout = Duration::from_secs(config.generation_timeout_secs.max(1));
        Self {
            governor: AdmissionGovernor::new(config.governor.clone()),
            selector: PromptSelector::default(),
            aggregator,
            generator,
            store,
            observer: Arc::new(NoopObserver),
            generation_timeout,
            store_component: STORE_COMPONENT,
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    #[must_use]
    pub fn with_selector(mut self, selector: PromptSelector) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Overrides the timeout derived from `generation_timeout_secs`.
    #[must_use]
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    #[cfg(test)]
    fn with_store_component(mut self, component: &'static str) -> Self {
        self.store_component = component;
        self
    }

    pub fn config(&self) -> &DiaryConfig {
        &self.config
    }

    pub fn observer(&self) -> &Arc<dyn Observer> {
        &self.observer
    }

    /// Scheduled path: the governor decides whether anything is written.
    pub async fn attempt_entry(&self, session_id: &str) -> Result<Option<Entry>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let handle = self.session(session_id);
        let mut journal = handle.lock().await;
        self.hydrate(session_id, &mut journal).await;

        let snapshot = self.aggregator.aggregate(session_id).await?;
        let digest = summary::context_digest(&snapshot);
        let candidate = summary::candidate_summary(&snapshot, &digest);

        let decision = self.governor.decide(
            Utc::now(),
            &candidate,
            &journal.recent(),
            journal.last_entry_at(),
        );
        if let Some(novelty) = decision.novelty_score {
            self.observer.record_metric(&DiaryMetric::NoveltyScore(novelty));
        }
        if let Some(relevance) = decision.relevance_score {
            self.observer
                .record_metric(&DiaryMetric::RelevanceScore(relevance));
        }
        if !decision.accepted {
            tracing::info!(
                session_id,
                reason = %decision.reason,
                novelty = ?decision.novelty_score,
                relevance = ?decision.relevance_score,
                "diary entry not admitted"
            );
            self.observer.record_event(&DiaryEvent::AdmissionRejected {
                session_id: session_id.to_string(),
                reason: decision.reason,
            });
            return Ok(None);
        }

        let features = SelectorFeatures::from_snapshot(&snapshot, journal.last_mode());
        let template = self.selector.choose(&features);
        let entry = self
            .compose(session_id, &snapshot, &digest, template, decision)
            .await;
        self.commit(session_id, &mut journal, &entry, false).await;
        Ok(Some(entry))
    }

    /// Manual path: skips the governor and the enable flag.
    pub async fn force_entry(
        &self,
        session_id: &str,
        mode_override: Option<EntryMode>,
    ) -> Result<Entry> {
        let handle = self.session(session_id);
        let mut journal = handle.lock().await;
        self.hydrate(session_id, &mut journal).await;

        let snapshot = self.aggregator.aggregate(session_id).await?;
        let digest = summary::context_digest(&snapshot);

        let features = SelectorFeatures::from_snapshot(&snapshot, journal.last_mode());
        let template = match mode_override {
            Some(mode) => self.selector.choose_with_mode(mode, &features),
            None => self.selector.choose(&features),
        };
        let decision = self.governor.manual_override();
        let entry = self
            .compose(session_id, &snapshot, &digest, template, decision)
            .await;
        self.commit(session_id, &mut journal, &entry, true).await;
        Ok(entry)
    }

    /// Newest first.
    pub async fn recent_entries(&self, session_id: &str, limit: usize) -> Vec<Entry> {
        let handle = self.session(session_id);
        let mut journal = handle.lock().await;
        self.hydrate(session_id, &mut journal).await;
        journal.history.iter().take(limit).cloned().collect()
    }

    /// Case-insensitive substring search over title, body and tags.
    pub async fn search(&self, session_id: &str, query: &str, limit: usize) -> Vec<Entry> {
        let needle = query.trim().to_lowercase();
        let handle = self.session(session_id);
        let mut journal = handle.lock().await;
        self.hydrate(session_id, &mut journal).await;
        journal
            .history
            .iter()
            .filter(|entry| entry.matches(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn governor_status(&self, session_id: &str) -> GovernorStatus {
        let handle = self.session(session_id);
        let mut journal = handle.lock().await;
        self.hydrate(session_id, &mut journal).await;
        self.governor
            .status(Utc::now(), &journal.recent(), journal.last_entry_at())
    }

    fn session(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(sessions.entry(session_id.to_string()).or_default())
    }

    async fn hydrate(&self, session_id: &str, journal: &mut SessionJournal) {
        if journal.hydrated {
            return;
        }
        journal.hydrated = true;

        match self.store.list(session_id, self.config.history_cap).await {
            Ok(mut stored) => {
                stored.truncate(self.config.history_cap);
                tracing::debug!(
                    session_id,
                    store = self.store.name(),
                    entries = stored.len(),
                    "diary history hydrated"
                );
                journal.history = stored.into();
            }
            Err(error) => {
                tracing::warn!(
                    session_id,
                    store = self.store.name(),
                    error = %error,
                    "failed to load diary history; starting empty"
                );
                health::mark_component_error(self.store_component, &error);
                self.observer.record_event(&DiaryEvent::Error {
                    component: self.store_component.to_string(),
                    message: error.to_string(),
                });
            }
        }
    }

    async fn compose(
        &self,
        session_id: &str,
        snapshot: &ContextSnapshot,
        digest: &str,
        template: &'static PromptTemplate,
        admission: AdmissionDecision,
    ) -> Entry {
        let excerpt = summary::context_excerpt(snapshot);
        let system = prompt::system_instruction(self.config.max_words);
        let user = prompt::user_prompt(template, &excerpt);

        let started = Instant::now();
        let outcome = match tokio::time::timeout(
            self.generation_timeout,
            self.generator
                .generate(&system, &user, self.config.max_tokens),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                timeout_ms: u64::try_from(self.generation_timeout.as_millis())
                    .unwrap_or(u64::MAX),
            }),
        };
        let latency = started.elapsed();
        self.observer
            .record_metric(&DiaryMetric::GenerationLatency(latency));

        let mut metadata = BTreeMap::new();
        metadata.insert("prompt_template".to_string(), template.id.into());
        metadata.insert("context_digest".to_string(), digest.into());
        metadata.insert(
            "generation_backend".to_string(),
            self.generator.backend().into(),
        );
        metadata.insert(
            "generation_latency_ms".to_string(),
            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX).into(),
        );

        let (title, body, tags) = match outcome {
            Ok(generated) => self.accept_generated(template, generated),
            Err(error) => {
                tracing::warn!(
                    session_id,
                    template = template.id,
                    kind = error.kind(),
                    error = %error,
                    "diary generation failed; writing fallback entry"
                );
                self.observer.record_event(&DiaryEvent::GenerationFailed {
                    session_id: session_id.to_string(),
                    kind: error.kind(),
                    message: error.to_string(),
                });
                metadata.insert(
                    "generation_error".to_string(),
                    serde_json::json!({ "kind": error.kind(), "message": error.to_string() }),
                );
                let tags = [FALLBACK_TAG, SYSTEM_TAG]
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (
                    template.title_hint.to_string(),
                    truncate_words(digest, self.config.max_words),
                    tags,
                )
            }
        };

        Entry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            title,
            body,
            mode: template.mode,
            register: template.register,
            tags,
            session_id: session_id.to_string(),
            context_excerpt: excerpt,
            admission,
            metadata,
        }
    }

    fn accept_generated(
        &self,
        template: &PromptTemplate,
        generated: GeneratedEntry,
    ) -> (String, String, BTreeSet<String>) {
        let title = generated.title.trim();
        let title = if title.is_empty() {
            template.title_hint.to_string()
        } else {
            truncate_with_ellipsis(title, MAX_TITLE_CHARS)
        };
        let body = truncate_words(&generated.body, self.config.max_words);
        (title, body, normalize_tags(&generated.tags))
    }

    async fn commit(
        &self,
        session_id: &str,
        journal: &mut SessionJournal,
        entry: &Entry,
        forced: bool,
    ) {
        journal.history.push_front(entry.clone());
        journal.history.truncate(self.config.history_cap);
        self.observer.record_metric(&DiaryMetric::HistoryLength {
            session_id: session_id.to_string(),
            len: journal.history.len() as u64,
        });

        match self.persist(session_id, entry).await {
            Ok(dropped) => {
                health::mark_component_ok(self.store_component);
                if dropped > 0 {
                    tracing::debug!(session_id, dropped, "trimmed diary history");
                }
            }
            Err(error) => {
                tracing::error!(
                    session_id,
                    entry_id = %entry.id,
                    store = self.store.name(),
                    error = %error,
                    "failed to persist diary entry"
                );
                health::mark_component_error(self.store_component, &error);
                self.observer.record_event(&DiaryEvent::PersistFailed {
                    session_id: session_id.to_string(),
                    message: error.to_string(),
                });
            }
        }

        tracing::info!(
            session_id,
            entry_id = %entry.id,
            mode = %entry.mode,
            forced,
            fallback = entry.is_fallback(),
            words = entry.word_count(),
            "diary entry written"
        );
        self.observer.record_event(&DiaryEvent::EntryWritten {
            session_id: session_id.to_string(),
            entry_id: entry.id.clone(),
            mode: entry.mode,
            forced,
            fallback: entry.is_fallback(),
        });
    }

    async fn persist(
        &self,
        session_id: &str,
        entry: &Entry,
    ) -> std::result::Result<usize, crate::error::StoreError> {
        self.store.append(session_id, entry).await?;
        self.store.trim(session_id, self.config.history_cap).await
    }
}

/// Lowercase, trimmed, without a leading `#`, deduplicated, at most
/// [`MAX_TAGS`]. Reserved fallback markers are never taken from the model.
fn normalize_tags(raw: &[String]) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    for tag in raw {
        let tag = tag.trim().trim_start_matches('#').trim().to_lowercase();
        if tag.is_empty() || tag == FALLBACK_TAG || tag == SYSTEM_TAG {
            continue;
        }
        tags.insert(tag);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}
