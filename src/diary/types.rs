use crate::utils::text::word_count;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tone family of an entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EntryMode {
    Directive,
    Exploratory,
    Reflective,
    Casual,
}

/// Whether an entry was self-initiated or prompted by friction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Register {
    Active,
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    TooSoon,
    RateLimited,
    LowNovelty,
    LowRelevance,
    ManualOverride,
    Ok,
}

/// Outcome of the admission gate, kept on every entry for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionDecision {
    pub accepted: bool,
    pub reason: ReasonCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub novelty_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl AdmissionDecision {
    pub fn reject(reason: ReasonCode) -> Self {
        Self {
            accepted: false,
            reason,
            novelty_score: None,
            relevance_score: None,
        }
    }

    pub fn manual_override() -> Self {
        Self {
            accepted: true,
            reason: ReasonCode::ManualOverride,
            novelty_score: None,
            relevance_score: None,
        }
    }

    pub fn with_scores(mut self, novelty: Option<f64>, relevance: Option<f64>) -> Self {
        self.novelty_score = novelty;
        self.relevance_score = relevance;
        self
    }
}

/// Static catalog entry handed to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub register: Register,
    pub mode: EntryMode,
    pub template: &'static str,
    pub title_hint: &'static str,
}

/// Reduced copy of the context snapshot kept on the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextExcerpt {
    #[serde(default)]
    pub top_priorities: Vec<String>,
    #[serde(default)]
    pub recently_completed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_event: Option<String>,
    #[serde(default)]
    pub recent_tools: Vec<String>,
}

impl ContextExcerpt {
    pub fn is_empty(&self) -> bool {
        self.top_priorities.is_empty()
            && self.recently_completed.is_empty()
            && self.next_event.is_none()
            && self.recent_tools.is_empty()
    }
}

/// A journal entry. Never mutated after the orchestrator assembles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub mode: EntryMode,
    pub register: Register,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub session_id: String,
    #[serde(default)]
    pub context_excerpt: ContextExcerpt,
    pub admission: AdmissionDecision,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Entry {
    pub fn word_count(&self) -> usize {
        word_count(&self.body)
    }

    pub fn is_fallback(&self) -> bool {
        self.tags.contains(FALLBACK_TAG)
    }

    /// Case-insensitive substring match over title, body and tags.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.body.to_lowercase().contains(needle_lower)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle_lower))
    }
}

pub const FALLBACK_TAG: &str = "fallback";
pub const SYSTEM_TAG: &str = "system";

/// Structured shape requested from the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedEntry {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
