use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    /// Session the background worker writes for.
    #[serde(default = "default_active_session")]
    pub active_session: String,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub governor: GovernorConfig,
}

fn default_true() -> bool {
    true
}

fn default_interval_minutes() -> u32 {
    5
}

fn default_active_session() -> String {
    "main".into()
}

fn default_max_words() -> usize {
    180
}

fn default_history_cap() -> usize {
    100
}

fn default_generation_timeout_secs() -> u64 {
    8
}

fn default_max_tokens() -> u32 {
    400
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_minutes: default_interval_minutes(),
            active_session: default_active_session(),
            max_words: default_max_words(),
            history_cap: default_history_cap(),
            generation_timeout_secs: default_generation_timeout_secs(),
            max_tokens: default_max_tokens(),
            governor: GovernorConfig::default(),
        }
    }
}

impl DiaryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.max_words >= 1, || "diary.max_words must be at least 1".into())?;
        ensure(self.history_cap >= 1, || {
            "diary.history_cap must be at least 1".into()
        })?;
        ensure(!self.active_session.trim().is_empty(), || {
            "diary.active_session must not be empty".into()
        })?;
        self.governor.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernorConfig {
    #[serde(default = "default_min_interval_seconds")]
    pub min_interval_seconds: u64,
    #[serde(default = "default_max_entries_per_hour")]
    pub max_entries_per_hour: usize,
    #[serde(default = "default_novelty_threshold")]
    pub novelty_threshold: f64,
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
    #[serde(default = "default_relevant_keywords")]
    pub relevant_keywords: Vec<String>,
}

fn default_min_interval_seconds() -> u64 {
    900
}

fn default_max_entries_per_hour() -> usize {
    3
}

fn default_novelty_threshold() -> f64 {
    0.35
}

fn default_relevance_threshold() -> f64 {
    0.20
}

fn default_relevant_keywords() -> Vec<String> {
    [
        "task",
        "tool",
        "calendar",
        "schedule",
        "meeting",
        "event",
        "deadline",
        "overdue",
        "priorit",
        "complet",
        "progress",
        "project",
        "error",
        "fail",
        "health",
        "degrad",
        "conversation",
        "session",
        "focus",
        "plan",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            min_interval_seconds: default_min_interval_seconds(),
            max_entries_per_hour: default_max_entries_per_hour(),
            novelty_threshold: default_novelty_threshold(),
            relevance_threshold: default_relevance_threshold(),
            relevant_keywords: default_relevant_keywords(),
        }
    }
}

impl GovernorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure((0.0..=1.0).contains(&self.novelty_threshold), || {
            format!(
                "diary.governor.novelty_threshold must be within [0, 1], got {}",
                self.novelty_threshold
            )
        })?;
        ensure((0.0..=1.0).contains(&self.relevance_threshold), || {
            format!(
                "diary.governor.relevance_threshold must be within [0, 1], got {}",
                self.relevance_threshold
            )
        })?;
        ensure(self.max_entries_per_hour >= 1, || {
            "diary.governor.max_entries_per_hour must be at least 1".into()
        })
    }
}

/// `Err(ConfigError::Validation)` with the lazily built message when `ok` is false.
pub(crate) fn ensure(ok: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Validation(message()))
    }
}
