//! Admission gate for background diary writes.
//!
//! The governor is a pure function of its configuration and the history it is
//! handed on each call. Checks run cheapest first and the first failing check
//! decides the outcome:
//!
//! 1. cooldown since the last entry
//! 2. trailing one-hour rate window
//! 3. lexical novelty against the ten most recent entries
//! 4. keyword relevance

use super::types::{AdmissionDecision, Entry, ReasonCode};
use crate::config::GovernorConfig;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Number of most recent entries that form the novelty reference vocabulary.
pub const NOVELTY_REFERENCE_WINDOW: usize = 10;

const MIN_TOKEN_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "have", "has", "was", "were", "are",
    "but", "not", "you", "your", "our", "its", "into", "about", "been", "will", "just", "they",
    "them", "then", "than", "there", "their", "what", "when", "which", "while", "also", "some",
    "more", "very", "can", "all", "any", "had", "she", "his", "her", "who", "out", "too",
];

/// The slice of an entry the governor looks at.
#[derive(Debug, Clone, Copy)]
pub struct RecentEntry<'a> {
    pub timestamp: DateTime<Utc>,
    pub body: &'a str,
}

impl<'a> From<&'a Entry> for RecentEntry<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            timestamp: entry.timestamp,
            body: &entry.body,
        }
    }
}

/// Observability view of the gate for one session.
#[derive(Debug, Clone, Serialize)]
pub struct GovernorStatus {
    pub config: GovernorConfig,
    pub recent_hour_count: usize,
    pub last_entry_at: Option<DateTime<Utc>>,
    pub next_eligible_at: Option<DateTime<Utc>>,
    pub rate_limited: bool,
}

pub struct AdmissionGovernor {
    config: GovernorConfig,
    keywords: Vec<String>,
}

impl AdmissionGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        let keywords = config
            .relevant_keywords
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self { config, keywords }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Decide whether a background entry may be written at `now`.
    pub fn decide(
        &self,
        now: DateTime<Utc>,
        candidate_summary: &str,
        recent_entries: &[RecentEntry<'_>],
        last_entry_at: Option<DateTime<Utc>>,
    ) -> AdmissionDecision {
        if let Some(last) = last_entry_at
            && now.signed_duration_since(last) < self.min_interval()
        {
            return AdmissionDecision::reject(ReasonCode::TooSoon);
        }

        if self.recent_hour_count(now, recent_entries) >= self.config.max_entries_per_hour {
            return AdmissionDecision::reject(ReasonCode::RateLimited);
        }

        let tokens = tokenize(candidate_summary);

        let novelty = novelty_score(&tokens, recent_entries);
        if novelty < self.config.novelty_threshold {
            return AdmissionDecision::reject(ReasonCode::LowNovelty)
                .with_scores(Some(novelty), None);
        }

        let relevance = self.relevance_score(&tokens);
        if relevance < self.config.relevance_threshold {
            return AdmissionDecision::reject(ReasonCode::LowRelevance)
                .with_scores(Some(novelty), Some(relevance));
        }

        AdmissionDecision {
            accepted: true,
            reason: ReasonCode::Ok,
            novelty_score: Some(novelty),
            relevance_score: Some(relevance),
        }
    }

    /// Decision recorded for forced writes; the gate is not consulted.
    pub fn manual_override(&self) -> AdmissionDecision {
        AdmissionDecision::manual_override()
    }

    /// Entries whose timestamp falls in `[now - 1h, now]`.
    pub fn recent_hour_count(&self, now: DateTime<Utc>, recent_entries: &[RecentEntry<'_>]) -> usize {
        let window_start = now - TimeDelta::hours(1);
        recent_entries
            .iter()
            .filter(|entry| entry.timestamp >= window_start && entry.timestamp <= now)
            .count()
    }

    pub fn next_eligible_at(&self, last_entry_at: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        last_entry_at.and_then(|last| last.checked_add_signed(self.min_interval()))
    }

    pub fn status(
        &self,
        now: DateTime<Utc>,
        recent_entries: &[RecentEntry<'_>],
        last_entry_at: Option<DateTime<Utc>>,
    ) -> GovernorStatus {
        let recent_hour_count = self.recent_hour_count(now, recent_entries);
        GovernorStatus {
            config: self.config.clone(),
            recent_hour_count,
            last_entry_at,
            next_eligible_at: self.next_eligible_at(last_entry_at),
            rate_limited: recent_hour_count >= self.config.max_entries_per_hour,
        }
    }

    /// Share of tokens containing a domain keyword, normalized so that one hit
    /// per ten tokens saturates the score.
    pub fn relevance_score(&self, tokens: &[String]) -> f64 {
        if tokens.is_empty() || self.keywords.is_empty() {
            return 0.0;
        }

        let matching = tokens
            .iter()
            .filter(|token| self.keywords.iter().any(|keyword| token.contains(keyword.as_str())))
            .count();
        let denominator = (0.1 * count_as_f64(tokens.len())).max(1.0);
        (count_as_f64(matching) / denominator).min(1.0)
    }

    fn min_interval(&self) -> TimeDelta {
        i64::try_from(self.config.min_interval_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

/// Lowercase alphanumeric tokens longer than two characters, stop words removed.
/// Duplicates are kept so repeated words weigh in both scores.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|raw| raw.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// `1 - |tokens ∩ vocabulary| / |tokens|` against the most recent entries.
/// With no history the candidate is novel by definition.
pub fn novelty_score(tokens: &[String], recent_entries: &[RecentEntry<'_>]) -> f64 {
    if recent_entries.is_empty() {
        return 1.0;
    }

    let mut newest_first: Vec<&RecentEntry<'_>> = recent_entries.iter().collect();
    newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let vocabulary: HashSet<String> = newest_first
        .into_iter()
        .take(NOVELTY_REFERENCE_WINDOW)
        .flat_map(|entry| tokenize(entry.body))
        .collect();

    let overlap = tokens.iter().filter(|token| vocabulary.contains(*token)).count();
    let overlap_ratio = count_as_f64(overlap) / count_as_f64(tokens.len().max(1));
    (1.0 - overlap_ratio).max(0.0)
}

#[allow(clippy::cast_precision_loss)]
fn count_as_f64(count: usize) -> f64 {
    count as f64
}
