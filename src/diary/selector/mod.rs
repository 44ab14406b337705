//! Context-conditioned prompt selection.
//!
//! A small decision tree maps snapshot features to an entry mode and an
//! optional register preference; the final template is drawn uniformly from
//! the matching catalog slice through an injected [`RandomSource`].

pub mod catalog;

use crate::diary::context::{ContextSnapshot, SystemHealth};
use crate::diary::types::{EntryMode, PromptTemplate, Register};
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Feature vector the decision tree runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorFeatures {
    pub has_errors: bool,
    pub has_overdue_work: bool,
    pub recent_success_count: usize,
    pub system_health: SystemHealth,
    pub last_mode: Option<EntryMode>,
}

impl SelectorFeatures {
    pub fn from_snapshot(snapshot: &ContextSnapshot, last_mode: Option<EntryMode>) -> Self {
        Self {
            has_errors: snapshot.has_errors(),
            has_overdue_work: !snapshot.tasks.overdue.is_empty(),
            recent_success_count: snapshot.tasks.recently_completed.len(),
            system_health: snapshot.health(),
            last_mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDecision {
    pub mode: EntryMode,
    pub register_preference: Option<Register>,
}

/// First matching branch wins.
pub fn decide_mode(features: &SelectorFeatures) -> ModeDecision {
    if features.has_errors || features.has_overdue_work || features.system_health == SystemHealth::Poor
    {
        let mode = if features.has_overdue_work {
            EntryMode::Directive
        } else {
            EntryMode::Reflective
        };
        return ModeDecision {
            mode,
            register_preference: Some(Register::Passive),
        };
    }

    let mode = if features.recent_success_count > 2 {
        EntryMode::Exploratory
    } else if features.system_health == SystemHealth::Good {
        if features.last_mode == Some(EntryMode::Casual) {
            EntryMode::Directive
        } else {
            EntryMode::Casual
        }
    } else {
        EntryMode::Reflective
    };

    ModeDecision {
        mode,
        register_preference: None,
    }
}

/// Uniform index source. Injected so tests can pin the pick.
pub trait RandomSource: Send + Sync {
    /// Index in `0..len`. `len` is never zero.
    fn index(&self, len: usize) -> usize;
}

pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::rng().random_range(0..len)
    }
}

/// splitmix64 stream; the same seed always yields the same picks.
pub struct SeededRandom {
    state: AtomicU64,
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed ^ GOLDEN_GAMMA),
        }
    }

    fn next_u64(&self) -> u64 {
        let mut z = self
            .state
            .fetch_add(GOLDEN_GAMMA, Ordering::Relaxed)
            .wrapping_add(GOLDEN_GAMMA);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl RandomSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let bound = u64::try_from(len).unwrap_or(u64::MAX);
        usize::try_from(self.next_u64() % bound).unwrap_or(0)
    }
}

pub struct PromptSelector {
    random: Arc<dyn RandomSource>,
}

impl Default for PromptSelector {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl PromptSelector {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn choose(&self, features: &SelectorFeatures) -> &'static PromptTemplate {
        let decision = decide_mode(features);
        self.pick(decision.mode, decision.register_preference)
    }

    /// Forced entries may pin the mode; the register preference still comes
    /// from the features.
    pub fn choose_with_mode(
        &self,
        mode: EntryMode,
        features: &SelectorFeatures,
    ) -> &'static PromptTemplate {
        let preference = decide_mode(features).register_preference;
        self.pick(mode, preference)
    }

    /// Templates the pick is drawn from for a mode and optional register.
    pub fn candidates(
        mode: EntryMode,
        register_preference: Option<Register>,
    ) -> Vec<&'static PromptTemplate> {
        let in_mode: Vec<&'static PromptTemplate> = catalog::templates_for(mode).collect();
        let Some(register) = register_preference else {
            return in_mode;
        };

        let preferred: Vec<&'static PromptTemplate> = in_mode
            .iter()
            .copied()
            .filter(|template| template.register == register)
            .collect();
        if preferred.is_empty() {
            in_mode
        } else {
            preferred
        }
    }

    fn pick(&self, mode: EntryMode, register_preference: Option<Register>) -> &'static PromptTemplate {
        let candidates = Self::candidates(mode, register_preference);
        if candidates.is_empty() {
            return &catalog::CATALOG[0];
        }
        let index = self.random.index(candidates.len());
        candidates.get(index).copied().unwrap_or(candidates[0])
    }
}
