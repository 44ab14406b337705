//! Autonomous diary: decides when the assistant writes a reflective entry,
//! picks the prompt, generates and persists it.

pub mod context;
pub mod generation;
pub mod governor;
pub mod orchestrator;
pub mod scheduler;
pub mod selector;
pub mod store;
pub mod types;

pub use context::{
    ContextAggregator, ContextSnapshot, StaticContextAggregator, WorkspaceContextAggregator,
};
pub use generation::{GenerationService, ProviderGenerationService};
pub use governor::{AdmissionGovernor, GovernorStatus};
pub use orchestrator::DiaryOrchestrator;
pub use scheduler::run_diary_worker;
pub use selector::{PromptSelector, RandomSource, SeededRandom, ThreadRandom};
pub use store::{EntryStore, InMemoryEntryStore, SqliteEntryStore, create_store};
pub use types::{AdmissionDecision, Entry, EntryMode, ReasonCode, Register};
