use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the diary subsystem.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; adapters and glue code continue to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum DiaryError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Context aggregation ─────────────────────────────────────────────
    #[error("context: {0}")]
    Context(#[from] ContextError),

    // ── Generation service ──────────────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    // ── Entry store ─────────────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Context aggregation errors ──────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("aggregation failed for session {session_id}: {message}")]
    Aggregation { session_id: String, message: String },

    #[error("snapshot decode failed: {0}")]
    Decode(String),
}

// ─── Generation errors ───────────────────────────────────────────────────────

/// Failures of the external generation call. The orchestrator treats every
/// variant identically: the entry falls back to a digest restatement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("malformed generation payload: {0}")]
    Malformed(String),

    #[error("upstream {provider} failed: {message}")]
    Upstream { provider: String, message: String },
}

impl GenerationError {
    /// Short machine-readable label stored in entry metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Malformed(_) => "malformed",
            Self::Upstream { .. } => "upstream",
        }
    }
}

// ─── Store errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("entry codec failed: {0}")]
    Codec(String),

    #[error("backend not available: {0}")]
    BackendUnavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        Self::Query(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Codec(error.to_string())
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, DiaryError>;
