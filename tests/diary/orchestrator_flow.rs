use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use iris_diary::config::{DiaryConfig, GovernorConfig};
use iris_diary::diary::context::ContextSnapshot;
use iris_diary::diary::types::{FALLBACK_TAG, SYSTEM_TAG};
use iris_diary::diary::{
    DiaryOrchestrator, EntryMode, EntryStore, GenerationService, InMemoryEntryStore, ReasonCode,
    SqliteEntryStore, StaticContextAggregator, WorkspaceContextAggregator,
};
use iris_diary::error::{DiaryError, GenerationError};

use crate::diary_harness::{ScriptedGenerator, eventful_snapshot};

fn write_context(workspace: &std::path::Path, session: &str, snapshot: &ContextSnapshot) {
    let dir = workspace.join("context");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{session}.json")),
        serde_json::to_vec_pretty(snapshot).unwrap(),
    )
    .unwrap();
}

fn orchestrator(
    workspace: &std::path::Path,
    generator: Arc<dyn GenerationService>,
    store: Arc<dyn EntryStore>,
) -> DiaryOrchestrator {
    DiaryOrchestrator::new(
        DiaryConfig::default(),
        Arc::new(WorkspaceContextAggregator::new(workspace)),
        generator,
        store,
    )
}

#[tokio::test]
async fn workspace_context_to_sqlite_and_back() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("diary").join("entries.db");
    write_context(tmp.path(), "main", &eventful_snapshot());

    let written = {
        let store = Arc::new(SqliteEntryStore::open(&db_path).await.unwrap());
        let diary = orchestrator(
            tmp.path(),
            ScriptedGenerator::replying(
                "Catching up",
                "The login fix shipped; taxes still wait.",
                &["Progress"],
            ),
            store,
        );
        let entry = diary.attempt_entry("main").await.unwrap().unwrap();
        assert_eq!(entry.admission.reason, ReasonCode::Ok);
        assert_eq!(entry.mode, EntryMode::Directive);
        assert!(entry.tags.contains("progress"));
        entry
    };

    // a fresh process sees the persisted head and respects the cooldown
    let store = Arc::new(SqliteEntryStore::open(&db_path).await.unwrap());
    let generator = ScriptedGenerator::replying("Again", "Should not be written.", &[]);
    let diary = orchestrator(tmp.path(), generator.clone(), store);

    assert_eq!(diary.recent_entries("main", 10).await, vec![written.clone()]);
    assert!(diary.attempt_entry("main").await.unwrap().is_none());
    assert_eq!(generator.calls(), 0);

    let status = diary.governor_status("main").await;
    assert_eq!(status.last_entry_at, Some(written.timestamp));
    assert_eq!(status.recent_hour_count, 1);
}

#[tokio::test]
async fn missing_context_file_means_nothing_to_write() {
    let tmp = TempDir::new().unwrap();
    let generator = ScriptedGenerator::replying("Quiet", "Nothing happened.", &[]);
    let diary = orchestrator(
        tmp.path(),
        generator.clone(),
        Arc::new(InMemoryEntryStore::new()),
    );

    assert!(diary.attempt_entry("main").await.unwrap().is_none());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn corrupt_context_file_fails_the_cycle_only() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("context")).unwrap();
    std::fs::write(tmp.path().join("context").join("main.json"), "{ nope").unwrap();

    let diary = orchestrator(
        tmp.path(),
        ScriptedGenerator::replying("t", "b", &[]),
        Arc::new(InMemoryEntryStore::new()),
    );
    assert!(matches!(
        diary.attempt_entry("main").await,
        Err(DiaryError::Context(_))
    ));

    write_context(tmp.path(), "main", &eventful_snapshot());
    assert!(diary.attempt_entry("main").await.unwrap().is_some());
}

#[tokio::test]
async fn timed_out_generation_writes_digest_fallback() {
    let generator = ScriptedGenerator::hanging();
    let store = Arc::new(InMemoryEntryStore::new());
    let diary = DiaryOrchestrator::new(
        DiaryConfig::default(),
        Arc::new(StaticContextAggregator::new(eventful_snapshot())),
        generator.clone(),
        store.clone(),
    )
    .with_generation_timeout(Duration::from_millis(50));

    let entry = diary.attempt_entry("main").await.unwrap().unwrap();

    assert_eq!(generator.calls(), 1);
    assert_eq!(entry.tags.len(), 2);
    assert!(entry.tags.contains(FALLBACK_TAG));
    assert!(entry.tags.contains(SYSTEM_TAG));
    assert_eq!(entry.body, entry.metadata["context_digest"].as_str().unwrap());
    assert_eq!(entry.metadata["generation_error"]["kind"], "timeout");
    assert_eq!(entry.admission.reason, ReasonCode::Ok);
    assert_eq!(store.list("main", 5).await.unwrap(), vec![entry]);
}

#[tokio::test]
async fn upstream_failure_still_records_forced_entry() {
    let diary = DiaryOrchestrator::new(
        DiaryConfig::default(),
        Arc::new(StaticContextAggregator::new(eventful_snapshot())),
        ScriptedGenerator::failing(GenerationError::Upstream {
            provider: "openrouter".into(),
            message: "503 Service Unavailable".into(),
        }),
        Arc::new(InMemoryEntryStore::new()),
    );

    let entry = diary
        .force_entry("main", Some(EntryMode::Reflective))
        .await
        .unwrap();
    assert!(entry.is_fallback());
    assert_eq!(entry.mode, EntryMode::Reflective);
    assert_eq!(entry.admission.reason, ReasonCode::ManualOverride);
}

#[tokio::test]
async fn history_cap_bounds_sqlite_rows() {
    let store = Arc::new(SqliteEntryStore::in_memory().await.unwrap());
    let config = DiaryConfig {
        history_cap: 4,
        governor: GovernorConfig {
            min_interval_seconds: 0,
            max_entries_per_hour: 100,
            novelty_threshold: 0.0,
            relevance_threshold: 0.0,
            ..GovernorConfig::default()
        },
        ..DiaryConfig::default()
    };
    let diary = DiaryOrchestrator::new(
        config,
        Arc::new(StaticContextAggregator::new(eventful_snapshot())),
        ScriptedGenerator::replying("Tick", "Another round.", &[]),
        store.clone(),
    );

    for _ in 0..9 {
        assert!(diary.attempt_entry("main").await.unwrap().is_some());
    }

    assert_eq!(diary.recent_entries("main", 100).await.len(), 4);
    assert_eq!(store.list("main", 100).await.unwrap().len(), 4);
}
