use tempfile::TempDir;

use iris_diary::config::{Config, StoreBackend};
use iris_diary::error::{ConfigError, DiaryError};

#[test]
fn diary_sections_load_from_toml() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("config.toml"),
        r#"
default_provider = "ollama"
default_model = "llama3.2"

[diary]
interval_minutes = 15
active_session = "work"
max_words = 90

[diary.governor]
min_interval_seconds = 1800
max_entries_per_hour = 2
relevant_keywords = ["release", "deploy"]

[store]
backend = "memory"

[observability]
backend = "none"
"#,
    )
    .unwrap();

    let config = Config::load_or_init_in(tmp.path()).unwrap();

    assert_eq!(config.provider_name(), "ollama");
    assert_eq!(config.model_name(), "llama3.2");
    assert_eq!(config.diary.interval_minutes, 15);
    assert_eq!(config.diary.active_session, "work");
    assert_eq!(config.diary.max_words, 90);
    assert_eq!(config.diary.history_cap, 100);
    assert_eq!(config.diary.governor.min_interval_seconds, 1800);
    assert_eq!(config.diary.governor.max_entries_per_hour, 2);
    assert_eq!(config.diary.governor.relevant_keywords, vec!["release", "deploy"]);
    assert!((config.diary.governor.novelty_threshold - 0.35).abs() < f64::EPSILON);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.observability.backend, "none");
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("config.toml"),
        "[diary.governor]\nrelevance_threshold = 1.5\n",
    )
    .unwrap();

    let err = Config::load_or_init_in(tmp.path()).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("relevance_threshold"), "{chain}");
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Validation(_))
    ));
}

#[test]
fn validation_error_lifts_into_diary_error() {
    let mut config = Config::default();
    config.diary.history_cap = 0;

    let err: DiaryError = config.validate().unwrap_err().into();
    assert!(matches!(err, DiaryError::Config(ConfigError::Validation(_))));
    assert!(err.to_string().contains("history_cap"));
}

#[test]
fn first_run_round_trips_defaults() {
    let tmp = TempDir::new().unwrap();
    let first = Config::load_or_init_in(tmp.path()).unwrap();
    let second = Config::load_or_init_in(tmp.path()).unwrap();

    assert_eq!(first.diary.governor, second.diary.governor);
    assert_eq!(second.store.backend, StoreBackend::Sqlite);
    assert!(second.diary.enabled);
}
