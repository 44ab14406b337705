use chrono::{TimeDelta, TimeZone, Utc};

use iris_diary::config::GovernorConfig;
use iris_diary::diary::governor::RecentEntry;
use iris_diary::diary::{AdmissionGovernor, ReasonCode};

use crate::diary_harness::entry_at;

fn governor() -> AdmissionGovernor {
    AdmissionGovernor::new(GovernorConfig {
        min_interval_seconds: 900,
        max_entries_per_hour: 3,
        ..GovernorConfig::default()
    })
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn first_candidate_is_admitted_with_full_novelty() {
    let decision = governor().decide(now(), "overdue tasks, tool issues", &[], None);

    assert!(decision.accepted);
    assert_eq!(decision.reason, ReasonCode::Ok);
    assert_eq!(decision.novelty_score, Some(1.0));
    assert!(decision.relevance_score.unwrap() > 0.0);
}

#[test]
fn minute_later_is_too_soon() {
    let first = entry_at(now(), "overdue tasks, tool issues");
    let recent = [RecentEntry::from(&first)];

    let decision = governor().decide(
        now() + TimeDelta::seconds(60),
        "overdue tasks, tool issues",
        &recent,
        Some(first.timestamp),
    );
    assert!(!decision.accepted);
    assert_eq!(decision.reason, ReasonCode::TooSoon);
}

#[test]
fn three_entries_in_the_hour_rate_limit() {
    let entries = [
        entry_at(now() - TimeDelta::minutes(20), "released the build"),
        entry_at(now() - TimeDelta::minutes(40), "calendar sync trouble"),
        entry_at(now() - TimeDelta::minutes(55), "planning the week"),
    ];
    let recent: Vec<RecentEntry<'_>> = entries.iter().map(RecentEntry::from).collect();

    let decision = governor().decide(
        now(),
        "entirely new deadline pressure on the project",
        &recent,
        Some(entries[0].timestamp),
    );
    assert_eq!(decision.reason, ReasonCode::RateLimited);
}

#[test]
fn repeated_vocabulary_has_low_novelty() {
    let entries: Vec<_> = (0..10)
        .map(|i| {
            entry_at(
                now() - TimeDelta::hours(2 + i),
                "task task task, another task on the task list",
            )
        })
        .collect();
    let recent: Vec<RecentEntry<'_>> = entries.iter().map(RecentEntry::from).collect();

    let decision = governor().decide(now(), "task task task", &recent, Some(entries[0].timestamp));
    assert_eq!(decision.reason, ReasonCode::LowNovelty);
    assert_eq!(decision.novelty_score, Some(0.0));
}

#[test]
fn status_reports_next_eligible_time() {
    let last = entry_at(now() - TimeDelta::minutes(5), "tool trouble");
    let recent = [RecentEntry::from(&last)];

    let status = governor().status(now(), &recent, Some(last.timestamp));
    assert_eq!(status.recent_hour_count, 1);
    assert!(!status.rate_limited);
    assert_eq!(
        status.next_eligible_at,
        Some(last.timestamp + TimeDelta::minutes(15))
    );
}
