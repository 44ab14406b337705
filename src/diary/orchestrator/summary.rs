//! Text derived from a context snapshot: the governor's candidate summary,
//! the human-readable digest and the excerpt stored on each entry.

use crate::diary::context::{ContextSnapshot, SystemHealth, TaskItem};
use crate::diary::types::ContextExcerpt;
use crate::utils::text::truncate_with_ellipsis;

const MAX_LIST_ITEMS: usize = 5;
const MAX_ITEM_CHARS: usize = 80;

pub(crate) const EMPTY_DIGEST: &str = "No notable activity";

fn titles(items: &[TaskItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.title.trim())
        .filter(|title| !title.is_empty())
        .take(MAX_LIST_ITEMS)
        .map(|title| truncate_with_ellipsis(title, MAX_ITEM_CHARS))
        .collect()
}

fn names(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .take(MAX_LIST_ITEMS)
        .map(|name| truncate_with_ellipsis(name, MAX_ITEM_CHARS))
        .collect()
}

fn next_event_line(snapshot: &ContextSnapshot) -> Option<String> {
    snapshot.next_event.as_ref().map(|event| {
        format!(
            "{} at {}",
            truncate_with_ellipsis(event.title.trim(), MAX_ITEM_CHARS),
            event.starts_at.format("%Y-%m-%d %H:%M UTC")
        )
    })
}

/// Reduced copy of the snapshot kept on the entry for audit.
pub(crate) fn context_excerpt(snapshot: &ContextSnapshot) -> ContextExcerpt {
    ContextExcerpt {
        top_priorities: titles(&snapshot.tasks.top_priorities),
        recently_completed: titles(&snapshot.tasks.recently_completed),
        next_event: next_event_line(snapshot),
        recent_tools: names(&snapshot.activity.recently_used_tools),
    }
}

/// One-paragraph, human-readable restatement of the snapshot.
pub(crate) fn context_digest(snapshot: &ContextSnapshot) -> String {
    let mut parts = Vec::new();

    let mut push_list = |label: &str, items: Vec<String>| {
        if !items.is_empty() {
            parts.push(format!("{label}: {}", items.join(", ")));
        }
    };
    push_list("Top priorities", titles(&snapshot.tasks.top_priorities));
    push_list("Overdue", titles(&snapshot.tasks.overdue));
    push_list("Recently completed", titles(&snapshot.tasks.recently_completed));
    push_list(
        "Tools with issues",
        snapshot
            .unhealthy_tools()
            .map(|tool| tool.name.clone())
            .take(MAX_LIST_ITEMS)
            .collect(),
    );
    push_list(
        "Recently used tools",
        names(&snapshot.activity.recently_used_tools),
    );
    push_list("Recent errors", names(&snapshot.activity.recent_errors));

    if let Some(event) = next_event_line(snapshot) {
        parts.push(format!("Next event: {event}"));
    }
    if snapshot.activity.recent_conversation_count > 0 {
        parts.push(format!(
            "Recent conversations: {}",
            snapshot.activity.recent_conversation_count
        ));
    }
    let health = snapshot.health();
    if health != SystemHealth::Good {
        parts.push(format!("System health: {health}"));
    }

    if parts.is_empty() {
        EMPTY_DIGEST.to_string()
    } else {
        parts.join("; ")
    }
}

/// Heuristic summary handed to the admission governor: the interesting
/// facets of the snapshot followed by the digest.
pub(crate) fn candidate_summary(snapshot: &ContextSnapshot, digest: &str) -> String {
    let mut facets = Vec::new();
    if !snapshot.tasks.overdue.is_empty() {
        facets.push("overdue tasks");
    }
    if !snapshot.tasks.recently_completed.is_empty() {
        facets.push("recent completions");
    }
    if snapshot.unhealthy_tools().next().is_some() || snapshot.health() != SystemHealth::Good {
        facets.push("tool issues");
    }
    if snapshot.activity.recent_conversation_count > 0 {
        facets.push("active conversations");
    }

    if facets.is_empty() {
        digest.to_string()
    } else {
        format!("{}. {digest}", facets.join(", "))
    }
}
