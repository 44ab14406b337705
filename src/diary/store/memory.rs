use super::{EntryStore, StoreFuture};
use crate::diary::types::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Process-local store. Each session's deque is kept newest first.
#[derive(Default)]
pub struct InMemoryEntryStore {
    sessions: Mutex<HashMap<String, VecDeque<Entry>>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_sessions<T>(&self, f: impl FnOnce(&mut HashMap<String, VecDeque<Entry>>) -> T) -> T {
        let mut guard = self
            .sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

impl EntryStore for InMemoryEntryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn append<'a>(&'a self, session_id: &'a str, entry: &'a Entry) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.with_sessions(|sessions| {
                sessions
                    .entry(session_id.to_string())
                    .or_default()
                    .push_front(entry.clone());
            });
            Ok(())
        })
    }

    fn list<'a>(&'a self, session_id: &'a str, limit: usize) -> StoreFuture<'a, Vec<Entry>> {
        Box::pin(async move {
            Ok(self.with_sessions(|sessions| {
                sessions
                    .get(session_id)
                    .map(|entries| entries.iter().take(limit).cloned().collect())
                    .unwrap_or_default()
            }))
        })
    }

    fn trim<'a>(&'a self, session_id: &'a str, max_count: usize) -> StoreFuture<'a, usize> {
        Box::pin(async move {
            Ok(self.with_sessions(|sessions| {
                let Some(entries) = sessions.get_mut(session_id) else {
                    return 0;
                };
                let dropped = entries.len().saturating_sub(max_count);
                entries.truncate(max_count);
                dropped
            }))
        })
    }
}
