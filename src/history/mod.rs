use crate::{
    error::StoreError,
    models::{HistoryEntry, NewHistoryEntry},
};
use chrono::Utc;
use std::{collections::HashMap, sync::RwLock};
use uuid::Uuid;

struct Slot {
    seq: u64,
    entry: HistoryEntry,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Slot>,
    next_seq: u64,
}

/// Download history for the lifetime of the process. Nothing is persisted.
#[derive(Default)]
pub struct HistoryStore {
    inner: RwLock<Inner>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError> {
        self.add_at(entry, Utc::now().timestamp_millis())
    }

    pub fn add_at(
        &self,
        entry: NewHistoryEntry,
        timestamp: i64,
    ) -> Result<HistoryEntry, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !inner.entries.contains_key(&candidate) {
                break candidate;
            }
        };

        let stored = HistoryEntry {
            id,
            title: entry.title,
            thumbnail: entry.thumbnail,
            quality: entry.quality,
            download_url: entry.download_url,
            timestamp,
        };
        inner.entries.insert(
            stored.id.clone(),
            Slot {
                seq,
                entry: stored.clone(),
            },
        );
        tracing::debug!(id = %stored.id, quality = %stored.quality, "history entry added");
        Ok(stored)
    }

    /// Newest first; equal timestamps keep the later insertion first.
    pub fn list(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut slots = inner.entries.values().collect::<Vec<_>>();
        slots.sort_by(|a, b| {
            b.entry
                .timestamp
                .cmp(&a.entry.timestamp)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(slots.into_iter().map(|slot| slot.entry.clone()).collect())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let removed = inner.entries.len();
        inner.entries.clear();
        tracing::debug!(removed, "history cleared");
        Ok(())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .entries
            .len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|n| n == 0)
    }
}
