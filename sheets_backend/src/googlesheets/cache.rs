use super::model::GridData;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Grid data of one range plus the spreadsheet time zone its dates are in.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub grid: GridData,
    pub time_zone: Option<String>,
}

struct CacheEntry {
    data: Arc<SheetData>,
    expires_at: Instant,
}

/// Time-bounded cache of fetched ranges, keyed by spreadsheet id + range.
#[derive(Default)]
pub struct SheetCache {
    entries: DashMap<String, CacheEntry>,
}

impl SheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(spreadsheet_id: &str, range: &str) -> String {
        format!("{spreadsheet_id}{range}")
    }

    /// Live entry and the time it has left. Expired entries are dropped.
    pub fn get(&self, key: &str) -> Option<(Arc<SheetData>, Duration)> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key)
            && entry.expires_at > now
        {
            return Some((Arc::clone(&entry.data), entry.expires_at - now));
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    pub fn set(&self, key: String, data: Arc<SheetData>, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                data,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Number of entries that have not expired yet.
    pub fn item_count(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}
