//! In-memory result cache keyed by username.
//!
//! Logins are case-insensitive on GitHub, so keys are trimmed and lowercased.
//! Only successful aggregations are stored.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::aggregator::{aggregate, validate_username};
use crate::source::StatsSource;
use crate::{StatsError, StatsRecord};

/// Entries older than this are refetched (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CachedStats {
    record: StatsRecord,
    fetched_at: Instant,
}

pub struct StatsCache {
    ttl: Duration,
    entries: HashMap<String, CachedStats>,
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    fn key(username: &str) -> String {
        username.trim().to_lowercase()
    }

    /// A clone of the cached record, if one exists and is still fresh.
    pub fn get(&self, username: &str) -> Option<StatsRecord> {
        self.entries
            .get(&Self::key(username))
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.record.clone())
    }

    /// Store `record` and drop every entry that has gone stale.
    pub fn insert(&mut self, username: &str, record: StatsRecord) {
        let ttl = self.ttl;
        self.entries.retain(|_, cached| cached.fetched_at.elapsed() < ttl);
        self.entries.insert(
            Self::key(username),
            CachedStats {
                record,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&mut self, username: &str) -> bool {
        self.entries.remove(&Self::key(username)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached record for `username`, or aggregate and store it.
    pub async fn get_or_fetch<S: StatsSource>(
        &mut self,
        source: &S,
        username: &str,
    ) -> Result<StatsRecord, StatsError> {
        let username = validate_username(username)?;

        if let Some(record) = self.get(username) {
            debug!(username, "stats cache hit");
            return Ok(record);
        }

        let record = aggregate(source, username).await?;
        self.insert(username, record.clone());
        Ok(record)
    }
}
