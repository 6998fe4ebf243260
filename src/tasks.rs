//! Daily engagement tasks — currently just the follow tracker, a small
//! per-identity counter of profiles followed today.
//!
//! Two keys back it: a running count and the date it was last touched.
//! The count resets when the calendar day (UTC) rolls over.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::error::StorageError;
use crate::store::{Key, KeyValueStore, Loaded, read_json, write_json};

/// Per-identity daily follow counter.
pub struct FollowTracker {
    store: Arc<dyn KeyValueStore>,
    count_key: Key,
    visit_key: Key,
}

impl FollowTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, email: &str) -> Self {
        Self {
            store,
            count_key: Key::follow_count(email),
            visit_key: Key::last_follow_visit(email),
        }
    }

    /// Follows recorded today. Zero after a day rollover or when nothing
    /// has been recorded yet.
    pub async fn today_count(&self) -> Result<u32, StorageError> {
        self.count_on(Utc::now().date_naive()).await
    }

    /// Record one follow and return the updated count for today.
    pub async fn record_follow(&self) -> Result<u32, StorageError> {
        self.record_follow_on(Utc::now().date_naive()).await
    }

    async fn count_on(&self, day: NaiveDate) -> Result<u32, StorageError> {
        let last_visit: Option<NaiveDate> = read_json(self.store.as_ref(), &self.visit_key)
            .await?
            .into_option();
        if last_visit != Some(day) {
            return Ok(0);
        }
        let count: Loaded<u32> = read_json(self.store.as_ref(), &self.count_key).await?;
        Ok(count.into_option().unwrap_or(0))
    }

    async fn record_follow_on(&self, day: NaiveDate) -> Result<u32, StorageError> {
        let next = self.count_on(day).await? + 1;
        write_json(self.store.as_ref(), &self.count_key, &next).await?;
        write_json(self.store.as_ref(), &self.visit_key, &day).await?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[tokio::test]
    async fn starts_at_zero() {
        let tracker = FollowTracker::new(Arc::new(MemoryStore::new()), "a@x.com");
        assert_eq!(tracker.count_on(day(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn increments_within_a_day() {
        let tracker = FollowTracker::new(Arc::new(MemoryStore::new()), "a@x.com");
        assert_eq!(tracker.record_follow_on(day(1)).await.unwrap(), 1);
        assert_eq!(tracker.record_follow_on(day(1)).await.unwrap(), 2);
        assert_eq!(tracker.count_on(day(1)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn resets_on_day_rollover() {
        let tracker = FollowTracker::new(Arc::new(MemoryStore::new()), "a@x.com");
        tracker.record_follow_on(day(1)).await.unwrap();
        tracker.record_follow_on(day(1)).await.unwrap();

        assert_eq!(tracker.count_on(day(2)).await.unwrap(), 0);
        assert_eq!(tracker.record_follow_on(day(2)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn counters_are_namespaced_per_identity() {
        let store = Arc::new(MemoryStore::new());
        let a = FollowTracker::new(store.clone(), "a@x.com");
        let b = FollowTracker::new(store, "b@x.com");
        a.record_follow_on(day(1)).await.unwrap();
        assert_eq!(b.count_on(day(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn corrupt_counter_degrades_to_zero() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(&Key::follow_count("a@x.com"), "lots")
            .await
            .unwrap();
        write_json(&*store, &Key::last_follow_visit("a@x.com"), &day(1))
            .await
            .unwrap();
        let tracker = FollowTracker::new(store, "a@x.com");
        assert_eq!(tracker.count_on(day(1)).await.unwrap(), 0);
    }
}
