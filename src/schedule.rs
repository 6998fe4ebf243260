//! Scheduled-post collection — a per-identity content calendar persisted
//! as one JSON list under the identity's `scheduled_posts` key.
//!
//! The list is rewritten wholesale on every mutation; entries are small
//! and a calendar rarely holds more than a few dozen posts. A corrupt
//! stored list degrades to empty rather than failing the dashboard.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::model::ScheduledPost;
use crate::store::{Key, KeyValueStore, Loaded, read_json, write_json};

/// The content calendar for one identity.
pub struct ScheduleBook {
    store: Arc<dyn KeyValueStore>,
    key: Key,
}

impl ScheduleBook {
    pub fn new(store: Arc<dyn KeyValueStore>, email: &str) -> Self {
        Self {
            store,
            key: Key::scheduled_posts(email),
        }
    }

    /// All scheduled posts, ordered by scheduled date.
    pub async fn list(&self) -> Result<Vec<ScheduledPost>, ScheduleError> {
        let loaded: Loaded<Vec<ScheduledPost>> = read_json(self.store.as_ref(), &self.key).await?;
        let mut posts = loaded.into_option().unwrap_or_default();
        posts.sort_by_key(|p| p.scheduled_date);
        Ok(posts)
    }

    /// Posts scheduled on one calendar day (UTC).
    pub async fn for_day(&self, day: NaiveDate) -> Result<Vec<ScheduledPost>, ScheduleError> {
        let posts = self.list().await?;
        Ok(posts
            .into_iter()
            .filter(|p| p.scheduled_date.date_naive() == day)
            .collect())
    }

    /// Schedule a new post and return it.
    pub async fn add(
        &self,
        title: &str,
        content: &str,
        scheduled_date: DateTime<Utc>,
    ) -> Result<ScheduledPost, ScheduleError> {
        let post = ScheduledPost {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            scheduled_date,
        };
        let mut posts = self.list().await?;
        posts.push(post.clone());
        write_json(self.store.as_ref(), &self.key, &posts).await?;
        Ok(post)
    }

    /// Replace an existing post by id.
    pub async fn update(&self, post: ScheduledPost) -> Result<(), ScheduleError> {
        let mut posts = self.list().await?;
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(ScheduleError::NotFound { id: post.id })?;
        *slot = post;
        write_json(self.store.as_ref(), &self.key, &posts).await?;
        Ok(())
    }

    /// Remove a post by id.
    pub async fn remove(&self, id: Uuid) -> Result<(), ScheduleError> {
        let mut posts = self.list().await?;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(ScheduleError::NotFound { id });
        }
        write_json(self.store.as_ref(), &self.key, &posts).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn book(store: Arc<MemoryStore>) -> ScheduleBook {
        ScheduleBook::new(store, "a@x.com")
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn list_is_sorted_by_date() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store);
        book.add("later", "c", at(20, 9)).await.unwrap();
        book.add("sooner", "c", at(10, 9)).await.unwrap();

        let posts = book.list().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "sooner");
        assert_eq!(posts[1].title, "later");
    }

    #[tokio::test]
    async fn for_day_filters_by_calendar_day() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store);
        book.add("morning", "c", at(10, 9)).await.unwrap();
        book.add("evening", "c", at(10, 18)).await.unwrap();
        book.add("other day", "c", at(11, 9)).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let posts = book.for_day(day).await.unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn update_replaces_matching_entry() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store);
        let post = book.add("old", "c", at(10, 9)).await.unwrap();

        let mut edited = post.clone();
        edited.title = "new".to_string();
        book.update(edited).await.unwrap();

        let posts = book.list().await.unwrap();
        assert_eq!(posts[0].title, "new");
        assert_eq!(posts[0].id, post.id);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store);
        let ghost = ScheduledPost {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            scheduled_date: at(10, 9),
        };
        assert!(matches!(
            book.update(ghost).await,
            Err(ScheduleError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn remove_deletes_only_the_target() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store);
        let keep = book.add("keep", "c", at(10, 9)).await.unwrap();
        let gone = book.add("gone", "c", at(11, 9)).await.unwrap();

        book.remove(gone.id).await.unwrap();
        let posts = book.list().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, keep.id);

        assert!(matches!(
            book.remove(gone.id).await,
            Err(ScheduleError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn corrupt_list_degrades_to_empty() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(&Key::scheduled_posts("a@x.com"), "][")
            .await
            .unwrap();
        let book = book(store);
        assert!(book.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn calendars_are_namespaced_per_identity() {
        let store = Arc::new(MemoryStore::new());
        let a = ScheduleBook::new(store.clone(), "a@x.com");
        let b = ScheduleBook::new(store, "b@x.com");
        a.add("mine", "c", at(10, 9)).await.unwrap();
        assert!(b.list().await.unwrap().is_empty());
    }
}
