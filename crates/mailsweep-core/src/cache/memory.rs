//! In-memory snapshot cache.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::email::{Email, PartitionKey};

/// Mutex-guarded map from partition key to its last-known snapshot.
///
/// Unbounded and never evicted; the only shrink path is [`clear`] on
/// sign-out.
///
/// [`clear`]: PartitionedCache::clear
#[derive(Debug, Default)]
pub struct PartitionedCache {
    inner: Mutex<HashMap<PartitionKey, Vec<Email>>>,
}

impl PartitionedCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the partition's snapshot, if one exists.
    pub async fn get(&self, key: &PartitionKey) -> Option<Vec<Email>> {
        self.inner.lock().await.get(key).cloned()
    }

    /// Replaces the partition's snapshot wholesale.
    pub async fn put(&self, key: PartitionKey, emails: Vec<Email>) {
        self.inner.lock().await.insert(key, emails);
    }

    /// Removes the given ids from the partition's snapshot, returning the
    /// remaining emails. No-op when the partition has no snapshot.
    pub async fn remove_ids(&self, key: &PartitionKey, ids: &[String]) -> Option<Vec<Email>> {
        let mut inner = self.inner.lock().await;
        let snapshot = inner.get_mut(key)?;
        snapshot.retain(|email| !ids.contains(&email.id));
        Some(snapshot.clone())
    }

    /// Drops every snapshot.
    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::email::Category;

    fn email(id: &str) -> Email {
        Email {
            id: id.to_string(),
            sender: "a@b.com".to_string(),
            sender_key: "B".to_string(),
            sender_domain: Some("b.com".to_string()),
            category: Category::Other,
            subject: String::new(),
            date: String::new(),
            snippet: String::new(),
            body: String::new(),
            attachments: Vec::new(),
            is_unread: false,
            has_meaningful_attachment: false,
            label_ids: Vec::new(),
            is_important: false,
        }
    }

    #[tokio::test]
    async fn put_replaces_wholesale() {
        let cache = PartitionedCache::new();
        cache
            .put(PartitionKey::Inbox, vec![email("a"), email("b")])
            .await;
        cache.put(PartitionKey::Inbox, vec![email("c")]).await;

        let snapshot = cache.get(&PartitionKey::Inbox).await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "c");
    }

    #[tokio::test]
    async fn partitions_are_independent() {
        let cache = PartitionedCache::new();
        cache.put(PartitionKey::Inbox, vec![email("a")]).await;
        cache
            .put(PartitionKey::Label("L1".into()), vec![email("b")])
            .await;

        assert_eq!(cache.get(&PartitionKey::Inbox).await.unwrap()[0].id, "a");
        assert_eq!(
            cache.get(&PartitionKey::Label("L1".into())).await.unwrap()[0].id,
            "b"
        );
        assert!(cache.get(&PartitionKey::Label("L2".into())).await.is_none());
    }

    #[tokio::test]
    async fn remove_ids_keeps_the_rest() {
        let cache = PartitionedCache::new();
        cache
            .put(PartitionKey::Inbox, vec![email("a"), email("b"), email("c")])
            .await;

        let remaining = cache
            .remove_ids(&PartitionKey::Inbox, &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "c");
    }

    #[tokio::test]
    async fn clear_empties_every_partition() {
        let cache = PartitionedCache::new();
        cache.put(PartitionKey::Inbox, vec![email("a")]).await;
        cache.clear().await;
        assert!(cache.get(&PartitionKey::Inbox).await.is_none());
    }
}
