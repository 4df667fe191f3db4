//! Recent product searches, most recent first.

use std::sync::Arc;

use crate::storage::{KeyValueStore, StorageError, get_json, set_json};

/// Storage key of the search history.
pub const SEARCH_HISTORY_KEY: &str = "searchHistory";

/// Maximum number of remembered queries.
pub const MAX_ENTRIES: usize = 10;

/// Device-wide search history.
#[derive(Debug)]
pub struct SearchHistory<S> {
    storage: Arc<S>,
}

impl<S> Clone for SearchHistory<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: KeyValueStore> SearchHistory<S> {
    pub const fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Stored queries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the history cannot be read or decoded.
    pub async fn entries(&self) -> Result<Vec<String>, StorageError> {
        Ok(get_json(&*self.storage, SEARCH_HISTORY_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Put `query` at the front, dropping an earlier copy and anything past
    /// [`MAX_ENTRIES`]. Blank queries are ignored.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the history cannot be read or written.
    pub async fn record(&self, query: &str) -> Result<Vec<String>, StorageError> {
        let query = query.trim();
        let mut entries = self.entries().await?;
        if query.is_empty() {
            return Ok(entries);
        }

        entries.retain(|existing| existing != query);
        entries.insert(0, query.to_owned());
        entries.truncate(MAX_ENTRIES);

        set_json(&*self.storage, SEARCH_HISTORY_KEY, &entries).await?;
        Ok(entries)
    }

    /// Forget every query.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the key cannot be removed.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(SEARCH_HISTORY_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_most_recent_first_without_duplicates() {
        let history = SearchHistory::new(Arc::new(MemoryStore::new()));
        history.record("milk").await.unwrap();
        history.record("yogurt").await.unwrap();
        let entries = history.record(" milk ").await.unwrap();
        assert_eq!(entries, vec!["milk", "yogurt"]);
    }

    #[tokio::test]
    async fn test_capped_at_ten() {
        let history = SearchHistory::new(Arc::new(MemoryStore::new()));
        for i in 0..15 {
            history.record(&format!("query {i}")).await.unwrap();
        }
        let entries = history.entries().await.unwrap();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries.first().map(String::as_str), Some("query 14"));
        assert_eq!(entries.last().map(String::as_str), Some("query 5"));
    }

    #[tokio::test]
    async fn test_blank_query_ignored_and_clear() {
        let history = SearchHistory::new(Arc::new(MemoryStore::new()));
        history.record("milk").await.unwrap();
        assert_eq!(history.record("   ").await.unwrap(), vec!["milk"]);

        history.clear().await.unwrap();
        assert!(history.entries().await.unwrap().is_empty());
    }
}
