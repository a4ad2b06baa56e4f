use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

use synapse_core::config::MemoryConfig;
use synapse_core::response::AgentKind;

/// One stored memory. Never mutated in place; an update replaces the
/// whole entry under the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub agent: AgentKind,
    pub context: Option<String>,
    pub priority: f32,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl MemoryItem {
    pub fn new(id: &str, content: &str, agent: AgentKind) -> Self {
        Self {
            id: id.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
            agent,
            context: None,
            priority: 0.5,
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

/// Retrieval criteria. Pure value, no identity.
///
/// `min_similarity`, `tags` and `time_range` are accepted for API
/// compatibility but retrieval currently filters on `agent_filter` only;
/// there is no fuzzy matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryQuery {
    pub text: String,
    pub context: Option<String>,
    pub max_results: usize,
    pub min_similarity: f32,
    pub tags: Vec<String>,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Empty filter matches every agent.
    pub agent_filter: Vec<AgentKind>,
}

impl Default for MemoryQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            context: None,
            max_results: 10,
            min_similarity: 0.0,
            tags: Vec::new(),
            time_range: None,
            agent_filter: Vec::new(),
        }
    }
}

impl MemoryQuery {
    pub fn for_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn with_agents(mut self, agents: Vec<AgentKind>) -> Self {
        self.agent_filter = agents;
        self
    }
}

/// Result of one retrieval, most-recent-first. Derived, not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRetrievalResult {
    pub items: Vec<MemoryItem>,
    pub total: usize,
    pub query: MemoryQuery,
}

/// Aggregate view over the store. Recomputed on every mutation; a reader
/// may observe stats momentarily behind the map, which is fine for the
/// dashboard use case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_items: usize,
    pub total_size: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

struct Inner {
    items: RwLock<HashMap<String, MemoryItem>>,
    recent: Mutex<VecDeque<String>>,
    stats: RwLock<MemoryStats>,
}

/// Thread-safe keyed memory store, process-lifetime only.
///
/// The store itself grows unbounded; callers prune via [`delete`].
/// The bounded structure here is the recent-access window.
///
/// [`delete`]: MemoryStore::delete
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
    max_retrieved_items: usize,
    recent_cap: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(&MemoryConfig::default())
    }
}

impl MemoryStore {
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                items: RwLock::new(HashMap::new()),
                recent: Mutex::new(VecDeque::new()),
                stats: RwLock::new(MemoryStats::default()),
            }),
            max_retrieved_items: config.max_retrieved_items,
            recent_cap: config.recent_access_cap,
        }
    }

    /// Upsert by id. Returns the id of the stored item.
    pub fn store(&self, item: MemoryItem) -> String {
        let id = item.id.clone();
        {
            let mut items = self.inner.items.write().unwrap_or_else(|e| e.into_inner());
            items.insert(id.clone(), item);
        }
        self.recompute_stats();
        self.touch_recent(&id);
        debug!(id = %id, "memory item stored");
        id
    }

    /// Store a plain key-value note owned by the creative (default) agent.
    pub fn store_kv(&self, key: &str, value: &str) -> String {
        self.store(MemoryItem::new(key, value, AgentKind::Creative))
    }

    /// Persist one prompt/response exchange as interaction history.
    pub fn store_interaction(&self, prompt: &str, response: &str) -> String {
        let mut item = MemoryItem::new(
            &format!("interaction_{}", Utc::now().timestamp_millis()),
            &format!("Prompt: {}\nResponse: {}", prompt, response),
            AgentKind::Creative,
        );
        item.context = Some(prompt.to_string());
        item.priority = 0.7;
        item.tags = vec!["interaction".to_string()];
        item.metadata.insert("prompt".to_string(), prompt.to_string());
        item.metadata
            .insert("response".to_string(), response.to_string());
        self.store(item)
    }

    /// Retrieve items matching the query's agent filter, newest first,
    /// truncated to the store's configured maximum.
    pub fn retrieve(&self, query: MemoryQuery) -> MemoryRetrievalResult {
        let mut items: Vec<MemoryItem> = {
            let map = self.inner.items.read().unwrap_or_else(|e| e.into_inner());
            map.values()
                .filter(|item| {
                    query.agent_filter.is_empty() || query.agent_filter.contains(&item.agent)
                })
                .cloned()
                .collect()
        };
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items.truncate(self.max_retrieved_items);

        MemoryRetrievalResult {
            total: items.len(),
            items,
            query,
        }
    }

    /// Exact-id lookup wrapped in the retrieval result shape.
    pub fn retrieve_by_key(&self, key: &str) -> MemoryRetrievalResult {
        let items: Vec<MemoryItem> = {
            let map = self.inner.items.read().unwrap_or_else(|e| e.into_inner());
            map.get(key).cloned().into_iter().collect()
        };
        MemoryRetrievalResult {
            total: items.len(),
            items,
            query: MemoryQuery::for_text(key),
        }
    }

    /// Remove an item. Returns false when the id is unknown.
    pub fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut items = self.inner.items.write().unwrap_or_else(|e| e.into_inner());
            items.remove(id).is_some()
        };
        if removed {
            self.recompute_stats();
            debug!(id = %id, "memory item deleted");
        }
        removed
    }

    pub fn stats(&self) -> MemoryStats {
        self.inner
            .stats
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Every stored item, newest first. Used for snapshots and exports;
    /// retrieval caps do not apply here.
    pub fn snapshot(&self) -> Vec<MemoryItem> {
        let mut items: Vec<MemoryItem> = {
            let map = self.inner.items.read().unwrap_or_else(|e| e.into_inner());
            map.values().cloned().collect()
        };
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items
    }

    /// Ids touched most recently, oldest first, capped at the configured
    /// window size.
    pub fn recent_access(&self) -> Vec<String> {
        self.inner
            .recent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    fn touch_recent(&self, id: &str) {
        let mut recent = self.inner.recent.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pos) = recent.iter().position(|existing| existing == id) {
            recent.remove(pos);
        }
        recent.push_back(id.to_string());
        while recent.len() > self.recent_cap {
            recent.pop_front();
        }
    }

    // O(n) over the map; acceptable while the store stays device-sized.
    fn recompute_stats(&self) {
        let snapshot = {
            let map = self.inner.items.read().unwrap_or_else(|e| e.into_inner());
            MemoryStats {
                total_items: map.len(),
                total_size: map.values().map(|i| i.content.len() as u64).sum(),
                oldest_entry: map.values().map(|i| i.timestamp).min(),
                newest_entry: map.values().map(|i| i.timestamp).max(),
            }
        };
        *self.inner.stats.write().unwrap_or_else(|e| e.into_inner()) = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> MemoryStore {
        MemoryStore::new(&MemoryConfig::default())
    }

    #[test]
    fn test_store_and_retrieve_by_agent_filter() {
        let store = store();
        let item = MemoryItem::new("m1", "the build plan", AgentKind::Architect);
        store.store(item);

        let matching = store.retrieve(
            MemoryQuery::for_text("plan").with_agents(vec![AgentKind::Architect]),
        );
        assert_eq!(matching.total, 1);
        assert_eq!(matching.items[0].id, "m1");

        let disjoint = store.retrieve(
            MemoryQuery::for_text("plan").with_agents(vec![AgentKind::Reasoner]),
        );
        assert_eq!(disjoint.total, 0);
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let store = store();
        store.store(MemoryItem::new("a", "one", AgentKind::Architect));
        store.store(MemoryItem::new("b", "two", AgentKind::Reasoner));

        let result = store.retrieve(MemoryQuery::default());
        assert_eq!(result.total, 2);
    }

    #[test]
    fn test_retrieve_newest_first_and_capped() {
        let store = store();
        let base = Utc::now();
        for i in 0..15 {
            let mut item = MemoryItem::new(&format!("m{}", i), "x", AgentKind::Creative);
            item.timestamp = base + Duration::seconds(i);
            store.store(item);
        }

        let result = store.retrieve(MemoryQuery::default());
        // Capped at the configured default of 10, newest first.
        assert_eq!(result.items.len(), 10);
        assert_eq!(result.items[0].id, "m14");
        assert_eq!(result.items[9].id, "m5");
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let store = store();
        store.store(MemoryItem::new("k", "old", AgentKind::Creative));
        store.store(MemoryItem::new("k", "new", AgentKind::Creative));

        let result = store.retrieve_by_key("k");
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].content, "new");
        assert_eq!(store.stats().total_items, 1);
    }

    #[test]
    fn test_retrieve_by_key_missing() {
        let store = store();
        let result = store.retrieve_by_key("absent");
        assert_eq!(result.total, 0);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_delete() {
        let store = store();
        store.store(MemoryItem::new("gone", "soon", AgentKind::Creative));
        assert!(store.delete("gone"));
        assert!(!store.delete("gone"));
        assert_eq!(store.stats().total_items, 0);
    }

    #[test]
    fn test_stats_track_size_and_bounds() {
        let store = store();
        let mut early = MemoryItem::new("early", "ab", AgentKind::Creative);
        early.timestamp = Utc::now() - Duration::hours(1);
        let late = MemoryItem::new("late", "cdef", AgentKind::Creative);
        let late_ts = late.timestamp;
        let early_ts = early.timestamp;
        store.store(early);
        store.store(late);

        let stats = store.stats();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.total_size, 6);
        assert_eq!(stats.oldest_entry, Some(early_ts));
        assert_eq!(stats.newest_entry, Some(late_ts));
    }

    #[test]
    fn test_recent_access_window_evicts_oldest() {
        let config = MemoryConfig {
            recent_access_cap: 3,
            ..Default::default()
        };
        let store = MemoryStore::new(&config);
        for i in 0..5 {
            store.store(MemoryItem::new(&format!("m{}", i), "x", AgentKind::Creative));
        }
        assert_eq!(store.recent_access(), vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn test_store_interaction_shape() {
        let store = store();
        let id = store.store_interaction("why?", "because");
        let result = store.retrieve_by_key(&id);
        let item = &result.items[0];
        assert!(item.content.contains("Prompt: why?"));
        assert!(item.tags.contains(&"interaction".to_string()));
        assert_eq!(item.metadata.get("response").map(String::as_str), Some("because"));
    }
}
