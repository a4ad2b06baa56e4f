use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

use synapse_core::response::AgentResponse;

/// One cached backend response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub response: AgentResponse,
    pub cached_at: DateTime<Utc>,
}

/// Fixed-capacity, access-order response cache.
///
/// The order list keeps the least recently used key at the front; any
/// read or write moves the key to the back, and overflow evicts from the
/// front. Capacity only pre-sizes the map.
pub struct ResponseCache {
    capacity: usize,
    entries: HashMap<String, CachedResponse>,
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl ResponseCache {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<AgentResponse> {
        if let Some(entry) = self.entries.get(key) {
            let response = entry.response.clone();
            self.touch(key);
            self.hits += 1;
            Some(response)
        } else {
            self.misses += 1;
            None
        }
    }

    pub fn insert(&mut self, key: &str, response: AgentResponse) {
        self.entries.insert(
            key.to_string(),
            CachedResponse {
                response,
                cached_at: Utc::now(),
            },
        );
        self.touch(key);
        while self.entries.len() > self.capacity {
            if let Some(eldest) = self.order.pop_front() {
                self.entries.remove(&eldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Hit rate in 0.0..=1.0 over the cache's lifetime.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key.to_string());
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synapse_core::response::AgentKind;

    fn response(content: &str) -> AgentResponse {
        AgentResponse::success(content, 0.9, "creative", AgentKind::Creative)
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a", response("alpha"));
        assert_eq!(cache.get("a").unwrap().content, "alpha");
        assert!(cache.get("b").is_none());
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_evicts_oldest_on_overflow() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a", response("alpha"));
        cache.insert("b", response("beta"));
        cache.insert("c", response("gamma"));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_access_refreshes_order() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a", response("alpha"));
        cache.insert("b", response("beta"));
        // Touch "a" so "b" becomes the eldest.
        cache.get("a");
        cache.insert("c", response("gamma"));
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_reinsert_replaces_without_growth() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a", response("alpha"));
        cache.insert("a", response("alpha-2"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().content, "alpha-2");
    }
}
