// Watched-entity registry

use dashmap::DashSet;

/// Set of entity ids the consumer has flagged for attention
///
/// Checked once per change delivery. Lives on the feed, not the session,
/// so watched entities survive disconnect and reconnect.
pub struct SubscriptionTable {
    watched: DashSet<String>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self {
            watched: DashSet::new(),
        }
    }

    /// Flag an entity. Returns false if it was already watched.
    pub fn watch(&self, id: &str) -> bool {
        self.watched.insert(id.to_string())
    }

    /// Unflag an entity. Returns false if it was not watched.
    pub fn unwatch(&self, id: &str) -> bool {
        self.watched.remove(id).is_some()
    }

    /// Flip the flag for an entity, returning the new state
    pub fn toggle(&self, id: &str) -> bool {
        if self.watched.remove(id).is_some() {
            false
        } else {
            self.watched.insert(id.to_string());
            true
        }
    }

    pub fn is_watched(&self, id: &str) -> bool {
        self.watched.contains(id)
    }

    /// Ids currently watched (unordered)
    pub fn watched_ids(&self) -> Vec<String> {
        self.watched.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }
}

impl Default for SubscriptionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_and_unwatch() {
        let table = SubscriptionTable::new();
        assert!(!table.is_watched("a"));

        assert!(table.watch("a"));
        assert!(table.is_watched("a"));
        assert_eq!(table.len(), 1);

        // Watching twice is a no-op
        assert!(!table.watch("a"));
        assert_eq!(table.len(), 1);

        assert!(table.unwatch("a"));
        assert!(!table.is_watched("a"));
        assert!(!table.unwatch("a"));
    }

    #[test]
    fn toggle_flips_the_flag() {
        let table = SubscriptionTable::new();

        assert!(table.toggle("a"));
        assert!(table.is_watched("a"));

        assert!(!table.toggle("a"));
        assert!(!table.is_watched("a"));
    }

    #[test]
    fn watched_ids_lists_all_entries() {
        let table = SubscriptionTable::new();
        table.watch("a");
        table.watch("b");

        let mut ids = table.watched_ids();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
