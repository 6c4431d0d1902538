use crate::models::assessment::HistoryEntry;
use crate::models::skill::SkillName;
use dashmap::DashMap;
use std::sync::Arc;

/// Last fetched attempt log per skill
pub struct HistoryCache {
    entries: DashMap<SkillName, Arc<Vec<HistoryEntry>>>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Store the log for a skill, replacing any earlier fetch
    pub fn put(&self, skill: SkillName, history: Vec<HistoryEntry>) {
        self.entries.insert(skill, Arc::new(history));
    }

    pub fn get(&self, skill: &SkillName) -> Option<Arc<Vec<HistoryEntry>>> {
        self.entries.get(skill).map(|entry| Arc::clone(entry.value()))
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}
