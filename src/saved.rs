use anyhow::{Result, anyhow};
use chrono::Utc;

use crate::error::{PersistenceError, ValidationError};
use crate::models::SavedSearch;
use crate::search::SearchDomain;

/// Get/set of one domain's serialized saved-search list. Keeping this a
/// trait keeps the repository testable without a real database and leaves
/// the storage mechanism swappable.
pub trait SavedSearchStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, payload: &str) -> Result<(), PersistenceError>;
}

pub struct SavedSearchRepository<S: SavedSearchStore> {
    store: S,
}

impl<S: SavedSearchStore> SavedSearchRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Snapshot the given filters under `name`. The name must be non-blank;
    /// the id is unique even across rapid successive saves.
    pub fn save<D: SearchDomain>(
        &self,
        name: &str,
        filters: &D::Filters,
    ) -> Result<SavedSearch<D::Filters>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError("Saved search name must not be empty".to_string()).into());
        }

        let mut list = self.list::<D>();
        let entry = SavedSearch {
            id: next_id(Utc::now().timestamp_millis(), &list),
            name: name.to_string(),
            filters: filters.clone(),
            saved_at: Utc::now(),
        };
        list.push(entry.clone());
        self.persist::<D>(&list)?;
        Ok(entry)
    }

    /// All saved searches for the domain, in insertion order. Unreadable or
    /// corrupted storage degrades to an empty list rather than failing the
    /// whole feature.
    pub fn list<D: SearchDomain>(&self) -> Vec<SavedSearch<D::Filters>> {
        let payload = match self.store.get(D::STORAGE_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Vec::new(),
            Err(err) => {
                eprintln!("Warning: could not read saved searches: {}", err);
                return Vec::new();
            }
        };
        match serde_json::from_str(&payload) {
            Ok(list) => list,
            Err(err) => {
                eprintln!(
                    "Warning: ignoring corrupted saved-search list for {}: {}",
                    D::DOMAIN.name(),
                    err
                );
                Vec::new()
            }
        }
    }

    /// A copy of the stored snapshot. Loading never runs a search; that
    /// stays the caller's decision.
    pub fn load<D: SearchDomain>(&self, id: i64) -> Result<D::Filters> {
        self.list::<D>()
            .into_iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.filters)
            .ok_or_else(|| anyhow!("No saved search with id {} for {}", id, D::DOMAIN.name()))
    }

    /// Remove by id. Returns whether anything was removed; deleting an
    /// absent id is a no-op.
    pub fn delete<D: SearchDomain>(&self, id: i64) -> Result<bool> {
        let mut list = self.list::<D>();
        let before = list.len();
        list.retain(|entry| entry.id != id);
        if list.len() == before {
            return Ok(false);
        }
        self.persist::<D>(&list)?;
        Ok(true)
    }

    fn persist<D: SearchDomain>(&self, list: &[SavedSearch<D::Filters>]) -> Result<()> {
        let payload = serde_json::to_string(list).map_err(PersistenceError::Corrupted)?;
        self.store.set(D::STORAGE_KEY, &payload)?;
        Ok(())
    }
}

// Timestamp ids collide when saves land in the same millisecond; bump past
// every existing id so the sequence stays unique and increasing.
fn next_id<F>(now_ms: i64, list: &[SavedSearch<F>]) -> i64 {
    let max_existing = list.iter().map(|entry| entry.id).max().unwrap_or(0);
    now_ms.max(max_existing + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateFilters, FilterSet, OpeningFilters, SkillMatchMode};
    use crate::search::{CandidateDomain, OpeningDomain};
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MemoryStore {
        entries: RefCell<HashMap<String, String>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                entries: RefCell::new(HashMap::new()),
            }
        }

        fn seed(key: &str, payload: &str) -> Self {
            let store = Self::new();
            store
                .entries
                .borrow_mut()
                .insert(key.to_string(), payload.to_string());
            store
        }
    }

    impl SavedSearchStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, payload: &str) -> Result<(), PersistenceError> {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), payload.to_string());
            Ok(())
        }
    }

    fn sample_filters() -> CandidateFilters {
        CandidateFilters {
            text_query: "rust backend".to_string(),
            primary_skills: vec!["Rust".to_string(), "SQL".to_string()],
            skill_match_mode: SkillMatchMode::All,
            min_experience: Some(4),
            locations: vec!["Pune".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        let filters = sample_filters();

        let saved = repo.save::<CandidateDomain>("rust devs", &filters).unwrap();
        let loaded = repo.load::<CandidateDomain>(saved.id).unwrap();
        assert_eq!(loaded, filters);
    }

    #[test]
    fn test_saved_entry_is_a_snapshot_not_a_reference() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        let mut filters = sample_filters();

        let saved = repo.save::<CandidateDomain>("before edit", &filters).unwrap();
        filters.text_query = "completely different".to_string();
        filters.primary_skills.clear();

        let loaded = repo.load::<CandidateDomain>(saved.id).unwrap();
        assert_eq!(loaded, sample_filters());
    }

    #[test]
    fn test_save_rejects_blank_names() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        for name in ["", "   ", "\t"] {
            let err = repo
                .save::<CandidateDomain>(name, &CandidateFilters::default())
                .unwrap_err();
            assert!(err.downcast_ref::<ValidationError>().is_some());
        }
        assert!(repo.list::<CandidateDomain>().is_empty());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        repo.save::<CandidateDomain>("first", &CandidateFilters::default())
            .unwrap();
        repo.save::<CandidateDomain>("second", &sample_filters())
            .unwrap();
        repo.save::<CandidateDomain>("third", &CandidateFilters::default())
            .unwrap();

        let names: Vec<String> = repo
            .list::<CandidateDomain>()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_rapid_saves_get_distinct_increasing_ids() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        let ids: Vec<i64> = (0..5)
            .map(|i| {
                repo.save::<CandidateDomain>(&format!("search {}", i), &sample_filters())
                    .unwrap()
                    .id
            })
            .collect();

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
        assert_eq!(sorted, ids); // strictly increasing
    }

    #[test]
    fn test_delete_removes_only_the_target() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        let first = repo
            .save::<CandidateDomain>("keep", &CandidateFilters::default())
            .unwrap();
        let second = repo.save::<CandidateDomain>("drop", &sample_filters()).unwrap();

        assert!(repo.delete::<CandidateDomain>(second.id).unwrap());
        let remaining = repo.list::<CandidateDomain>();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, first.id);
    }

    #[test]
    fn test_delete_nonexistent_id_is_a_noop() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        repo.save::<CandidateDomain>("only", &CandidateFilters::default())
            .unwrap();

        assert!(!repo.delete::<CandidateDomain>(999).unwrap());
        assert_eq!(repo.list::<CandidateDomain>().len(), 1);
    }

    #[test]
    fn test_domains_do_not_share_storage() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        repo.save::<CandidateDomain>("candidate side", &CandidateFilters::default())
            .unwrap();
        repo.save::<OpeningDomain>("opening side", &OpeningFilters::default())
            .unwrap();

        assert_eq!(repo.list::<CandidateDomain>().len(), 1);
        assert_eq!(repo.list::<OpeningDomain>().len(), 1);
        assert_eq!(repo.list::<CandidateDomain>()[0].name, "candidate side");
        assert_eq!(repo.list::<OpeningDomain>()[0].name, "opening side");
    }

    #[test]
    fn test_corrupted_payload_degrades_to_empty_list() {
        let store = MemoryStore::seed(CandidateDomain::STORAGE_KEY, "{not json");
        let repo = SavedSearchRepository::new(store);
        assert!(repo.list::<CandidateDomain>().is_empty());

        // Saving over a corrupted list starts a fresh one.
        repo.save::<CandidateDomain>("fresh", &CandidateFilters::default())
            .unwrap();
        assert_eq!(repo.list::<CandidateDomain>().len(), 1);
    }

    #[test]
    fn test_next_id_bumps_past_existing() {
        let list = vec![SavedSearch {
            id: 1_000,
            name: "a".to_string(),
            filters: CandidateFilters::default(),
            saved_at: Utc::now(),
        }];
        assert_eq!(next_id(500, &list), 1_001);
        assert_eq!(next_id(2_000, &list), 2_000);
        assert_eq!(next_id(42, &[] as &[SavedSearch<CandidateFilters>]), 42);
    }

    #[test]
    fn test_load_missing_id_errors() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        assert!(repo.load::<CandidateDomain>(7).is_err());
    }

    #[test]
    fn test_filter_set_trait_still_visible_through_saved_filters() {
        let repo = SavedSearchRepository::new(MemoryStore::new());
        let saved = repo
            .save::<CandidateDomain>("count me", &sample_filters())
            .unwrap();
        assert_eq!(saved.filters.active_count(), 4);
    }
}
