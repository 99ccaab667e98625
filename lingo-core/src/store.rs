//! Vocabulary storage abstraction.
//!
//! The review service never touches ambient state; it is handed a
//! [`VocabularyStore`] and reads/writes items through it. Two implementations
//! ship with the crate:
//!
//! - [`InMemoryStore`]: concurrent hash maps, for tests and guest sessions
//! - [`crate::persistence::SqliteStore`]: SQLite on disk
//!
//! Stores provide no cross-call transactions. Two concurrent reviews of the
//! same item are last-write-wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::{LingoError, Result};
use crate::scheduler::is_due;
use crate::types::{ItemId, LearnerId};
use crate::vocabulary::VocabularyItem;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Persistence handle for vocabulary items.
///
/// Implementations must be `Send + Sync` so one store can back a service
/// shared across threads.
pub trait VocabularyStore: Send + Sync {
    /// Fetch an item by ID.
    ///
    /// # Errors
    ///
    /// Returns an error only on backend failure; a missing item is `Ok(None)`.
    fn get(&self, id: ItemId) -> Result<Option<VocabularyItem>>;

    /// Insert or replace an item.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::DuplicateTerm`] if a *different* item already
    /// holds the same `(learner, term)`.
    fn save(&self, item: &VocabularyItem) -> Result<()>;

    /// Find a learner's item by its normalized term.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn find_by_term(&self, learner: LearnerId, term: &str) -> Result<Option<VocabularyItem>>;

    /// All of a learner's items, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn list_for_learner(&self, learner: LearnerId) -> Result<Vec<VocabularyItem>>;

    /// A learner's items that are due at `now`, oldest first.
    ///
    /// The default filters [`Self::list_for_learner`]; backends with an index
    /// should override it.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn list_due(&self, learner: LearnerId, now: DateTime<Utc>) -> Result<Vec<VocabularyItem>> {
        let mut items = self.list_for_learner(learner)?;
        items.retain(|item| is_due(item, now));
        Ok(items)
    }

    /// Delete an item. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn remove(&self, id: ItemId) -> Result<bool>;
}

impl<S: VocabularyStore + ?Sized> VocabularyStore for Arc<S> {
    fn get(&self, id: ItemId) -> Result<Option<VocabularyItem>> {
        (**self).get(id)
    }

    fn save(&self, item: &VocabularyItem) -> Result<()> {
        (**self).save(item)
    }

    fn find_by_term(&self, learner: LearnerId, term: &str) -> Result<Option<VocabularyItem>> {
        (**self).find_by_term(learner, term)
    }

    fn list_for_learner(&self, learner: LearnerId) -> Result<Vec<VocabularyItem>> {
        (**self).list_for_learner(learner)
    }

    fn list_due(&self, learner: LearnerId, now: DateTime<Utc>) -> Result<Vec<VocabularyItem>> {
        (**self).list_due(learner, now)
    }

    fn remove(&self, id: ItemId) -> Result<bool> {
        (**self).remove(id)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A process-local store backed by concurrent hash maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: DashMap<ItemId, VocabularyItem>,
    by_term: DashMap<(LearnerId, String), ItemId>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items across all learners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl VocabularyStore for InMemoryStore {
    fn get(&self, id: ItemId) -> Result<Option<VocabularyItem>> {
        Ok(self.items.get(&id).map(|entry| entry.value().clone()))
    }

    fn save(&self, item: &VocabularyItem) -> Result<()> {
        let key = (item.learner, item.term.clone());
        match self.by_term.entry(key) {
            Entry::Occupied(existing) if *existing.get() != item.id => {
                return Err(LingoError::DuplicateTerm {
                    learner: item.learner,
                    term: item.term.clone(),
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(item.id);
            }
        }

        if let Some(previous) = self.items.insert(item.id, item.clone()) {
            if previous.learner != item.learner || previous.term != item.term {
                self.by_term.remove(&(previous.learner, previous.term));
            }
        }
        Ok(())
    }

    fn find_by_term(&self, learner: LearnerId, term: &str) -> Result<Option<VocabularyItem>> {
        let Some(id) = self.by_term.get(&(learner, term.to_string())).map(|e| *e.value()) else {
            return Ok(None);
        };
        self.get(id)
    }

    fn list_for_learner(&self, learner: LearnerId) -> Result<Vec<VocabularyItem>> {
        let mut items: Vec<VocabularyItem> = self
            .items
            .iter()
            .filter(|entry| entry.learner == learner)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.0.cmp(&b.id.0)));
        Ok(items)
    }

    fn remove(&self, id: ItemId) -> Result<bool> {
        let Some((_, item)) = self.items.remove(&id) else {
            return Ok(false);
        };
        self.by_term.remove(&(item.learner, item.term));
        Ok(true)
    }
}
