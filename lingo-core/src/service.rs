//! The review service: the three external operations (save a word, submit a
//! review, list due items) plus sessions, statistics and removal.
//!
//! The service owns no item state. Every call reads from and writes to the
//! [`VocabularyStore`] it was built with, and every time-dependent call takes
//! `now` from the caller.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::due;
use crate::error::{LingoError, Result};
use crate::metrics::ReviewCounters;
use crate::scheduler::{self, Outcome};
use crate::stats::{self, DayForecast, MasteryBucket, Recommendation, Retention, ReviewStats, SessionPlan};
use crate::store::VocabularyStore;
use crate::types::{ItemId, LearnerId, normalize_term};
use crate::vocabulary::{NewWord, VocabularyItem};

/// Result of [`ReviewService::save_word`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavedWord {
    /// The stored item (new, or the one already saved for this term).
    pub item: VocabularyItem,
    /// `false` if the learner had already saved the term.
    pub created: bool,
}

/// Everything a progress page needs, computed from one collection read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerReport {
    /// Collection statistics.
    pub stats: ReviewStats,
    /// Lifetime success rate.
    pub retention: Retention,
    /// Upcoming daily workload.
    pub forecast: Vec<DayForecast>,
    /// Suggested next session.
    pub session: SessionPlan,
    /// Study tips, most specific first.
    pub recommendations: Vec<Recommendation>,
}

/// Review operations over a store.
#[derive(Debug)]
pub struct ReviewService<S> {
    store: S,
    config: SchedulerConfig,
    counters: ReviewCounters,
}

impl<S: VocabularyStore> ReviewService<S> {
    /// Create a service over `store`.
    pub fn new(store: S, config: SchedulerConfig) -> Self {
        info!(policy = %config.policy, session_limit = config.session_limit, "Review service ready");
        Self {
            store,
            config,
            counters: ReviewCounters::new(),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The scheduler configuration in effect.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Event counters.
    pub fn counters(&self) -> &ReviewCounters {
        &self.counters
    }

    /// Save a word to a learner's collection.
    ///
    /// If the learner already has the same normalized term, the existing item
    /// is returned unchanged with `created == false`.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Validation`] for a blank term or translation, or
    /// a store error.
    pub fn save_word(&self, learner: LearnerId, word: NewWord, now: DateTime<Utc>) -> Result<SavedWord> {
        let term = normalize_term(&word.term);
        if let Some(existing) = self.store.find_by_term(learner, &term)? {
            return Ok(self.already_saved(existing));
        }

        let item = VocabularyItem::new(learner, word, now)?;
        match self.store.save(&item) {
            Ok(()) => {}
            // A concurrent save of the same term got there first.
            Err(conflict @ LingoError::DuplicateTerm { .. }) => {
                return match self.store.find_by_term(learner, &item.term)? {
                    Some(existing) => Ok(self.already_saved(existing)),
                    None => Err(conflict),
                };
            }
            Err(e) => return Err(e),
        }
        ReviewCounters::incr(&self.counters.words_saved);
        debug!(learner = %learner, term = %item.term, item = %item.id, "Word saved");
        Ok(SavedWord { item, created: true })
    }

    fn already_saved(&self, existing: VocabularyItem) -> SavedWord {
        ReviewCounters::incr(&self.counters.duplicate_saves);
        debug!(learner = %existing.learner, term = %existing.term, item = %existing.id, "Word already saved");
        SavedWord {
            item: existing,
            created: false,
        }
    }

    /// Apply one review and persist the result.
    ///
    /// # Errors
    ///
    /// - [`LingoError::ItemNotFound`] if no item has `id`
    /// - [`LingoError::OutcomeMismatch`] if `outcome` does not fit the
    ///   configured policy (nothing is saved)
    /// - store errors
    pub fn submit_review(&self, id: ItemId, outcome: Outcome, now: DateTime<Utc>) -> Result<VocabularyItem> {
        let start = Instant::now();
        let Some(mut item) = self.store.get(id)? else {
            ReviewCounters::incr(&self.counters.reviews_rejected);
            return Err(LingoError::ItemNotFound(id));
        };

        if let Err(e) = scheduler::apply(self.config.policy, &mut item, outcome, now) {
            ReviewCounters::incr(&self.counters.reviews_rejected);
            return Err(e);
        }
        self.store.save(&item)?;

        let counter = if outcome.is_success() {
            &self.counters.reviews_correct
        } else {
            &self.counters.reviews_incorrect
        };
        ReviewCounters::incr(counter);

        debug!(
            item = %item.id,
            outcome = %outcome,
            interval_days = item.interval_days,
            easiness = item.easiness_factor,
            mastery = item.mastery_level,
            elapsed_us = start.elapsed().as_micros(),
            "Review applied"
        );
        Ok(item)
    }

    /// Apply a batch of reviews (e.g. the answers from one game round).
    ///
    /// Unknown item IDs are skipped with a warning. Returns the updated items
    /// in submission order.
    ///
    /// # Errors
    ///
    /// Stops at the first outcome mismatch or store error; reviews before it
    /// stay applied.
    pub fn submit_reviews(
        &self,
        results: &[(ItemId, Outcome)],
        now: DateTime<Utc>,
    ) -> Result<Vec<VocabularyItem>> {
        let mut updated = Vec::with_capacity(results.len());
        for &(id, outcome) in results {
            match self.submit_review(id, outcome, now) {
                Ok(item) => updated.push(item),
                Err(LingoError::ItemNotFound(missing)) => {
                    warn!(item = %missing, "Skipping review for unknown item");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(submitted = results.len(), applied = updated.len(), "Review batch applied");
        Ok(updated)
    }

    /// A learner's due items, in store order.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn due_items(&self, learner: LearnerId, now: DateTime<Utc>) -> Result<Vec<VocabularyItem>> {
        ReviewCounters::incr(&self.counters.due_queries);
        self.store.list_due(learner, now)
    }

    /// A prioritized review session of at most `limit` items
    /// (`config.session_limit` when `None`).
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn review_session(
        &self,
        learner: LearnerId,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<VocabularyItem>> {
        ReviewCounters::incr(&self.counters.due_queries);
        let due = self.store.list_due(learner, now)?;
        Ok(due::review_queue(&due, now, limit.unwrap_or(self.config.session_limit)))
    }

    /// Statistics for a learner's collection.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn stats(&self, learner: LearnerId, now: DateTime<Utc>) -> Result<ReviewStats> {
        let items = self.store.list_for_learner(learner)?;
        Ok(stats::review_stats(&items, now))
    }

    /// Statistics, retention, forecast and a session recommendation.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn report(&self, learner: LearnerId, now: DateTime<Utc>) -> Result<LearnerReport> {
        let items = self.store.list_for_learner(learner)?;
        Ok(LearnerReport {
            stats: stats::review_stats(&items, now),
            retention: stats::retention(&items),
            forecast: stats::forecast_workload(&items, now, self.config.forecast_days),
            session: stats::recommend_session(&items, now),
            recommendations: stats::study_recommendations(&items, now),
        })
    }

    /// A learner's words in one mastery bucket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn words_by_mastery(&self, learner: LearnerId, bucket: MasteryBucket) -> Result<Vec<VocabularyItem>> {
        let mut items = self.store.list_for_learner(learner)?;
        items.retain(|item| MasteryBucket::of(item) == bucket);
        Ok(items)
    }

    /// A learner's words whose term, translation or context contains
    /// `query` (case-insensitive, whitespace-collapsed). An empty query
    /// matches everything.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn search_words(&self, learner: LearnerId, query: &str) -> Result<Vec<VocabularyItem>> {
        let needle = normalize_term(query);
        let mut items = self.store.list_for_learner(learner)?;
        if !needle.is_empty() {
            items.retain(|item| {
                item.term.contains(&needle)
                    || normalize_term(&item.translation).contains(&needle)
                    || item
                        .context
                        .as_deref()
                        .is_some_and(|c| normalize_term(c).contains(&needle))
            });
        }
        debug!(learner = %learner, query = %needle, hits = items.len(), "Word search");
        Ok(items)
    }

    /// Remove a word. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn remove_word(&self, id: ItemId) -> Result<bool> {
        let removed = self.store.remove(id)?;
        if removed {
            debug!(item = %id, "Word removed");
        }
        Ok(removed)
    }
}
