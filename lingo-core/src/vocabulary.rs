//! Vocabulary items — the words and phrases a learner has saved.
//!
//! An item carries its own memory state (easiness, interval, mastery) and is
//! mutated only by the scheduler in [`crate::scheduler`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LingoError, Result};
use crate::types::{ItemId, LearnerId, WordSource, add_days, normalize_term};

/// Lowest easiness factor an item can reach.
pub const MIN_EASINESS: f64 = 1.3;
/// Highest easiness factor, also the starting value for new items.
pub const MAX_EASINESS: f64 = 2.5;
/// Highest mastery level.
pub const MAX_MASTERY: u8 = 5;
/// Longest interval the scheduler will assign (100 years).
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

pub(crate) const MIN_EASINESS_CENTI: u32 = 130;
pub(crate) const MAX_EASINESS_CENTI: u32 = 250;

/// Input for saving a new word.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewWord {
    /// Source-language word or phrase, as encountered.
    pub term: String,
    /// Translation shown to the learner.
    pub translation: String,
    /// Example sentence where the word was found.
    pub context: Option<String>,
    /// Where the word came from.
    pub source: WordSource,
}

impl NewWord {
    /// Convenience constructor for a manually entered word.
    #[must_use]
    pub fn new(term: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
            context: None,
            source: WordSource::Manual,
        }
    }

    /// Attach an example sentence.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set where the word came from.
    #[must_use]
    pub fn with_source(mut self, source: WordSource) -> Self {
        self.source = source;
        self
    }
}

/// A word or phrase a learner has saved, with its spaced-repetition state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Unique identifier.
    pub id: ItemId,
    /// The learner whose collection this item belongs to.
    pub learner: LearnerId,
    /// Normalized source-language term.
    pub term: String,
    /// Translation.
    pub translation: String,
    /// Example sentence where the word was encountered.
    pub context: Option<String>,
    /// Where the word was picked up.
    pub source: WordSource,
    /// Interval growth multiplier, in [1.3, 2.5], two decimal places.
    pub easiness_factor: f64,
    /// Days until the next review.
    pub interval_days: u32,
    /// Coarse proficiency bucket, 0–5.
    pub mastery_level: u8,
    /// Total reviews performed.
    pub review_count: u32,
    /// Consecutive successful reviews (reset on failure).
    pub repetitions: u32,
    /// Reviews answered correctly.
    pub correct_count: u32,
    /// Reviews answered incorrectly.
    pub incorrect_count: u32,
    /// When the learner saved the word.
    pub created_at: DateTime<Utc>,
    /// When the item was last reviewed; `None` until the first review.
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// When the item next becomes due.
    pub next_review_at: DateTime<Utc>,
}

impl VocabularyItem {
    /// Create an item in its initial memory state.
    ///
    /// The term is normalized and the translation trimmed. A never-reviewed
    /// item is due immediately (`next_review_at == created_at`).
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::Validation`] if the term or translation is blank.
    pub fn new(learner: LearnerId, word: NewWord, now: DateTime<Utc>) -> Result<Self> {
        let term = normalize_term(&word.term);
        if term.is_empty() {
            return Err(LingoError::Validation("term must not be empty".to_string()));
        }
        let translation = word.translation.trim().to_string();
        if translation.is_empty() {
            return Err(LingoError::Validation(format!(
                "translation for '{term}' must not be empty"
            )));
        }
        let context = word
            .context
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Self {
            id: ItemId::new(),
            learner,
            term,
            translation,
            context,
            source: word.source,
            easiness_factor: MAX_EASINESS,
            interval_days: 0,
            mastery_level: 0,
            review_count: 0,
            repetitions: 0,
            correct_count: 0,
            incorrect_count: 0,
            created_at: now,
            last_reviewed_at: None,
            next_review_at: now,
        })
    }

    /// Whether the item has never been reviewed.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }

    /// Easiness in hundredths, clamped to the valid range.
    pub(crate) fn easiness_centi(&self) -> u32 {
        // Clamped before the cast.
        let e = self.easiness_factor.clamp(MIN_EASINESS, MAX_EASINESS);
        (e * 100.0).round() as u32
    }

    /// Store easiness given in hundredths, clamped to the valid range.
    pub(crate) fn set_easiness_centi(&mut self, centi: i64) {
        let clamped = centi.clamp(i64::from(MIN_EASINESS_CENTI), i64::from(MAX_EASINESS_CENTI));
        self.easiness_factor = clamped as f64 / 100.0;
    }

    /// Record a completed review at `now` with the new interval.
    pub(crate) fn stamp_review(&mut self, now: DateTime<Utc>, interval_days: u32, success: bool) {
        self.interval_days = interval_days;
        self.review_count = self.review_count.saturating_add(1);
        if success {
            self.correct_count = self.correct_count.saturating_add(1);
            self.repetitions = self.repetitions.saturating_add(1);
            self.mastery_level = self.mastery_level.saturating_add(1).min(MAX_MASTERY);
        } else {
            self.incorrect_count = self.incorrect_count.saturating_add(1);
            self.repetitions = 0;
            self.mastery_level = self.mastery_level.saturating_sub(1);
        }
        self.last_reviewed_at = Some(now);
        self.next_review_at = add_days(now, interval_days);
    }
}
