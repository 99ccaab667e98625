//! Runtime counters for the review service.
//!
//! Lock-free `AtomicU64` counters incremented on the hot path and read on
//! export. [`CounterSnapshot::to_prometheus`] renders the text exposition
//! format for scraping.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for review-service events.
#[derive(Debug)]
pub struct ReviewCounters {
    /// Words newly saved.
    pub words_saved: AtomicU64,
    /// Saves that matched an already-saved term.
    pub duplicate_saves: AtomicU64,
    /// Reviews answered correctly.
    pub reviews_correct: AtomicU64,
    /// Reviews answered incorrectly.
    pub reviews_incorrect: AtomicU64,
    /// Review submissions rejected (unknown item, wrong outcome kind).
    pub reviews_rejected: AtomicU64,
    /// Due-item or session queries served.
    pub due_queries: AtomicU64,
}

impl ReviewCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            words_saved: AtomicU64::new(0),
            duplicate_saves: AtomicU64::new(0),
            reviews_correct: AtomicU64::new(0),
            reviews_incorrect: AtomicU64::new(0),
            reviews_rejected: AtomicU64::new(0),
            due_queries: AtomicU64::new(0),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            words_saved: self.words_saved.load(Ordering::Relaxed),
            duplicate_saves: self.duplicate_saves.load(Ordering::Relaxed),
            reviews_correct: self.reviews_correct.load(Ordering::Relaxed),
            reviews_incorrect: self.reviews_incorrect.load(Ordering::Relaxed),
            reviews_rejected: self.reviews_rejected.load(Ordering::Relaxed),
            due_queries: self.due_queries.load(Ordering::Relaxed),
        }
    }
}

impl Default for ReviewCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Words newly saved.
    pub words_saved: u64,
    /// Saves that matched an already-saved term.
    pub duplicate_saves: u64,
    /// Reviews answered correctly.
    pub reviews_correct: u64,
    /// Reviews answered incorrectly.
    pub reviews_incorrect: u64,
    /// Rejected review submissions.
    pub reviews_rejected: u64,
    /// Due-item or session queries served.
    pub due_queries: u64,
}

impl CounterSnapshot {
    /// Total reviews applied.
    #[must_use]
    pub fn reviews_total(&self) -> u64 {
        self.reviews_correct + self.reviews_incorrect
    }

    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP lingo_words_saved_total Words newly saved\n\
             # TYPE lingo_words_saved_total counter\n\
             lingo_words_saved_total {}\n\
             # HELP lingo_duplicate_saves_total Saves of an already-saved term\n\
             # TYPE lingo_duplicate_saves_total counter\n\
             lingo_duplicate_saves_total {}\n\
             # HELP lingo_reviews_total Reviews applied by outcome\n\
             # TYPE lingo_reviews_total counter\n\
             lingo_reviews_total{{outcome=\"correct\"}} {}\n\
             lingo_reviews_total{{outcome=\"incorrect\"}} {}\n\
             # HELP lingo_reviews_rejected_total Rejected review submissions\n\
             # TYPE lingo_reviews_rejected_total counter\n\
             lingo_reviews_rejected_total {}\n\
             # HELP lingo_due_queries_total Due-item queries served\n\
             # TYPE lingo_due_queries_total counter\n\
             lingo_due_queries_total {}\n",
            self.words_saved,
            self.duplicate_saves,
            self.reviews_correct,
            self.reviews_incorrect,
            self.reviews_rejected,
            self.due_queries,
        )
    }
}
