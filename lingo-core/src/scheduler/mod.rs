//! Spaced-repetition scheduling.
//!
//! Two complete policies are provided and selected by configuration:
//!
//! - [`binary`] — the canonical policy. A review is either correct or not;
//!   easiness moves by +0.1 / −0.2 and the interval grows by the *updated*
//!   easiness.
//! - [`graded`] — SuperMemo SM-2. A review carries a 0–5 [`Quality`]; the
//!   first two successful repetitions use fixed 1- and 6-day intervals.
//!
//! The policies are never mixed: an [`Outcome`] of the wrong kind for the
//! configured [`SchedulingPolicy`] is rejected by [`apply`].
//!
//! Every function here is pure. The caller supplies `now` and owns
//! persistence of the returned item.

pub mod binary;
pub mod graded;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LingoError, Result};
use crate::vocabulary::VocabularyItem;

pub use graded::{Quality, Rating};

/// Which scheduling policy reviews are run through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// Correct / incorrect answers ([`binary::review`]).
    #[default]
    Binary,
    /// 0–5 quality grades ([`graded::review`]).
    Graded,
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Graded => write!(f, "graded"),
        }
    }
}

/// The learner's answer to one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// Binary policy: whether the word was recalled.
    Recall(bool),
    /// Graded policy: SM-2 quality grade.
    Graded(Quality),
}

impl Outcome {
    /// A correct binary answer.
    pub const CORRECT: Self = Self::Recall(true);
    /// An incorrect binary answer.
    pub const INCORRECT: Self = Self::Recall(false);

    /// Whether this outcome counts as a successful recall.
    #[must_use]
    pub fn is_success(self) -> bool {
        match self {
            Self::Recall(correct) => correct,
            Self::Graded(q) => q.is_pass(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recall(true) => write!(f, "correct"),
            Self::Recall(false) => write!(f, "incorrect"),
            Self::Graded(q) => write!(f, "quality {}", q.value()),
        }
    }
}

/// Review `item` under `policy`.
///
/// # Errors
///
/// Returns [`LingoError::OutcomeMismatch`] if the outcome kind does not
/// belong to `policy`. The item is left untouched in that case.
pub fn apply(
    policy: SchedulingPolicy,
    item: &mut VocabularyItem,
    outcome: Outcome,
    now: DateTime<Utc>,
) -> Result<()> {
    match (policy, outcome) {
        (SchedulingPolicy::Binary, Outcome::Recall(correct)) => {
            binary::review(item, correct, now);
            Ok(())
        }
        (SchedulingPolicy::Graded, Outcome::Graded(quality)) => {
            graded::review(item, quality, now);
            Ok(())
        }
        (policy, outcome) => Err(LingoError::OutcomeMismatch {
            policy,
            outcome: outcome.to_string(),
        }),
    }
}

/// Whether `item` is due for review at `now`.
///
/// Boundary equality counts as due. Never mutates the item.
#[must_use]
pub fn is_due(item: &VocabularyItem, now: DateTime<Utc>) -> bool {
    now >= item.next_review_at
}
