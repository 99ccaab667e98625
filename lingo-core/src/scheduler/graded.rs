//! Graded review policy — SuperMemo SM-2.
//!
//! Quality grades (0–5):
//! - 5: perfect recall
//! - 4: correct after hesitation
//! - 3: correct with serious difficulty
//! - 2: incorrect, but the answer felt familiar
//! - 1: incorrect, recognized once shown
//! - 0: complete blackout
//!
//! A grade of 3 or more is a pass. The interval is computed from the
//! *previous* easiness, then easiness is adjusted:
//!   EF' = EF + (0.1 − (5 − q) × (0.08 + (5 − q) × 0.02)),  clamped to [1.3, 2.5]
//!
//! Reference: Woźniak, P. (1990). "Optimization of learning."

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LingoError, Result};
use crate::vocabulary::{MAX_INTERVAL_DAYS, VocabularyItem};

const FIRST_INTERVAL: u32 = 1;
const SECOND_INTERVAL: u32 = 6;

/// An SM-2 quality grade, guaranteed to be in 0–5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Complete blackout.
    pub const BLACKOUT: Self = Self(0);
    /// Lowest passing grade.
    pub const PASS: Self = Self(3);
    /// Perfect recall.
    pub const PERFECT: Self = Self(5);

    /// Validate a raw grade.
    ///
    /// # Errors
    ///
    /// Returns [`LingoError::InvalidQuality`] if `value > 5`.
    pub fn new(value: u8) -> Result<Self> {
        if value > 5 {
            return Err(LingoError::InvalidQuality(value));
        }
        Ok(Self(value))
    }

    /// The raw grade.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether the grade counts as a successful recall (≥ 3).
    #[must_use]
    pub fn is_pass(self) -> bool {
        self.0 >= Self::PASS.0
    }

    /// Easiness adjustment for this grade, in hundredths.
    ///
    /// `0.1 − d × (0.08 + d × 0.02)` with `d = 5 − q`, i.e.
    /// +10, 0, −14, −32, −54, −80 for q = 5..0.
    fn easiness_delta_centi(self) -> i64 {
        let d = i64::from(5 - self.0);
        10 - d * (8 + 2 * d)
    }
}

impl TryFrom<u8> for Quality {
    type Error = LingoError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Four-button answer scale shown in review UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Forgot it.
    Again,
    /// Recalled with difficulty.
    Hard,
    /// Recalled after hesitation.
    Good,
    /// Recalled instantly.
    Easy,
}

impl Rating {
    /// All ratings, weakest first.
    pub const ALL: [Self; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// SM-2 grade for this rating: Again → 1, Hard → 3, Good → 4, Easy → 5.
    #[must_use]
    pub fn quality(self) -> Quality {
        match self {
            Self::Again => Quality(1),
            Self::Hard => Quality(3),
            Self::Good => Quality(4),
            Self::Easy => Quality(5),
        }
    }
}

impl From<Rating> for Quality {
    fn from(r: Rating) -> Self {
        r.quality()
    }
}

/// Apply one graded review to `item` at `now`.
pub fn review(item: &mut VocabularyItem, quality: Quality, now: DateTime<Utc>) {
    let interval = next_interval(item, quality);
    item.set_easiness_centi(i64::from(item.easiness_centi()) + quality.easiness_delta_centi());
    item.stamp_review(now, interval, quality.is_pass());
}

/// Intervals each [`Rating`] would give, in [`Rating::ALL`] order.
#[must_use]
pub fn preview(item: &VocabularyItem) -> [u32; 4] {
    Rating::ALL.map(|r| next_interval(item, r.quality()))
}

fn next_interval(item: &VocabularyItem, quality: Quality) -> u32 {
    if !quality.is_pass() {
        return FIRST_INTERVAL;
    }
    match item.repetitions {
        0 => FIRST_INTERVAL,
        1 => SECOND_INTERVAL,
        _ => {
            // round(interval × EF) in hundredths, half away from zero.
            let scaled = u64::from(item.interval_days) * u64::from(item.easiness_centi());
            let days = ((scaled + 50) / 100).clamp(1, u64::from(MAX_INTERVAL_DAYS));
            u32::try_from(days).unwrap_or(MAX_INTERVAL_DAYS)
        }
    }
}
