//! Binary review policy — the canonical scheduler.
//!
//! On a correct answer:
//!   mastery  = min(5, mastery + 1)
//!   easiness = min(2.5, easiness + 0.1)
//!   interval = max(1, ceil(previous_interval × easiness))
//!
//! On an incorrect answer:
//!   mastery  = max(0, mastery − 1)
//!   easiness = max(1.3, easiness − 0.2)
//!   interval = 1
//!
//! Easiness is updated *before* the interval is computed, so the interval
//! grows by the new easiness. Arithmetic is done in hundredths to keep
//! `ceil` stable (`ceil(10 × 2.3)` is 23, not 24).

use chrono::{DateTime, Utc};

use crate::vocabulary::{MAX_INTERVAL_DAYS, VocabularyItem};

const CORRECT_STEP_CENTI: i64 = 10;
const INCORRECT_STEP_CENTI: i64 = -20;

/// Apply one binary review to `item` at `now`.
pub fn review(item: &mut VocabularyItem, correct: bool, now: DateTime<Utc>) {
    let step = if correct {
        CORRECT_STEP_CENTI
    } else {
        INCORRECT_STEP_CENTI
    };
    item.set_easiness_centi(i64::from(item.easiness_centi()) + step);

    let interval = if correct {
        grown_interval(item.interval_days, item.easiness_centi())
    } else {
        1
    };

    item.stamp_review(now, interval, correct);
}

/// Intervals the item would get for `(incorrect, correct)` without changing it.
#[must_use]
pub fn preview(item: &VocabularyItem) -> (u32, u32) {
    let easiness = (i64::from(item.easiness_centi()) + CORRECT_STEP_CENTI)
        .min(i64::from(crate::vocabulary::MAX_EASINESS_CENTI));
    let correct = grown_interval(item.interval_days, easiness as u32);
    (1, correct)
}

/// `max(1, ceil(previous × easiness_centi / 100))`, capped at [`MAX_INTERVAL_DAYS`].
fn grown_interval(previous: u32, easiness_centi: u32) -> u32 {
    let scaled = u64::from(previous) * u64::from(easiness_centi);
    let days = scaled.div_ceil(100).clamp(1, u64::from(MAX_INTERVAL_DAYS));
    u32::try_from(days).unwrap_or(MAX_INTERVAL_DAYS)
}
