//! Fixture builders shared by the Lingo benchmarks.

use chrono::{DateTime, Duration, TimeZone, Utc};

use lingo_core::scheduler::binary;
use lingo_core::{LearnerId, NewWord, VocabularyItem};

/// Fixed reference time (2026-03-10 12:00 UTC) so runs are comparable.
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// The `i`-th item of a synthetic collection.
///
/// Items are created up to 59 days before [`base_time`] and given up to four
/// reviews, so a collection mixes new, failed and growing words.
#[must_use]
pub fn make_item(learner: LearnerId, i: u32) -> VocabularyItem {
    let created = base_time() - Duration::days(i64::from(i % 60));
    let word = NewWord::new(format!("palabra {i}"), "word");
    let Ok(mut item) = VocabularyItem::new(learner, word, created) else {
        unreachable!("fixture words are never blank");
    };
    for step in 0..(i % 5) {
        binary::review(&mut item, (i + step) % 3 != 0, created + Duration::days(i64::from(step)));
    }
    item
}

/// `n` items belonging to one learner.
#[must_use]
pub fn make_collection(n: u32) -> Vec<VocabularyItem> {
    let learner = LearnerId::new();
    (0..n).map(|i| make_item(learner, i)).collect()
}
