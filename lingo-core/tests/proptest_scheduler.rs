//! Property-based tests for the scheduling policies.
//!
//! Arbitrary review sequences must never push an item's memory state out of
//! its bounds, and single reviews must move it in the documented direction.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use lingo_core::scheduler::{binary, graded};
use lingo_core::vocabulary::{MAX_EASINESS, MAX_MASTERY, MIN_EASINESS};
use lingo_core::{LearnerId, NewWord, Quality, VocabularyItem, is_due};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn fresh_item() -> VocabularyItem {
    VocabularyItem::new(LearnerId::new(), NewWord::new("palabra", "word"), base_time()).expect("valid")
}

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// An item with an arbitrary (but valid) reviewed memory state.
fn arb_item() -> impl Strategy<Value = VocabularyItem> {
    (130u32..=250, 0u32..=10_000, 0u8..=5, 0u32..=50).prop_map(|(centi, interval, mastery, reps)| {
        let mut item = fresh_item();
        item.easiness_factor = f64::from(centi) / 100.0;
        item.interval_days = interval;
        item.mastery_level = mastery;
        item.repetitions = reps;
        item
    })
}

fn arb_quality() -> impl Strategy<Value = Quality> {
    (0u8..=5).prop_map(|q| Quality::new(q).expect("in range"))
}

fn assert_bounds(item: &VocabularyItem) -> Result<(), TestCaseError> {
    prop_assert!(item.easiness_factor >= MIN_EASINESS, "easiness {} too low", item.easiness_factor);
    prop_assert!(item.easiness_factor <= MAX_EASINESS, "easiness {} too high", item.easiness_factor);
    prop_assert!(item.mastery_level <= MAX_MASTERY);
    prop_assert!(item.interval_days >= 1);
    let last = item.last_reviewed_at.expect("reviewed");
    prop_assert_eq!(item.next_review_at, last + Duration::days(i64::from(item.interval_days)));
    Ok(())
}

// ---------------------------------------------------------------------------
// Binary policy
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn binary_sequences_stay_in_bounds(answers in prop::collection::vec(any::<bool>(), 1..60)) {
        let mut item = fresh_item();
        let mut now = base_time();
        for (i, &correct) in answers.iter().enumerate() {
            binary::review(&mut item, correct, now);
            assert_bounds(&item)?;
            now = item.next_review_at;
            prop_assert_eq!(item.review_count as usize, i + 1);
        }
        let correct = answers.iter().filter(|&&c| c).count();
        prop_assert_eq!(item.correct_count as usize, correct);
        prop_assert_eq!(item.incorrect_count as usize, answers.len() - correct);
    }

    #[test]
    fn binary_incorrect_resets_interval(mut item in arb_item()) {
        let before = item.clone();
        binary::review(&mut item, false, base_time());
        prop_assert_eq!(item.interval_days, 1);
        prop_assert_eq!(item.mastery_level, before.mastery_level.saturating_sub(1));
        prop_assert!(item.easiness_factor <= before.easiness_factor);
    }

    #[test]
    fn binary_correct_never_shrinks_interval(mut item in arb_item()) {
        let before = item.clone();
        binary::review(&mut item, true, base_time());
        prop_assert!(item.interval_days >= before.interval_days.max(1));
        prop_assert_eq!(item.mastery_level, (before.mastery_level + 1).min(MAX_MASTERY));
        prop_assert!(item.easiness_factor >= before.easiness_factor);
    }

    #[test]
    fn binary_preview_matches_review(item in arb_item()) {
        let (if_wrong, if_right) = binary::preview(&item);
        let mut wrong = item.clone();
        binary::review(&mut wrong, false, base_time());
        let mut right = item;
        binary::review(&mut right, true, base_time());
        prop_assert_eq!(if_wrong, wrong.interval_days);
        prop_assert_eq!(if_right, right.interval_days);
    }
}

// ---------------------------------------------------------------------------
// Graded policy
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn graded_sequences_stay_in_bounds(grades in prop::collection::vec(arb_quality(), 1..60)) {
        let mut item = fresh_item();
        let mut now = base_time();
        for &q in &grades {
            graded::review(&mut item, q, now);
            assert_bounds(&item)?;
            now = item.next_review_at;
        }
        prop_assert_eq!(item.review_count as usize, grades.len());
    }

    #[test]
    fn graded_failure_resets_repetitions(mut item in arb_item(), q in 0u8..3) {
        let before = item.clone();
        graded::review(&mut item, Quality::new(q).expect("in range"), base_time());
        prop_assert_eq!(item.repetitions, 0);
        prop_assert_eq!(item.interval_days, 1);
        prop_assert_eq!(item.mastery_level, before.mastery_level.saturating_sub(1));
    }

    #[test]
    fn graded_pass_counts_repetition(mut item in arb_item(), q in 3u8..=5) {
        let before = item.clone();
        graded::review(&mut item, Quality::new(q).expect("in range"), base_time());
        prop_assert_eq!(item.repetitions, before.repetitions + 1);
        prop_assert!(item.interval_days >= 1);
    }

    #[test]
    fn out_of_range_quality_is_rejected(q in 6u8..=255) {
        prop_assert!(Quality::new(q).is_err());
    }
}

// ---------------------------------------------------------------------------
// Due check
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn due_boundary_is_inclusive(item in arb_item(), offset_secs in 1i64..10_000_000) {
        let at = item.next_review_at;
        prop_assert!(is_due(&item, at));
        prop_assert!(is_due(&item, at + Duration::seconds(offset_secs)));
        prop_assert!(!is_due(&item, at - Duration::seconds(offset_secs)));
    }

    #[test]
    fn due_check_is_idempotent(item in arb_item(), offset_secs in -1_000_000i64..1_000_000) {
        let now = item.next_review_at + Duration::seconds(offset_secs);
        let before = item.clone();
        let first = is_due(&item, now);
        prop_assert_eq!(first, is_due(&item, now));
        prop_assert_eq!(item, before);
    }
}
